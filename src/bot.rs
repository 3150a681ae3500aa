/// Orchestration loop tying candle fetch, calibration, evaluation and delivery

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use tokio::time::interval;
use tracing::{debug, info, instrument, warn};

use crate::algo::{evaluate_live, ParameterSet, Signal, ThresholdCalibrator};
use crate::client::MarketData;
use crate::config::Config;
use crate::error::MonitorError;
use crate::transport::{format_announcement, format_signal, MessageBatch, NotificationSink};
use crate::util::AlertRateLimiter;

/// Ties the collaborators together: calibrate once at startup, then
/// evaluate the whole universe on every heartbeat. All collaborators are
/// passed in, which keeps the loop runnable against fakes.
pub struct MonitorBot<M, N> {
    config: Config,
    market: M,
    notifier: N,
    limiter: AlertRateLimiter,
    calibrator: ThresholdCalibrator,
    symbols: Vec<String>,
    params: HashMap<String, ParameterSet>,
}

impl<M: MarketData, N: NotificationSink> MonitorBot<M, N> {
    pub fn new(config: Config, market: M, notifier: N) -> Result<Self> {
        let limiter =
            AlertRateLimiter::new(Duration::seconds(config.monitor.send_delay_secs as i64));
        let calibrator = ThresholdCalibrator::new(
            config.calibration.pumping_periods.clone(),
            config.calibration.dumping_periods.clone(),
            config.calibration.pumping_floor,
            config.calibration.dumping_floor,
        )?;
        Ok(Self {
            config,
            market,
            notifier,
            limiter,
            calibrator,
            symbols: Vec::new(),
            params: HashMap::new(),
        })
    }

    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<()> {
        self.announce(Utc::now(), "Starting up").await;
        self.load_universe().await?;

        self.announce(Utc::now(), "Loading params").await;
        self.calibrate_universe().await;
        self.announce(Utc::now(), "Loaded params").await;

        let mut ticker =
            interval(std::time::Duration::from_secs(self.config.monitor.heartbeat_secs));
        loop {
            ticker.tick().await;
            self.tick(Utc::now()).await;
        }
    }

    /// Lifecycle announcements are best-effort; a dead sink must not stop
    /// the monitor from coming up.
    async fn announce(&self, now: DateTime<Utc>, text: &str) {
        let message = format_announcement(now, text);
        info!("{message}");
        if let Err(e) = self.notifier.send(&message).await {
            warn!(error = %e, "announcement delivery failed");
        }
    }

    async fn load_universe(&mut self) -> Result<()> {
        let mut symbols = self
            .market
            .perp_symbols()
            .await
            .context("listing perpetual symbols")?;
        symbols.retain(|s| !self.config.monitor.excluded_symbols.contains(s));
        symbols.sort();
        info!(symbols = symbols.len(), "loaded symbol universe");
        self.symbols = symbols;
        Ok(())
    }

    /// One symbol's calibration failure never aborts the rest: the symbol
    /// stays tracked with an empty parameter set and yields no alerts.
    async fn calibrate_universe(&mut self) {
        for symbol in self.symbols.clone() {
            let params = if self.config.monitor.calibrate_on_start {
                match self.calibrate_symbol(&symbol).await {
                    Ok(params) => params,
                    Err(e) => {
                        warn!(symbol = %symbol, error = %e, "calibration failed, symbol will yield no alerts");
                        ParameterSet::default()
                    }
                }
            } else {
                ParameterSet::default_params()
            };
            debug!(
                symbol = %symbol,
                pumping = params.pumping.len(),
                dumping = params.dumping.len(),
                "loaded params"
            );
            self.params.insert(symbol, params);
        }
    }

    async fn calibrate_symbol(&self, symbol: &str) -> Result<ParameterSet, MonitorError> {
        let since = Utc::now() - Duration::days(self.config.calibration.history_days);
        let wrap = |source: anyhow::Error| MonitorError::CalibrationFailed {
            symbol: symbol.to_string(),
            source,
        };
        let series = self
            .market
            .get_candles(symbol, self.config.monitor.timeframe, since)
            .await
            .map_err(wrap)?;
        self.calibrator.calibrate(&series).map_err(wrap)
    }

    /// One evaluation pass over the universe. Per-symbol failures become
    /// batch notes, never aborts; cooldowns are only recorded once the
    /// batch actually went out.
    #[instrument(skip(self, now))]
    async fn tick(&self, now: DateTime<Utc>) {
        let mut batch = MessageBatch::new();

        for symbol in &self.symbols {
            let Some(params) = self.params.get(symbol) else {
                continue;
            };
            if params.is_empty() {
                continue;
            }

            match self.evaluate_symbol(symbol, params, now).await {
                Ok(signals) if signals.is_empty() => {}
                Ok(signals) => {
                    if !self.limiter.may_send(symbol, now) {
                        debug!(symbol = %symbol, "cooldown active, skipping alert");
                        continue;
                    }
                    let timeframe = self.config.monitor.timeframe;
                    batch.push_signals(
                        symbol,
                        signals.iter().map(|s| format_signal(s, timeframe)),
                    );
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "symbol skipped this cycle");
                    batch.push_failure(symbol, &e);
                }
            }
        }

        let Some(text) = batch.render() else {
            return;
        };
        match self.notifier.send(&text).await {
            Ok(()) => {
                for symbol in batch.symbols() {
                    self.limiter.record_sent(symbol, now);
                }
            }
            Err(source) => {
                let e = MonitorError::DeliveryFailed(source);
                warn!(error = %e, "signals are recomputed next tick, none were lost");
            }
        }
    }

    async fn evaluate_symbol(
        &self,
        symbol: &str,
        params: &ParameterSet,
        now: DateTime<Utc>,
    ) -> Result<Vec<Signal>, MonitorError> {
        let since = now - Duration::hours(self.config.live.lookback_hours);
        let series = self
            .market
            .get_candles(symbol, self.config.monitor.timeframe, since)
            .await
            .map_err(|source| MonitorError::EvaluationFailed {
                symbol: symbol.to_string(),
                source,
            })?;
        Ok(evaluate_live(symbol, params, &series, now))
    }
}
