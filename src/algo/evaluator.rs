/// Live evaluation of calibrated thresholds against fresh candles

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::calibrator::ParameterSet;
use super::candle::CandleSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Pump,
    Dump,
}

/// One currently-active alert condition for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub period: usize,
    pub minimum_percentage: f64,
    pub percentage: f64,
    pub direction: Direction,
}

impl Signal {
    /// Integer margin above the calibrated threshold. Ranking and display
    /// only, never filtering.
    pub fn level(&self) -> i64 {
        (self.percentage - self.minimum_percentage).floor() as i64
    }
}

/// Applies every parameter of `params` to the trailing windows of `series`
/// and returns all signals whose threshold is currently exceeded.
///
/// One call may emit several signals for the same symbol, one per window
/// length: different lengths detect different move shapes (a sharp burst
/// versus a sustained climb). Signals keep the parameter configuration
/// order; ranking by magnitude is a presentation concern.
pub fn evaluate_live(
    symbol: &str,
    params: &ParameterSet,
    series: &CandleSeries,
    now: DateTime<Utc>,
) -> Vec<Signal> {
    let mut signals = Vec::new();
    for param in &params.pumping {
        let percentage = series.live_pumping_percentage(param.period(), param.minimum_percentage());
        if percentage > 0.0 {
            signals.push(Signal {
                symbol: symbol.to_string(),
                timestamp: now,
                period: param.period(),
                minimum_percentage: param.minimum_percentage(),
                percentage,
                direction: Direction::Pump,
            });
        }
    }
    for param in &params.dumping {
        let percentage = series.live_dumping_percentage(param.period(), param.minimum_percentage());
        if percentage > 0.0 {
            signals.push(Signal {
                symbol: symbol.to_string(),
                timestamp: now,
                period: param.period(),
                minimum_percentage: param.minimum_percentage(),
                percentage,
                direction: Direction::Dump,
            });
        }
    }
    signals
}
