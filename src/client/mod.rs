/// Market data collaborators

pub mod binance;

pub use binance::BinanceFuturesClient;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::algo::candle::{CandleSeries, Timeframe};

/// Narrow candle-fetch capability consumed by the monitor. Implementations
/// return candles ordered ascending by open time; gaps are tolerated, the
/// series only guarantees strictly increasing timestamps.
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        since: DateTime<Utc>,
    ) -> Result<CandleSeries>;

    /// Tradable perpetual symbols making up the monitored universe.
    async fn perp_symbols(&self) -> Result<Vec<String>>;
}
