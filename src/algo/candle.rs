/// Candle data structures shared by the detection engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Render format for candle open times and signal timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One OHLCV record for a fixed time interval. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn is_green(&self) -> bool {
        self.close > self.open
    }

    pub fn percentage(&self) -> f64 {
        (self.close - self.open) * 100.0 / self.open
    }

    pub fn open_time_str(&self) -> String {
        self.open_time.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Candle interval supported by the market data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[default]
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
}

impl Timeframe {
    /// Interval string in the provider's format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
        }
    }

    pub fn minutes(&self) -> i64 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::H1 => 60,
        }
    }
}

/// Ordered candle series for one symbol and one timeframe.
///
/// Open times are strictly increasing: the constructor sorts and drops
/// duplicate timestamps, so any provider output becomes a valid series.
/// Gaps are tolerated.
#[derive(Debug, Clone, Default)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.open_time);
        candles.dedup_by_key(|c| c.open_time);
        Self { candles }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle_at(minute: u32, open: f64, close: f64) -> Candle {
        Candle {
            open_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap(),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn test_green_red_classification() {
        assert!(candle_at(0, 10.0, 11.0).is_green());
        assert!(!candle_at(0, 10.0, 9.0).is_green());
        // A doji closes where it opened and is not green
        assert!(!candle_at(0, 10.0, 10.0).is_green());
    }

    #[test]
    fn test_candle_percentage() {
        let c = candle_at(0, 10.0, 11.0);
        assert!((c.percentage() - 10.0).abs() < 1e-9);

        let c = candle_at(0, 10.0, 9.0);
        assert!((c.percentage() + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_series_sorts_and_dedups() {
        let series = CandleSeries::new(vec![
            candle_at(30, 3.0, 4.0),
            candle_at(0, 1.0, 2.0),
            candle_at(30, 5.0, 6.0),
            candle_at(15, 2.0, 3.0),
        ]);

        assert_eq!(series.len(), 3);
        let times: Vec<_> = series.candles().iter().map(|c| c.open_time).collect();
        let mut sorted = times.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(times, sorted);
        // First record for a duplicate timestamp wins
        assert_eq!(series.candles()[2].open, 3.0);
    }

    #[test]
    fn test_timeframe_roundtrip() {
        assert_eq!(Timeframe::M15.as_str(), "15m");
        assert_eq!(Timeframe::M15.minutes(), 15);
        assert_eq!(Timeframe::default(), Timeframe::M15);

        let tf: Timeframe = serde_json::from_str("\"1h\"").unwrap();
        assert_eq!(tf, Timeframe::H1);
    }

    #[test]
    fn test_open_time_str_format() {
        let c = candle_at(15, 1.0, 2.0);
        assert_eq!(c.open_time_str(), "2024-01-01 00:15:00");
    }
}
