/// Sliding-window scans across a candle series

use std::collections::BTreeMap;

use super::candle::CandleSeries;
use super::indicator::WindowIndicator;

/// Historical sweep results keyed by the window's closing candle open time,
/// rendered with [`super::candle::TIMESTAMP_FORMAT`]. That format sorts
/// lexicographically in chronological order, so the map iterates in time
/// order.
pub type ScanResult = BTreeMap<String, f64>;

impl CandleSeries {
    /// Every window of `period` candles whose pump percentage is at least
    /// `minimum_percentage`. A series shorter than `period` yields an empty
    /// map: insufficient history is an expected condition, not an error.
    ///
    /// Inclusion is `>=` for pumps but strictly `>` for dumps. The
    /// asymmetry is long-observed behavior and is kept as-is.
    pub fn pumping_percentages(&self, period: usize, minimum_percentage: f64) -> ScanResult {
        self.scan(period, |w| WindowIndicator::new(w).pumping_percentage(), |pct| {
            pct >= minimum_percentage
        })
    }

    /// Every window of `period` candles whose dump percentage strictly
    /// exceeds `minimum_percentage`. See [`Self::pumping_percentages`] for
    /// the inclusion asymmetry.
    pub fn dumping_percentages(&self, period: usize, minimum_percentage: f64) -> ScanResult {
        self.scan(period, |w| WindowIndicator::new(w).dumping_percentage(), |pct| {
            pct > minimum_percentage
        })
    }

    /// Pump percentage of the single most recent window, using the live
    /// indicator variant. Returns 0 when below `minimum_percentage` or when
    /// the series is shorter than `period`.
    pub fn live_pumping_percentage(&self, period: usize, minimum_percentage: f64) -> f64 {
        self.live_scan(period, minimum_percentage, |w| {
            WindowIndicator::new(w).live_pumping_percentage()
        })
    }

    /// Dump counterpart of [`Self::live_pumping_percentage`].
    pub fn live_dumping_percentage(&self, period: usize, minimum_percentage: f64) -> f64 {
        self.live_scan(period, minimum_percentage, |w| {
            WindowIndicator::new(w).live_dumping_percentage()
        })
    }

    fn scan<F, G>(&self, period: usize, indicator: F, include: G) -> ScanResult
    where
        F: Fn(&[super::candle::Candle]) -> f64,
        G: Fn(f64) -> bool,
    {
        let mut result = ScanResult::new();
        let candles = self.candles();
        if period == 0 || candles.len() < period {
            return result;
        }
        for end in (period - 1)..candles.len() {
            let window = &candles[end + 1 - period..=end];
            let pct = indicator(window);
            if include(pct) {
                result.insert(candles[end].open_time_str(), pct);
            }
        }
        result
    }

    fn live_scan<F>(&self, period: usize, minimum_percentage: f64, indicator: F) -> f64
    where
        F: Fn(&[super::candle::Candle]) -> f64,
    {
        let candles = self.candles();
        if period == 0 || candles.len() < period {
            return 0.0;
        }
        let pct = indicator(&candles[candles.len() - period..]);
        if pct >= minimum_percentage {
            pct
        } else {
            0.0
        }
    }
}
