/// Directional percentage indicators over one contiguous candle window

use super::candle::Candle;

/// Round to 2 decimal places, the precision alerts are reported at.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes pump/dump percentages for exactly one window of candles.
///
/// A dump run is measured from the run's peak (first candle high) to its
/// final trough; a pump run from the run's floor to its final peak. The
/// `live_*` variants use the last candle's close instead of its settled
/// extreme, since that candle may still be forming. All four fail closed:
/// a window containing the wrong candle color yields 0.
pub struct WindowIndicator<'a> {
    window: &'a [Candle],
}

impl<'a> WindowIndicator<'a> {
    pub fn new(window: &'a [Candle]) -> Self {
        Self { window }
    }

    fn all_green(&self) -> bool {
        self.window.iter().all(Candle::is_green)
    }

    fn any_green(&self) -> bool {
        self.window.iter().any(Candle::is_green)
    }

    pub fn dumping_percentage(&self) -> f64 {
        let (Some(first), Some(last)) = (self.window.first(), self.window.last()) else {
            return 0.0;
        };
        if self.any_green() {
            return 0.0;
        }
        round2((first.high - last.low) / first.high * 100.0)
    }

    pub fn live_dumping_percentage(&self) -> f64 {
        let (Some(first), Some(last)) = (self.window.first(), self.window.last()) else {
            return 0.0;
        };
        if self.any_green() {
            return 0.0;
        }
        round2((first.high - last.close) / last.close * 100.0)
    }

    pub fn pumping_percentage(&self) -> f64 {
        let (Some(first), Some(last)) = (self.window.first(), self.window.last()) else {
            return 0.0;
        };
        if !self.all_green() {
            return 0.0;
        }
        round2((last.high - first.low) / first.low * 100.0)
    }

    pub fn live_pumping_percentage(&self) -> f64 {
        let (Some(first), Some(last)) = (self.window.first(), self.window.last()) else {
            return 0.0;
        };
        if !self.all_green() {
            return 0.0;
        }
        round2((last.close - first.low) / last.close * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle(i: u32, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            open_time: Utc.with_ymd_and_hms(2024, 1, 1, (i * 15) / 60, (i * 15) % 60, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    fn green(i: u32, low: f64, high: f64) -> Candle {
        candle(i, low, high, low, high)
    }

    fn red(i: u32, high: f64, low: f64) -> Candle {
        candle(i, high, high, low, low)
    }

    #[test]
    fn test_pumping_zero_when_any_candle_red() {
        let window = [green(0, 10.0, 11.0), red(1, 11.0, 10.5), green(2, 10.5, 12.0)];
        let ind = WindowIndicator::new(&window);
        assert_eq!(ind.pumping_percentage(), 0.0);
        assert_eq!(ind.live_pumping_percentage(), 0.0);
    }

    #[test]
    fn test_dumping_zero_when_any_candle_green() {
        let window = [red(0, 11.0, 10.0), green(1, 10.0, 10.5), red(2, 10.5, 9.0)];
        let ind = WindowIndicator::new(&window);
        assert_eq!(ind.dumping_percentage(), 0.0);
        assert_eq!(ind.live_dumping_percentage(), 0.0);
    }

    #[test]
    fn test_pumping_measures_floor_to_final_peak() {
        // Five green candles, lows/highs (10,11)..(14,16): (16-10)/10 = 60%
        let window = [
            green(0, 10.0, 11.0),
            green(1, 11.0, 12.0),
            green(2, 12.0, 13.0),
            green(3, 13.0, 14.0),
            green(4, 14.0, 16.0),
        ];
        assert_eq!(WindowIndicator::new(&window).pumping_percentage(), 60.0);
    }

    #[test]
    fn test_dumping_measures_peak_to_final_trough() {
        let window = [red(0, 100.0, 92.0), red(1, 93.0, 84.0)];
        // (100 - 84) / 100 = 16%
        assert_eq!(WindowIndicator::new(&window).dumping_percentage(), 16.0);
    }

    #[test]
    fn test_live_variants_use_last_close() {
        let pump = [candle(0, 99.5, 111.0, 99.0, 110.0)];
        // (110 - 99) / 110 = 10%
        assert_eq!(WindowIndicator::new(&pump).live_pumping_percentage(), 10.0);

        let dump = [red(0, 100.0, 92.0), candle(1, 93.0, 93.0, 84.0, 85.0)];
        // (100 - 85) / 85 = 17.647% -> 17.65 after rounding
        assert_eq!(WindowIndicator::new(&dump).live_dumping_percentage(), 17.65);
    }

    #[test]
    fn test_single_candle_window() {
        let window = [green(0, 10.0, 12.0)];
        // First and last candle coincide
        assert_eq!(WindowIndicator::new(&window).pumping_percentage(), 20.0);
    }

    #[test]
    fn test_empty_window_yields_zero() {
        let ind = WindowIndicator::new(&[]);
        assert_eq!(ind.pumping_percentage(), 0.0);
        assert_eq!(ind.dumping_percentage(), 0.0);
        assert_eq!(ind.live_pumping_percentage(), 0.0);
        assert_eq!(ind.live_dumping_percentage(), 0.0);
    }
}
