/// Per-symbol alert threshold calibration from historical behavior

use anyhow::{ensure, Result};
use serde::Serialize;

use super::candle::CandleSeries;

/// One calibrated (or fixed) alert threshold for a single window length.
/// Validated at construction: `period > 0`, `minimum_percentage >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Parameter {
    period: usize,
    minimum_percentage: f64,
}

impl Parameter {
    pub fn new(period: usize, minimum_percentage: f64) -> Result<Self> {
        ensure!(period > 0, "parameter period must be positive, got {period}");
        ensure!(
            minimum_percentage >= 0.0,
            "parameter minimum_percentage must be non-negative, got {minimum_percentage}"
        );
        Ok(Self {
            period,
            minimum_percentage,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn minimum_percentage(&self) -> f64 {
        self.minimum_percentage
    }
}

/// Calibrated thresholds for one symbol, one entry per direction and
/// window length of interest. An empty set means the symbol is tracked but
/// yields no alerts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParameterSet {
    pub pumping: Vec<Parameter>,
    pub dumping: Vec<Parameter>,
}

impl ParameterSet {
    pub fn is_empty(&self) -> bool {
        self.pumping.is_empty() && self.dumping.is_empty()
    }

    /// Fixed fallback thresholds used when calibration is disabled.
    pub fn default_params() -> Self {
        let param = |period, minimum_percentage| Parameter {
            period,
            minimum_percentage,
        };
        Self {
            pumping: vec![
                param(5, 5.0),
                param(4, 7.0),
                param(3, 8.0),
                param(2, 9.0),
                param(1, 10.0),
            ],
            dumping: vec![param(1, 3.0), param(2, 4.0), param(3, 5.0), param(4, 6.0)],
        }
    }
}

/// Derives one mean threshold per (direction, period) from a historical
/// series. A period whose scan finds no qualifying windows is omitted from
/// the set entirely; omission means "this period produces no alerts for
/// this symbol".
#[derive(Debug, Clone)]
pub struct ThresholdCalibrator {
    pumping_periods: Vec<usize>,
    dumping_periods: Vec<usize>,
    pumping_floor: f64,
    dumping_floor: f64,
}

impl Default for ThresholdCalibrator {
    fn default() -> Self {
        Self {
            pumping_periods: vec![1, 2, 3, 4, 5],
            dumping_periods: vec![1, 2, 3, 4],
            pumping_floor: 5.0,
            dumping_floor: 3.0,
        }
    }
}

impl ThresholdCalibrator {
    pub fn new(
        pumping_periods: Vec<usize>,
        dumping_periods: Vec<usize>,
        pumping_floor: f64,
        dumping_floor: f64,
    ) -> Result<Self> {
        ensure!(
            pumping_periods.iter().chain(&dumping_periods).all(|&p| p > 0),
            "calibration periods must be positive"
        );
        ensure!(
            pumping_floor >= 0.0 && dumping_floor >= 0.0,
            "calibration floors must be non-negative"
        );
        Ok(Self {
            pumping_periods,
            dumping_periods,
            pumping_floor,
            dumping_floor,
        })
    }

    pub fn calibrate(&self, series: &CandleSeries) -> Result<ParameterSet> {
        let mut params = ParameterSet::default();
        for &period in &self.pumping_periods {
            let scan = series.pumping_percentages(period, self.pumping_floor);
            if let Some(threshold) = mean(scan.values()) {
                params.pumping.push(Parameter::new(period, threshold)?);
            }
        }
        for &period in &self.dumping_periods {
            // Each direction calibrates against its own floor
            let scan = series.dumping_percentages(period, self.dumping_floor);
            if let Some(threshold) = mean(scan.values()) {
                params.dumping.push(Parameter::new(period, threshold)?);
            }
        }
        Ok(params)
    }
}

/// Arithmetic mean, absent when there is nothing to average. "No qualifying
/// windows" must stay an explicit absence rather than a numeric sentinel.
fn mean<'a, I: Iterator<Item = &'a f64>>(values: I) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
