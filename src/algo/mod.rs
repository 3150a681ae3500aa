/// Windowed pump/dump detection and calibration engine

pub mod calibrator;
pub mod candle;
pub mod evaluator;
pub mod indicator;
pub mod scanner;

pub use calibrator::{Parameter, ParameterSet, ThresholdCalibrator};
pub use candle::{Candle, CandleSeries, Timeframe};
pub use evaluator::{evaluate_live, Direction, Signal};
pub use indicator::WindowIndicator;
