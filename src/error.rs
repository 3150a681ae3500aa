/// Monitor error taxonomy

use thiserror::Error;

/// Recoverable per-step failures of the monitoring cycle. Every variant is
/// isolated to one symbol or one delivery attempt; none aborts the loop.
/// Insufficient history is deliberately not represented here: a series
/// shorter than a window length is an empty scan result, never an error.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("market data unavailable for {symbol}")]
    DataUnavailable {
        symbol: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("calibration failed for {symbol}")]
    CalibrationFailed {
        symbol: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("live evaluation failed for {symbol}")]
    EvaluationFailed {
        symbol: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("alert delivery failed")]
    DeliveryFailed(#[source] anyhow::Error),
}
