/// Human-readable rendering of signals and alert batches

use chrono::{DateTime, Utc};

use crate::algo::candle::{Timeframe, TIMESTAMP_FORMAT};
use crate::algo::evaluator::{Direction, Signal};

/// One alert line. Pumps are labeled SELL and dumps BUY: the alert reader
/// trades against the move.
pub fn format_signal(signal: &Signal, timeframe: Timeframe) -> String {
    let (action, verb) = match signal.direction {
        Direction::Pump => ("SELL", "pumped"),
        Direction::Dump => ("BUY", "dumped"),
    };
    let since_minutes = signal.period as i64 * timeframe.minutes();
    format!(
        "[{}][{}][{}][{}] {} {}% since {} minutes",
        signal.symbol,
        action,
        signal.level(),
        signal.timestamp.format(TIMESTAMP_FORMAT),
        verb,
        signal.percentage,
        since_minutes,
    )
}

/// Lifecycle announcements share one timestamped prefix.
pub fn format_announcement(now: DateTime<Utc>, text: &str) -> String {
    format!("[pumpwatch][{}] {}", now.format(TIMESTAMP_FORMAT), text)
}

/// Accumulates one tick's worth of output: a header of signalling symbols
/// followed by their alert lines and any per-symbol failure notes.
#[derive(Debug, Default)]
pub struct MessageBatch {
    symbols: Vec<String>,
    lines: Vec<String>,
}

impl MessageBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_signals(&mut self, symbol: &str, lines: impl IntoIterator<Item = String>) {
        self.symbols.push(symbol.to_string());
        self.lines.extend(lines);
    }

    pub fn push_failure(&mut self, symbol: &str, error: &impl std::fmt::Display) {
        self.lines.push(format!("Failed to get signals for {symbol}: {error}"));
    }

    /// Symbols that contributed signals (not failures) to this batch.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// None when nothing happened this tick, so the caller sends nothing.
    pub fn render(&self) -> Option<String> {
        if self.lines.is_empty() {
            return None;
        }
        let header = self.symbols.join(" ");
        Some(format!("{}\n{}", header, self.lines.join("\n")))
    }
}
