/// Configuration structures loaded from TOML

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::algo::candle::Timeframe;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: Monitor,
    #[serde(default)]
    pub calibration: Calibration,
    #[serde(default)]
    pub live: Live,
    #[serde(default)]
    pub binance: Binance,
    pub slack: Slack,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Monitor {
    /// Seconds between evaluation ticks.
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,
    /// Per-symbol cooldown between notifications.
    #[serde(default = "default_send_delay_secs")]
    pub send_delay_secs: u64,
    #[serde(default)]
    pub timeframe: Timeframe,
    /// Symbols removed from the monitored universe.
    #[serde(default)]
    pub excluded_symbols: Vec<String>,
    /// When false, every symbol gets the fixed default thresholds instead
    /// of a historical calibration pass.
    #[serde(default = "default_true")]
    pub calibrate_on_start: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Calibration {
    #[serde(default = "default_pumping_periods")]
    pub pumping_periods: Vec<usize>,
    #[serde(default = "default_dumping_periods")]
    pub dumping_periods: Vec<usize>,
    #[serde(default = "default_pumping_floor")]
    pub pumping_floor: f64,
    #[serde(default = "default_dumping_floor")]
    pub dumping_floor: f64,
    /// Days of history the calibration scan runs over.
    #[serde(default = "default_history_days")]
    pub history_days: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Live {
    /// Hours of fresh candles fetched per evaluation.
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Binance {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Slack {
    pub channel: String,
    /// Falls back to the SLACK_API_TOKEN environment variable when unset.
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {path}"))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.monitor.heartbeat_secs > 0, "heartbeat_secs must be positive");
        ensure!(
            self.calibration
                .pumping_periods
                .iter()
                .chain(&self.calibration.dumping_periods)
                .all(|&p| p > 0),
            "calibration periods must be positive"
        );
        ensure!(
            self.calibration.pumping_floor >= 0.0 && self.calibration.dumping_floor >= 0.0,
            "calibration floors must be non-negative"
        );
        ensure!(self.calibration.history_days > 0, "history_days must be positive");
        ensure!(self.live.lookback_hours > 0, "lookback_hours must be positive");
        ensure!(!self.slack.channel.is_empty(), "slack channel must not be empty");
        Ok(())
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self {
            heartbeat_secs: default_heartbeat_secs(),
            send_delay_secs: default_send_delay_secs(),
            timeframe: Timeframe::default(),
            excluded_symbols: Vec::new(),
            calibrate_on_start: true,
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            pumping_periods: default_pumping_periods(),
            dumping_periods: default_dumping_periods(),
            pumping_floor: default_pumping_floor(),
            dumping_floor: default_dumping_floor(),
            history_days: default_history_days(),
        }
    }
}

impl Default for Live {
    fn default() -> Self {
        Self {
            lookback_hours: default_lookback_hours(),
        }
    }
}

impl Default for Binance {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_heartbeat_secs() -> u64 {
    30
}

fn default_send_delay_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_pumping_periods() -> Vec<usize> {
    vec![1, 2, 3, 4, 5]
}

fn default_dumping_periods() -> Vec<usize> {
    vec![1, 2, 3, 4]
}

fn default_pumping_floor() -> f64 {
    5.0
}

fn default_dumping_floor() -> f64 {
    3.0
}

fn default_history_days() -> i64 {
    20
}

fn default_lookback_hours() -> i64 {
    2
}

fn default_base_url() -> String {
    "https://fapi.binance.com".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load(content: &str) -> Result<Config> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        Config::load_from_file(file.path().to_str().unwrap())
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = load("[slack]\nchannel = \"C0123\"\n").unwrap();

        assert_eq!(config.monitor.heartbeat_secs, 30);
        assert_eq!(config.monitor.send_delay_secs, 60);
        assert_eq!(config.monitor.timeframe, Timeframe::M15);
        assert!(config.monitor.calibrate_on_start);
        assert_eq!(config.calibration.pumping_periods, vec![1, 2, 3, 4, 5]);
        assert_eq!(config.calibration.dumping_periods, vec![1, 2, 3, 4]);
        assert_eq!(config.calibration.pumping_floor, 5.0);
        assert_eq!(config.calibration.dumping_floor, 3.0);
        assert_eq!(config.calibration.history_days, 20);
        assert_eq!(config.live.lookback_hours, 2);
        assert_eq!(config.binance.base_url, "https://fapi.binance.com");
        assert_eq!(config.slack.channel, "C0123");
        assert!(config.slack.api_token.is_none());
    }

    #[test]
    fn test_overrides_are_honored() {
        let config = load(
            r#"
            [monitor]
            heartbeat_secs = 10
            timeframe = "5m"
            excluded_symbols = ["DOTECOUSDT", "DEFIUSDT"]
            calibrate_on_start = false

            [calibration]
            pumping_periods = [2, 3]
            dumping_floor = 4.5

            [slack]
            channel = "C0123"
            api_token = "xoxb-test"
            "#,
        )
        .unwrap();

        assert_eq!(config.monitor.heartbeat_secs, 10);
        assert_eq!(config.monitor.timeframe, Timeframe::M5);
        assert_eq!(
            config.monitor.excluded_symbols,
            vec!["DOTECOUSDT", "DEFIUSDT"]
        );
        assert!(!config.monitor.calibrate_on_start);
        assert_eq!(config.calibration.pumping_periods, vec![2, 3]);
        assert_eq!(config.calibration.dumping_floor, 4.5);
        assert_eq!(config.slack.api_token.as_deref(), Some("xoxb-test"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(load("[slack]\nchannel = \"\"\n").is_err());
        assert!(load("[calibration]\npumping_periods = [0]\n\n[slack]\nchannel = \"C0\"\n").is_err());
        assert!(load("[monitor]\nheartbeat_secs = 0\n\n[slack]\nchannel = \"C0\"\n").is_err());
        assert!(load("[live]\nlookback_hours = 0\n\n[slack]\nchannel = \"C0\"\n").is_err());
    }
}
