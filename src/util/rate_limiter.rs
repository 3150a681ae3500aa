/// Per-symbol alert cooldown state

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Gates how often a symbol may emit a notification. One timestamp per
/// symbol, plain cooldown, no burst allowance. Constructed explicitly and
/// passed to the control loop; lives for the process lifetime with no
/// persistence across restarts.
///
/// The map shards per key, and keys never alias across symbols, so callers
/// that parallelize per-symbol evaluation can share one limiter as long as
/// `may_send` + `record_sent` for a given symbol stay on one task.
#[derive(Debug)]
pub struct AlertRateLimiter {
    delay: Duration,
    last_sent: DashMap<String, DateTime<Utc>>,
}

impl AlertRateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_sent: DashMap::new(),
        }
    }

    /// True iff the symbol has never been sent or its cooldown has elapsed.
    pub fn may_send(&self, symbol: &str, now: DateTime<Utc>) -> bool {
        match self.last_sent.get(symbol) {
            Some(last) => now - *last >= self.delay,
            None => true,
        }
    }

    /// Call only after a successful delivery.
    pub fn record_sent(&self, symbol: &str, now: DateTime<Utc>) {
        self.last_sent.insert(symbol.to_string(), now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unknown_symbol_may_send() {
        let limiter = AlertRateLimiter::new(Duration::seconds(60));
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(limiter.may_send("BTCUSDT", now));
    }

    #[test]
    fn test_cooldown_boundary() {
        let limiter = AlertRateLimiter::new(Duration::seconds(60));
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        limiter.record_sent("BTCUSDT", t0);

        assert!(!limiter.may_send("BTCUSDT", t0));
        assert!(!limiter.may_send("BTCUSDT", t0 + Duration::seconds(59)));
        assert!(limiter.may_send("BTCUSDT", t0 + Duration::seconds(60)));
        assert!(limiter.may_send("BTCUSDT", t0 + Duration::seconds(61)));
    }

    #[test]
    fn test_symbols_do_not_share_cooldowns() {
        let limiter = AlertRateLimiter::new(Duration::seconds(60));
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        limiter.record_sent("BTCUSDT", t0);

        assert!(limiter.may_send("ETHUSDT", t0));
    }

    #[test]
    fn test_record_sent_resets_cooldown() {
        let limiter = AlertRateLimiter::new(Duration::seconds(60));
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        limiter.record_sent("BTCUSDT", t0);
        limiter.record_sent("BTCUSDT", t0 + Duration::seconds(60));

        assert!(!limiter.may_send("BTCUSDT", t0 + Duration::seconds(90)));
        assert!(limiter.may_send("BTCUSDT", t0 + Duration::seconds(120)));
    }
}
