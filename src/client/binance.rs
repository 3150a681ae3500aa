/// Binance USD-M futures REST client

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::MarketData;
use crate::algo::candle::{Candle, CandleSeries, Timeframe};
use crate::error::MonitorError;

const KLINES_PAGE_LIMIT: usize = 1500;
const API_TIMEOUT_SECS: u64 = 30;

/// Raw kline row: open time, OHLCV as strings, close time, quote volume,
/// trade count, taker buy volumes, and a field the API itself documents as
/// ignorable.
type RawKline = (
    i64,
    String,
    String,
    String,
    String,
    String,
    i64,
    String,
    i64,
    String,
    String,
    String,
);

#[derive(Debug, Clone, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Clone, Deserialize)]
struct SymbolInfo {
    symbol: String,
    #[serde(rename = "contractType", default)]
    contract_type: String,
    #[serde(default)]
    status: String,
}

impl SymbolInfo {
    fn is_tradable_perpetual(&self) -> bool {
        self.contract_type == "PERPETUAL" && self.status == "TRADING"
    }
}

pub struct BinanceFuturesClient {
    client: Client,
    base_url: String,
}

impl BinanceFuturesClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(API_TIMEOUT_SECS))
                .build()
                .expect("Failed to create Binance HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn parse_kline(raw: &RawKline) -> Result<Candle> {
        let open_time = Utc
            .timestamp_millis_opt(raw.0)
            .single()
            .ok_or_else(|| anyhow!("kline open time out of range: {}", raw.0))?;
        Ok(Candle {
            open_time,
            open: raw.1.parse().context("kline open price")?,
            high: raw.2.parse().context("kline high price")?,
            low: raw.3.parse().context("kline low price")?,
            close: raw.4.parse().context("kline close price")?,
            volume: raw.5.parse().context("kline volume")?,
        })
    }

    async fn fetch_klines_page(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start_ms: i64,
    ) -> Result<Vec<RawKline>> {
        let url = format!(
            "{}/fapi/v1/klines?symbol={}&interval={}&startTime={}&limit={}",
            self.base_url,
            symbol,
            timeframe.as_str(),
            start_ms,
            KLINES_PAGE_LIMIT
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            bail!("Binance klines error: {}", response.status());
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl MarketData for BinanceFuturesClient {
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        since: DateTime<Utc>,
    ) -> Result<CandleSeries> {
        let mut candles = Vec::new();
        let mut start_ms = since.timestamp_millis();

        loop {
            let page = self
                .fetch_klines_page(symbol, timeframe, start_ms)
                .await
                .map_err(|source| MonitorError::DataUnavailable {
                    symbol: symbol.to_string(),
                    source,
                })?;

            let page_len = page.len();
            for raw in &page {
                candles.push(Self::parse_kline(raw).map_err(|source| {
                    MonitorError::DataUnavailable {
                        symbol: symbol.to_string(),
                        source,
                    }
                })?);
            }

            if page_len < KLINES_PAGE_LIMIT {
                break;
            }
            // Next page starts just past the last open time we have
            match candles.last() {
                Some(last) => start_ms = last.open_time.timestamp_millis() + 1,
                None => break,
            }
        }

        debug!(symbol, candles = candles.len(), "fetched kline history");
        Ok(CandleSeries::new(candles))
    }

    async fn perp_symbols(&self) -> Result<Vec<String>> {
        let url = format!("{}/fapi/v1/exchangeInfo", self.base_url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            bail!("Binance exchangeInfo error: {}", response.status());
        }
        let info: ExchangeInfo = response.json().await?;

        Ok(info
            .symbols
            .into_iter()
            .filter(SymbolInfo::is_tradable_perpetual)
            .map(|s| s.symbol)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kline_row() {
        let raw: RawKline = serde_json::from_str(
            r#"[1704067200000, "42283.58", "42405.00", "42261.02", "42330.49", "1399.052",
                1704068099999, "59212156.47", 17340, "702.833", "29747227.98", "0"]"#,
        )
        .unwrap();

        let candle = BinanceFuturesClient::parse_kline(&raw).unwrap();
        assert_eq!(candle.open_time.timestamp_millis(), 1704067200000);
        assert_eq!(candle.open, 42283.58);
        assert_eq!(candle.high, 42405.00);
        assert_eq!(candle.low, 42261.02);
        assert_eq!(candle.close, 42330.49);
        assert_eq!(candle.volume, 1399.052);
    }

    #[test]
    fn test_parse_kline_rejects_malformed_price() {
        let raw: RawKline = serde_json::from_str(
            r#"[1704067200000, "not-a-price", "1", "1", "1", "1",
                1704068099999, "0", 0, "0", "0", "0"]"#,
        )
        .unwrap();

        assert!(BinanceFuturesClient::parse_kline(&raw).is_err());
    }

    #[test]
    fn test_perpetual_filter() {
        let info: ExchangeInfo = serde_json::from_str(
            r#"{"symbols": [
                {"symbol": "BTCUSDT", "contractType": "PERPETUAL", "status": "TRADING"},
                {"symbol": "BTCUSDT_240329", "contractType": "CURRENT_QUARTER", "status": "TRADING"},
                {"symbol": "OLDUSDT", "contractType": "PERPETUAL", "status": "SETTLING"}
            ]}"#,
        )
        .unwrap();

        let perps: Vec<_> = info
            .symbols
            .into_iter()
            .filter(SymbolInfo::is_tradable_perpetual)
            .map(|s| s.symbol)
            .collect();
        assert_eq!(perps, vec!["BTCUSDT"]);
    }
}
