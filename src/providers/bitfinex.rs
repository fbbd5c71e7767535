//! Bitfinex public ticker.
//!
//! Symbols are `<base><target>`. The ticker looks like:
//!
//! ```text
//! {"mid":"244.755","bid":"244.75","ask":"244.76","last_price":"244.82",
//!  "low":"244.2","high":"248.19","volume":"7842.11542563",
//!  "timestamp":"1444253422.348340958"}
//! ```

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

use crate::config::schema::ProviderConfig;
use crate::market::{ConcatFormatter, InstrumentSymbol, SpotPrice, SymbolFormatter};
use crate::providers::{fetch_json, SpotApi, UpstreamError, UpstreamResult};

pub const NAME: &str = "bitfinex";

#[derive(Debug, Deserialize)]
struct Ticker {
    last_price: String,
    timestamp: String,
}

pub struct BitfinexClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: Option<String>,
}

impl BitfinexClient {
    pub fn new(client: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Fractional unix seconds to ISO-8601 UTC with millisecond precision.
fn timestamp_to_iso(timestamp: &str) -> Option<String> {
    let secs: f64 = timestamp.trim().parse().ok()?;
    if !secs.is_finite() {
        return None;
    }
    let millis = (secs * 1000.0).round() as i64;
    DateTime::<Utc>::from_timestamp_millis(millis).map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[async_trait]
impl SpotApi for BitfinexClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn get_spot(&self, symbol: &InstrumentSymbol) -> UpstreamResult<SpotPrice> {
        let url = format!("{}/v1/pubticker/{}", self.base_url, ConcatFormatter.format(symbol));
        tracing::debug!(provider = NAME, url = %url, "Fetching spot");

        let mut request = self.client.get(&url);
        if let Some(agent) = &self.user_agent {
            request = request.header(reqwest::header::USER_AGENT, agent);
        }
        let ticker: Ticker = fetch_json(NAME, request).await?;

        let utc_time = timestamp_to_iso(&ticker.timestamp).ok_or_else(|| UpstreamError::Decode {
            provider: NAME.to_string(),
            message: format!("bad timestamp {}", ticker.timestamp),
        })?;

        Ok(SpotPrice {
            symbol: symbol.to_string(),
            price: ticker.last_price,
            utc_time,
            provider: NAME.to_string(),
        })
    }
}
