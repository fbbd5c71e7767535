//! GDAX spot ticker.
//!
//! Symbols are `<base>-<target>`. The ticker looks like:
//!
//! ```text
//! {"trade_id":40240431,"price":"8371.58000000","size":"0.01668154",
//!  "bid":"8371.57","ask":"8371.58","volume":"17210.40916422",
//!  "time":"2018-03-23T05:23:59.807000Z"}
//! ```
//!
//! GDAX answers without a `User-Agent` with an error body, so one is always
//! sent.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::schema::ProviderConfig;
use crate::market::{DashFormatter, InstrumentSymbol, SpotPrice, SymbolFormatter};
use crate::providers::{fetch_json, SpotApi, UpstreamResult};

pub const NAME: &str = "gdax";
const DEFAULT_USER_AGENT: &str = "CryptoServiceWorker";

#[derive(Debug, Deserialize)]
struct Ticker {
    price: String,
    time: String,
}

pub struct GdaxClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl GdaxClient {
    pub fn new(client: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }
    }
}

#[async_trait]
impl SpotApi for GdaxClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn get_spot(&self, symbol: &InstrumentSymbol) -> UpstreamResult<SpotPrice> {
        let url = format!("{}/products/{}/ticker", self.base_url, DashFormatter.format(symbol));
        tracing::debug!(provider = NAME, url = %url, "Fetching spot");

        let request = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent);
        let ticker: Ticker = fetch_json(NAME, request).await?;

        Ok(SpotPrice {
            symbol: symbol.to_string(),
            price: ticker.price,
            utc_time: ticker.time,
            provider: NAME.to_string(),
        })
    }
}
