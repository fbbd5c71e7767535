//! Upstream spot-price providers.
//!
//! # Data Flow
//! ```text
//! ProviderHandler (routing)
//!     → SpotApi::get_spot(symbol)
//!     → provider-specific symbol format + HTTP GET (reqwest)
//!     → provider JSON → SpotPrice
//! ```
//!
//! # Design Decisions
//! - One shared reqwest client; the upstream timeout lives on it
//! - Any non-2xx status or undecodable body is an `UpstreamError`
//! - No retries: failures surface immediately to the router

pub mod bitfinex;
pub mod gdax;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::schema::{ProvidersConfig, TimeoutConfig};
use crate::market::{InstrumentSymbol, SpotPrice};

pub use bitfinex::BitfinexClient;
pub use gdax::GdaxClient;

/// Errors from talking to an upstream provider.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{provider} request failed: {source}")]
    Http {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned status {status}")]
    Status { provider: String, status: u16 },

    #[error("{provider} returned an unexpected body: {message}")]
    Decode { provider: String, message: String },
}

/// Result type for provider calls.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// A source of spot prices.
#[async_trait]
pub trait SpotApi: Send + Sync {
    /// Exact name used in `/api/direct/<name>/...` and in aggregate keys.
    fn name(&self) -> &str;

    async fn get_spot(&self, symbol: &InstrumentSymbol) -> UpstreamResult<SpotPrice>;
}

/// Fetch `url` and decode a JSON body, mapping every failure to `UpstreamError`.
pub(crate) async fn fetch_json<T: serde::de::DeserializeOwned>(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> UpstreamResult<T> {
    let http_err = |source| UpstreamError::Http {
        provider: provider.to_string(),
        source,
    };
    let response = request.send().await.map_err(http_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status {
            provider: provider.to_string(),
            status: status.as_u16(),
        });
    }
    let body = response.bytes().await.map_err(http_err)?;
    serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}

/// Ordered set of providers shared by the race, all and direct routes.
#[derive(Clone, Default)]
pub struct ProviderSet {
    providers: Vec<Arc<dyn SpotApi>>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider; order of insertion is the fan-out order.
    pub fn with(mut self, api: Arc<dyn SpotApi>) -> Self {
        self.providers.push(api);
        self
    }

    /// Build the enabled providers from configuration.
    pub fn from_config(providers: &ProvidersConfig, timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if timeouts.upstream_ms > 0 {
            builder = builder.timeout(Duration::from_millis(timeouts.upstream_ms));
        }
        let client = builder.build()?;

        let mut set = Self::new();
        if providers.gdax.enabled {
            set = set.with(Arc::new(GdaxClient::new(client.clone(), &providers.gdax)));
        }
        if providers.bitfinex.enabled {
            set = set.with(Arc::new(BitfinexClient::new(client, &providers.bitfinex)));
        }
        tracing::info!(providers = ?set.names(), "Providers configured");
        Ok(set)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn SpotApi>> {
        self.providers.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSet").field("providers", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouterConfig;

    #[test]
    fn test_from_config_respects_enabled() {
        let mut config = RouterConfig::default();
        let set = ProviderSet::from_config(&config.providers, &config.timeouts).unwrap();
        assert_eq!(set.names(), vec!["gdax", "bitfinex"]);

        config.providers.gdax.enabled = false;
        let set = ProviderSet::from_config(&config.providers, &config.timeouts).unwrap();
        assert_eq!(set.names(), vec!["bitfinex"]);
    }
}
