//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and provider URLs
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{ProviderConfig, RouterConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),

    #[error("timeouts.request_secs must be greater than 0")]
    RequestTimeout,

    #[error("providers.{provider}.base_url {url:?} is not an http(s) URL")]
    ProviderUrl { provider: String, url: String },

    #[error("at least one provider must be enabled")]
    NoProviders,
}

/// Check a configuration, collecting every problem.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    let providers = [
        ("gdax", &config.providers.gdax),
        ("bitfinex", &config.providers.bitfinex),
    ];
    for (name, provider) in providers {
        if provider.enabled && !is_http_url(provider) {
            errors.push(ValidationError::ProviderUrl {
                provider: name.to_string(),
                url: provider.base_url.clone(),
            });
        }
    }
    if providers.iter().all(|(_, p)| !p.enabled) {
        errors.push(ValidationError::NoProviders);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(provider: &ProviderConfig) -> bool {
    Url::parse(&provider.base_url)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}
