//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the spot router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Upstream provider definitions.
    pub providers: ProvidersConfig,

    /// Window cache settings.
    pub cache: CacheConfig,

    /// Route table settings.
    pub routing: RoutingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout enforced by the HTTP layer, in seconds.
    pub request_secs: u64,

    /// Per-call timeout on upstream provider requests, in milliseconds (0 = none).
    pub upstream_ms: u64,

    /// Deadline for a race or aggregate to settle, in milliseconds (0 = none).
    pub combinator_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_ms: 5_000,
            combinator_ms: 10_000,
        }
    }
}

/// The two supported providers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub gdax: ProviderConfig,
    pub bitfinex: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            gdax: ProviderConfig {
                enabled: true,
                base_url: "https://api.gdax.com".to_string(),
                user_agent: Some("CryptoServiceWorker".to_string()),
            },
            bitfinex: ProviderConfig {
                enabled: true,
                base_url: "https://api.bitfinex.com".to_string(),
                user_agent: None,
            },
        }
    }
}

/// A single upstream provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Include this provider in the route table.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Base URL without trailing path (e.g., "https://api.gdax.com").
    pub base_url: String,

    /// User-Agent sent upstream.
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// Window cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Register the cache interceptor.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Route table configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Answer unknown `/api/...` actions with 400 and usage help instead of 404.
    pub strict_validation: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            strict_validation: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
