//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → consumed at startup to build providers, cache and route table
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, resolve_config, ConfigError};
pub use schema::{
    CacheConfig, ListenerConfig, ObservabilityConfig, ProviderConfig, ProvidersConfig, RouterConfig,
    RoutingConfig, TimeoutConfig,
};
