//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Configure log level from `RUST_LOG` or the config file
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - Configured level applies to this crate and tower_http only

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for a configured level such as `"info"`.
pub fn default_directive(level: &str) -> String {
    format!("spot_router={level},tower_http={level}")
}

/// Install the global subscriber. Safe to call once per process.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive(level).into());
    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {}", e);
    }
}
