//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request
//! - Per-request debug traces (X-DEBUG) are separate from process logs but
//!   mirrored into them at debug level
//! - Metrics are cheap and no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
