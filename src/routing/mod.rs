//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! RequestContext (method, url, segments, log)
//!     → router.rs (interceptor pre-process chain)
//!     → matcher.rs (first matcher in table order claims the request)
//!     → handlers.rs / combinators.rs (ping, provider, race, all)
//!     → errors.rs (failure → status + status text, exactly once)
//!     → router.rs (interceptor post-process chain)
//!     → Reply
//!
//! Route table construction (at startup):
//!     RouterConfig + ProviderSet
//!     → one ProviderHandler per provider
//!     → race/all handlers over every provider
//!     → freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Route table built at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - First match wins (ordered by registration)

pub mod combinators;
pub mod errors;
pub mod handlers;
pub mod matcher;
pub mod router;

pub use combinators::{Aggregator, AllHandler, RaceHandler, Racer, SharedHandler};
pub use errors::{RouteError, RouteResult};
pub use handlers::{ProviderHandler, RouteHandler};
pub use matcher::RouteMatcher;
pub use router::{RouteMatch, Router, RouterBuilder};
