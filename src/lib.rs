//! Spot price router library.

pub mod cache;
pub mod config;
pub mod http;
pub mod interceptors;
pub mod lifecycle;
pub mod market;
pub mod observability;
pub mod providers;
pub mod routing;

pub use config::schema::RouterConfig;
pub use http::HttpServer;
pub use routing::Router;
