//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, timeout / request ID / trace layers)
//!     → request.rs (RequestContext: parsed URL, segments, shared log)
//!     → [routing layer answers with a Reply]
//!     → response.rs (Reply → status, status text, headers, body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{LogBuffer, MakeRequestUuid, RequestContext, X_REQUEST_ID};
pub use response::Reply;
pub use server::{AppState, HttpServer, ServerError};
