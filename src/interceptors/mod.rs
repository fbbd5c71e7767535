//! Interceptor chain: cross-cutting hooks around route dispatch.
//!
//! # Data Flow
//! ```text
//! pre_process  (registration order):  None → i1 → i2 → ... → Some(reply)? skip dispatch
//! dispatch     (only if no substitute)
//! post_process (registration order):  reply → i1 → i2 → ... → final reply
//! ```
//!
//! # Design Decisions
//! - Each step receives the previous step's output and returns the new one
//! - Interceptors never fail; they log and pass the value through instead
//! - Post-process runs for substituted replies too, so cache hits still get
//!   debug headers

pub mod cache;
pub mod log;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::http::request::RequestContext;
use crate::http::response::Reply;

pub use cache::CacheInterceptor;
pub use log::{LogInterceptor, X_DEBUG, X_DEBUG_ERROR};

/// Pre/post hooks run by the router around every dispatch.
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Receives the substitute produced so far (if any) and returns the
    /// substitute to hand to the next interceptor.
    fn pre_process(&self, ctx: &RequestContext, current: Option<Reply>) -> Option<Reply>;

    /// Receives the reply produced so far and returns the reply to hand on.
    fn post_process(&self, ctx: &RequestContext, reply: Reply) -> Reply;
}

/// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode text so it is safe as a header value.
pub fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}
