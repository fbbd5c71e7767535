//! Request context and request IDs.
//!
//! # Responsibilities
//! - Wrap the inbound request with its parsed URL and decoded path segments
//! - Carry a log buffer shared by every handler working on the request
//! - Generate a unique request ID (UUID v4) for tracing
//!
//! # Design Decisions
//! - Built once at the router boundary, then only borrowed or cloned
//! - Clones share the log buffer, so racing handlers write to one trace
//! - Path segments are percent-decoded and empty segments dropped

use std::sync::{Arc, Mutex};

use axum::http::uri::PathAndQuery;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request};
use percent_encoding::percent_decode_str;
use tower_http::request_id::{MakeRequestId, RequestId};
use url::Url;
use uuid::Uuid;

use crate::routing::errors::RouteError;

/// Header carrying the request ID.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Origin used to resolve origin-form request targets (`/api/ping`).
const DEFAULT_ORIGIN: &str = "http://localhost/";

/// Append-only list of log lines, shareable across tasks.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a line and mirror it to tracing.
    pub fn push(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(target: "spot_router::trace", "{}", line);
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }

    /// Snapshot of the lines recorded so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

/// Everything a matcher, handler or interceptor may know about a request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    headers: HeaderMap,
    url: Url,
    segments: Vec<String>,
    request_id: Option<String>,
    log: LogBuffer,
}

impl RequestContext {
    /// Build a context from a method, a request target and headers.
    ///
    /// Origin-form targets are resolved against the `Host` header when one
    /// is present.
    pub fn new(method: Method, target: &str, headers: HeaderMap) -> Result<Self, RouteError> {
        let origin = match headers.get("host").and_then(|h| h.to_str().ok()) {
            Some(host) => Url::parse(&format!("http://{}/", host)),
            None => Url::parse(DEFAULT_ORIGIN),
        }
        .map_err(|e| RouteError::BadRequest(format!("invalid host: {}", e)))?;
        let invalid = |e: &dyn std::fmt::Display| {
            RouteError::BadRequest(format!("invalid request target {}: {}", target, e))
        };

        // Origin-form keeps the origin; `//x` is a doubled slash, not a host
        let mut url = if target.starts_with('/') {
            let pq: PathAndQuery = target.parse().map_err(|e| invalid(&e))?;
            let mut url = origin;
            url.set_query(pq.query());
            url.set_path(pq.path());
            url
        } else {
            Url::parse(target).map_err(|e| invalid(&e))?
        };
        let path = collapse_slashes(url.path());
        url.set_path(&path);

        let segments = url
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect();

        let request_id = headers
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(Self {
            method,
            headers,
            url,
            segments,
            request_id,
            log: LogBuffer::new(),
        })
    }

    /// Build a context from an inbound HTTP request, ignoring its body.
    pub fn from_request<B>(req: &Request<B>) -> Result<Self, RouteError> {
        let target = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());
        let target = if req.uri().scheme().is_some() {
            req.uri().to_string()
        } else {
            target
        };
        Self::new(req.method().clone(), &target, req.headers().clone())
    }

    /// GET context for an absolute URL or an origin-form path.
    pub fn from_url(url: &str) -> Result<Self, RouteError> {
        Self::new(Method::GET, url, HeaderMap::new())
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Decoded, non-empty path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// First value of a query parameter.
    pub fn query(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// True only for `?debug=true`; any other value leaves debugging off.
    pub fn debug(&self) -> bool {
        self.query("debug").as_deref() == Some("true")
    }

    pub fn request_id(&self) -> &str {
        self.request_id.as_deref().unwrap_or("unknown")
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}

/// UUID v4 generator for tower-http's request ID middleware.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_context_from_origin_form() {
        let req = Request::builder()
            .uri("/api/direct/gdax/spot/btc-usd?debug=true")
            .header("Host", "prices.example.com")
            .header("x-request-id", "abc")
            .body(Body::empty())
            .unwrap();
        let ctx = RequestContext::from_request(&req).unwrap();
        assert_eq!(ctx.url().host_str(), Some("prices.example.com"));
        assert_eq!(ctx.path(), "/api/direct/gdax/spot/btc-usd");
        assert_eq!(ctx.segments(), ["api", "direct", "gdax", "spot", "btc-usd"]);
        assert_eq!(ctx.request_id(), "abc");
        assert!(ctx.debug());
    }

    #[test]
    fn test_debug_flag_requires_exact_true() {
        for (url, expected) in [
            ("/api/ping?debug=true", true),
            ("/api/ping?debug=", false),
            ("/api/ping?debug=TRUE", false),
            ("/api/ping?debgu=true", false),
            ("/api/ping", false),
        ] {
            assert_eq!(RequestContext::from_url(url).unwrap().debug(), expected, "{}", url);
        }
    }

    #[test]
    fn test_segments_are_decoded() {
        let ctx = RequestContext::from_url("https://example.com//api/direct/my%20prov/spot/").unwrap();
        assert_eq!(ctx.segments(), ["api", "direct", "my prov", "spot"]);
    }

    #[test]
    fn test_doubled_slashes_stay_in_the_path() {
        let req = Request::builder()
            .uri("//api/direct/gdax/spot/btc-usd?max-age=5")
            .header("Host", "prices.example.com")
            .body(Body::empty())
            .unwrap();
        let ctx = RequestContext::from_request(&req).unwrap();
        assert_eq!(ctx.url().host_str(), Some("prices.example.com"));
        assert_eq!(ctx.path(), "/api/direct/gdax/spot/btc-usd");
        assert_eq!(ctx.segments(), ["api", "direct", "gdax", "spot", "btc-usd"]);
        assert_eq!(ctx.query("max-age").as_deref(), Some("5"));

        let ctx = RequestContext::from_url("//api//ping").unwrap();
        assert_eq!(ctx.url().host_str(), Some("localhost"));
        assert_eq!(ctx.path(), "/api/ping");
    }

    #[test]
    fn test_cloned_context_shares_log() {
        let ctx = RequestContext::from_url("/api/ping").unwrap();
        let clone = ctx.clone();
        clone.log().push("from clone");
        ctx.log().push("from original");
        assert_eq!(ctx.log().lines(), vec!["from clone", "from original"]);
    }
}
