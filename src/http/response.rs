//! Outgoing replies.
//!
//! # Responsibilities
//! - Hold a fully buffered response (status, status text, headers, body)
//! - Tag which provider produced it and keep its own log lines
//! - Convert into an axum response at the server boundary
//!
//! # Design Decisions
//! - Bodies are buffered: provider payloads are small and replies are
//!   cloned into the window cache
//! - Status text travels as hyper's `ReasonPhrase` extension (HTTP/1 only)

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use hyper::ext::ReasonPhrase;
use serde::Serialize;

/// A buffered response plus routing metadata.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    status_text: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    provider: Option<String>,
    log: Vec<String>,
    served_age_secs: Option<u64>,
}

impl Reply {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: None,
            headers: HeaderMap::new(),
            body: body.into(),
            provider: None,
            log: Vec::new(),
            served_age_secs: None,
        }
    }

    /// 200 with a plain-text body.
    pub fn text(body: impl Into<String>) -> Self {
        let mut reply = Self::new(StatusCode::OK, body.into());
        reply.set_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        reply
    }

    /// 200 with a JSON body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        let mut reply = Self::new(StatusCode::OK, body);
        reply.set_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(reply)
    }

    /// Empty body with a status and status text.
    pub fn status(status: StatusCode, status_text: impl Into<String>) -> Self {
        Self::new(status, Bytes::new()).with_status_text(status_text)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = Some(text.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status_text.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.remove(name);
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as UTF-8 text (lossy).
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn log_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(target: "spot_router::trace", "{}", line);
        self.log.push(line);
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Age in seconds, set when this reply came out of the window cache.
    pub fn served_age_secs(&self) -> Option<u64> {
        self.served_age_secs
    }

    pub fn mark_served_from_cache(&mut self, age_secs: u64) {
        self.served_age_secs = Some(age_secs);
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        if let Some(text) = self.status_text {
            match ReasonPhrase::try_from(text.into_bytes()) {
                Ok(reason) => {
                    response.extensions_mut().insert(reason);
                }
                Err(_) => tracing::warn!(status = %self.status, "Dropping invalid status text"),
            }
        }
        response
    }
}
