//! Debug trace interceptor.

use axum::http::{HeaderName, HeaderValue};

use crate::http::request::RequestContext;
use crate::http::response::Reply;
use crate::interceptors::{encode_component, Interceptor};

/// Percent-encoded, newline-joined log trace.
pub static X_DEBUG: HeaderName = HeaderName::from_static("x-debug");

/// Percent-encoded error message, set by the router in debug mode.
pub static X_DEBUG_ERROR: HeaderName = HeaderName::from_static("x-debug-error");

/// Adds `X-DEBUG` to replies when the request carries `?debug=true`.
#[derive(Debug, Default)]
pub struct LogInterceptor;

impl LogInterceptor {
    fn trace(ctx: &RequestContext, reply: &Reply) -> String {
        let mut lines = ctx.log().lines();
        lines.extend(reply.log_lines().iter().cloned());
        lines.join("\n")
    }
}

impl Interceptor for LogInterceptor {
    fn name(&self) -> &'static str {
        "log"
    }

    fn pre_process(&self, ctx: &RequestContext, current: Option<Reply>) -> Option<Reply> {
        if ctx.debug() {
            ctx.log()
                .push(format!("{} {} ({})", ctx.method(), ctx.url(), ctx.request_id()));
        }
        current
    }

    fn post_process(&self, ctx: &RequestContext, mut reply: Reply) -> Reply {
        if !ctx.debug() {
            return reply;
        }
        ctx.log().push(format!("Status {}", reply.status_code().as_u16()));
        let encoded = encode_component(&Self::trace(ctx, &reply));
        match HeaderValue::from_str(&encoded) {
            Ok(value) => reply.set_header(X_DEBUG.clone(), value),
            Err(e) => tracing::warn!(error = %e, "Could not attach debug trace"),
        }
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use percent_encoding::percent_decode_str;

    #[test]
    fn test_no_header_without_debug() {
        for url in ["/api/ping", "/api/ping?debug=yes", "/api/ping?debug="] {
            let ctx = RequestContext::from_url(url).unwrap();
            ctx.log().push("something");
            let reply = LogInterceptor.post_process(&ctx, Reply::text("pong;"));
            assert!(reply.header("x-debug").is_none(), "{}", url);
        }
    }

    #[test]
    fn test_header_joins_request_and_reply_lines() {
        let ctx = RequestContext::from_url("/api/ping?debug=true").unwrap();
        assert!(LogInterceptor.pre_process(&ctx, None).is_none());
        ctx.log().push("handler line");

        let mut reply = Reply::text("pong;");
        reply.log_line("reply line");
        let reply = LogInterceptor.post_process(&ctx, reply);

        let header = reply.header("x-debug").unwrap().to_str().unwrap();
        let decoded = percent_decode_str(header).decode_utf8().unwrap();
        let lines: Vec<&str> = decoded.split('\n').collect();
        assert!(lines[0].starts_with("GET http://localhost/api/ping?debug=true"));
        assert!(lines.contains(&"handler line"));
        assert!(lines.contains(&"Status 200"));
        assert_eq!(lines.last(), Some(&"reply line"));
    }

    #[test]
    fn test_pre_process_passes_substitute_through() {
        let ctx = RequestContext::from_url("/api/ping?debug=true").unwrap();
        let out = LogInterceptor.pre_process(&ctx, Some(Reply::text("cached")));
        assert_eq!(out.unwrap().body_text(), "cached");
    }
}
