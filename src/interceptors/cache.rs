//! Window cache interceptor.
//!
//! # Responsibilities
//! - Read the client's acceptable age from `?max-age=N` or
//!   `Cache-Control: max-age=N` (seconds, query wins)
//! - Serve a fresh cached reply with an `Age` header, skipping dispatch
//! - Store successful replies keyed by request path
//!
//! # Design Decisions
//! - Only GET requests read or write; other methods must reach their matcher
//! - Writes honor the same enablement as reads: no max-age, no write
//! - Replies served from cache are not written back (their timestamp stays)
//! - Debug headers and log lines are stripped before storing

use std::time::Duration;

use axum::http::{header, HeaderValue, Method};

use crate::cache::{CacheEntry, WindowCache};
use crate::http::request::RequestContext;
use crate::http::response::Reply;
use crate::interceptors::{Interceptor, X_DEBUG, X_DEBUG_ERROR};
use crate::observability::metrics;

pub struct CacheInterceptor {
    cache: WindowCache<Reply>,
}

impl CacheInterceptor {
    pub fn new(cache: WindowCache<Reply>) -> Self {
        Self { cache }
    }

    /// Acceptable age for this request, or `None` when caching is off.
    pub fn max_age(ctx: &RequestContext) -> Option<Duration> {
        if ctx.method() != Method::GET {
            return None;
        }
        let secs = match ctx.query("max-age") {
            Some(value) => value.trim().parse::<i64>().ok(),
            None => ctx
                .header(header::CACHE_CONTROL.as_str())
                .and_then(|v| v.to_str().ok())
                .and_then(cache_control_max_age),
        };
        secs.filter(|s| *s > 0).map(|s| Duration::from_secs(s as u64))
    }
}

fn cache_control_max_age(value: &str) -> Option<i64> {
    value
        .split(',')
        .map(str::trim)
        .find_map(|directive| directive.strip_prefix("max-age="))
        .and_then(|n| n.trim_matches('"').parse().ok())
}

impl Interceptor for CacheInterceptor {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn pre_process(&self, ctx: &RequestContext, current: Option<Reply>) -> Option<Reply> {
        if current.is_some() {
            return current;
        }
        let max_age = Self::max_age(ctx)?;
        let entry = self.cache.try_get_entry(ctx.path(), max_age);
        metrics::record_cache_lookup(entry.is_some());

        let entry = match entry {
            Some(entry) => entry,
            None => {
                ctx.log().push(format!("Cache miss for {}", ctx.path()));
                return None;
            }
        };
        let age = entry.age_secs();
        ctx.log().push(format!("Cache hit for {} (age {}s)", ctx.path(), age));

        let mut reply = entry.item;
        reply.set_header(header::AGE, HeaderValue::from(age));
        reply.mark_served_from_cache(age);
        Some(reply)
    }

    fn post_process(&self, ctx: &RequestContext, reply: Reply) -> Reply {
        if reply.served_age_secs().is_some()
            || !reply.status_code().is_success()
            || Self::max_age(ctx).is_none()
        {
            return reply;
        }

        let mut stored = reply.clone();
        stored.remove_header(X_DEBUG.as_str());
        stored.remove_header(X_DEBUG_ERROR.as_str());
        stored.clear_log();
        self.cache.set_entry(ctx.path(), CacheEntry::new(stored));
        ctx.log().push(format!("Cached {}", ctx.path()));
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, Method, StatusCode};

    fn ctx(url: &str, cache_control: Option<&str>) -> RequestContext {
        let mut headers = HeaderMap::new();
        if let Some(cc) = cache_control {
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_str(cc).unwrap());
        }
        RequestContext::new(Method::GET, url, headers).unwrap()
    }

    #[test]
    fn test_max_age_sources() {
        assert_eq!(CacheInterceptor::max_age(&ctx("/p?max-age=30", None)), Some(Duration::from_secs(30)));
        assert_eq!(
            CacheInterceptor::max_age(&ctx("/p", Some("no-transform, max-age=12"))),
            Some(Duration::from_secs(12))
        );
        // Query wins over header
        assert_eq!(
            CacheInterceptor::max_age(&ctx("/p?max-age=5", Some("max-age=60"))),
            Some(Duration::from_secs(5))
        );
        assert_eq!(CacheInterceptor::max_age(&ctx("/p?max-age=0", Some("max-age=60"))), None);
        assert_eq!(CacheInterceptor::max_age(&ctx("/p?max-age=-3", None)), None);
        assert_eq!(CacheInterceptor::max_age(&ctx("/p?max-age=soon", None)), None);
        assert_eq!(CacheInterceptor::max_age(&ctx("/p", Some("no-cache"))), None);
        assert_eq!(CacheInterceptor::max_age(&ctx("/p", None)), None);
    }

    #[test]
    fn test_miss_then_store_then_hit() {
        let cache = WindowCache::new();
        let interceptor = CacheInterceptor::new(cache.clone());
        let request = ctx("/api/race/spot/btc-usd?max-age=60", None);

        assert!(interceptor.pre_process(&request, None).is_none());
        let reply = interceptor.post_process(&request, Reply::text("fresh"));
        assert_eq!(reply.body_text(), "fresh");
        assert_eq!(cache.len(), 1);

        let hit = interceptor.pre_process(&request, None).unwrap();
        assert_eq!(hit.body_text(), "fresh");
        assert_eq!(hit.header("age").unwrap(), "0");
        assert_eq!(hit.served_age_secs(), Some(0));
    }

    #[test]
    fn test_disabled_requests_neither_read_nor_write() {
        let cache = WindowCache::new();
        let interceptor = CacheInterceptor::new(cache.clone());
        let request = ctx("/api/race/spot/btc-usd", None);

        interceptor.post_process(&request, Reply::text("fresh"));
        assert!(cache.is_empty());

        cache.set_entry("/api/race/spot/btc-usd", CacheEntry::new(Reply::text("old")));
        assert!(interceptor.pre_process(&request, None).is_none());
    }

    #[test]
    fn test_errors_and_hits_are_not_stored() {
        let cache = WindowCache::new();
        let interceptor = CacheInterceptor::new(cache.clone());
        let request = ctx("/api/all/spot/btc-usd?max-age=60", None);

        interceptor.post_process(&request, Reply::status(StatusCode::INTERNAL_SERVER_ERROR, "Error. x"));
        assert!(cache.is_empty());

        let mut hit = Reply::text("from cache");
        hit.mark_served_from_cache(3);
        interceptor.post_process(&request, hit);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stored_reply_is_stripped() {
        let cache = WindowCache::new();
        let interceptor = CacheInterceptor::new(cache.clone());
        let request = ctx("/api/ping?max-age=60&debug=true", None);

        let mut reply = Reply::text("pong;");
        reply.set_header(X_DEBUG.clone(), HeaderValue::from_static("trace"));
        reply.log_line("line");
        let returned = interceptor.post_process(&request, reply);
        assert!(returned.header("x-debug").is_some());

        let stored = cache.get_entry("/api/ping").unwrap().item;
        assert!(stored.header("x-debug").is_none());
        assert!(stored.log_lines().is_empty());
    }

    #[test]
    fn test_only_get_uses_cache() {
        let cache = WindowCache::new();
        let interceptor = CacheInterceptor::new(cache.clone());
        let post = RequestContext::new(Method::POST, "/api/ping?max-age=60", HeaderMap::new()).unwrap();
        assert_eq!(CacheInterceptor::max_age(&post), None);

        interceptor.post_process(&post, Reply::text("pong;"));
        assert!(cache.is_empty());

        cache.set_entry("/api/ping", CacheEntry::new(Reply::text("pong;")));
        assert!(interceptor.pre_process(&post, None).is_none());
    }

    #[test]
    fn test_existing_substitute_is_kept() {
        let interceptor = CacheInterceptor::new(WindowCache::new());
        let request = ctx("/api/ping?max-age=60", None);
        let out = interceptor.pre_process(&request, Some(Reply::text("earlier")));
        assert_eq!(out.unwrap().body_text(), "earlier");
    }
}
