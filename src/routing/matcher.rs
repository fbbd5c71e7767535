//! Route matching logic.
//!
//! # Responsibilities
//! - Match path prefixes (case-sensitive) to handlers
//! - Validate the method inside the matcher that owns the route
//! - Select a provider by exact name for direct routes
//!
//! # Design Decisions
//! - Matchers are pure: no I/O, same input always yields the same handler
//! - A recognized but unsatisfiable route returns a handler (404/405), not
//!   `None`, so later matchers never see it
//! - No regex to guarantee O(n) matching

use std::sync::Arc;

use axum::http::Method;

use crate::http::request::RequestContext;
use crate::routing::combinators::SharedHandler;
use crate::routing::handlers::{
    BadRequestHandler, MethodNotAllowedHandler, NotFoundHandler, PingHandler,
};

/// Trait for selecting a handler for a request.
pub trait RouteMatcher: Send + Sync {
    /// Route identifier for logging/metrics.
    fn name(&self) -> &'static str;

    /// Returns a handler if this route claims the request.
    fn matches(&self, ctx: &RequestContext) -> Option<SharedHandler>;
}

fn get_only(ctx: &RequestContext, handler: &SharedHandler) -> SharedHandler {
    if ctx.method() == Method::GET {
        Arc::clone(handler)
    } else {
        Arc::new(MethodNotAllowedHandler)
    }
}

/// `/api/ping`
#[derive(Default)]
pub struct PingMatcher;

impl RouteMatcher for PingMatcher {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn matches(&self, ctx: &RequestContext) -> Option<SharedHandler> {
        if !ctx.path().starts_with("/api/ping") {
            return None;
        }
        if ctx.method() != Method::GET {
            return Some(Arc::new(MethodNotAllowedHandler));
        }
        Some(Arc::new(PingHandler))
    }
}

/// Matches a fixed path prefix and hands out one prebuilt handler.
pub struct PrefixMatcher {
    name: &'static str,
    prefix: &'static str,
    handler: SharedHandler,
}

impl PrefixMatcher {
    /// `/api/race/` → the given race handler.
    pub fn race(handler: SharedHandler) -> Self {
        Self {
            name: "race",
            prefix: "/api/race/",
            handler,
        }
    }

    /// `/api/all/` → the given aggregate handler.
    pub fn all(handler: SharedHandler) -> Self {
        Self {
            name: "all",
            prefix: "/api/all/",
            handler,
        }
    }
}

impl RouteMatcher for PrefixMatcher {
    fn name(&self) -> &'static str {
        self.name
    }

    fn matches(&self, ctx: &RequestContext) -> Option<SharedHandler> {
        ctx.path()
            .starts_with(self.prefix)
            .then(|| get_only(ctx, &self.handler))
    }
}

/// `/api/direct/<provider>/...`
pub struct DirectMatcher {
    providers: Vec<(String, SharedHandler)>,
}

impl DirectMatcher {
    pub fn new(providers: Vec<(String, SharedHandler)>) -> Self {
        Self { providers }
    }
}

impl RouteMatcher for DirectMatcher {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn matches(&self, ctx: &RequestContext) -> Option<SharedHandler> {
        if !ctx.path().starts_with("/api/direct") {
            return None;
        }
        let provider = ctx.segments().get(2)?;
        let handler = self
            .providers
            .iter()
            .find(|(name, _)| name == provider)
            .map(|(_, handler)| get_only(ctx, handler));
        match handler {
            Some(handler) => Some(handler),
            None => {
                ctx.log().push(format!("Unknown provider {}", provider));
                Some(Arc::new(NotFoundHandler))
            }
        }
    }
}

/// Any other `/api/...` path: 400 with usage help.
#[derive(Default)]
pub struct ApiFallbackMatcher;

impl RouteMatcher for ApiFallbackMatcher {
    fn name(&self) -> &'static str {
        "api_fallback"
    }

    fn matches(&self, ctx: &RequestContext) -> Option<SharedHandler> {
        (ctx.segments().first().map(String::as_str) == Some("api"))
            .then(|| Arc::new(BadRequestHandler) as SharedHandler)
    }
}
