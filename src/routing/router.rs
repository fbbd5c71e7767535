//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store the ordered route table and interceptor chain
//! - Run pre-process interceptors, match, invoke, run post-process interceptors
//! - Convert handler failures into replies exactly once
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - First match wins; insertion order is priority order
//! - Explicit NotFound handler when nothing matches
//! - Handler panics are caught and reported like any other failure

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{HeaderValue, Request};
use futures_util::FutureExt;

use crate::cache::WindowCache;
use crate::config::RouterConfig;
use crate::http::request::RequestContext;
use crate::http::response::Reply;
use crate::interceptors::{encode_component, CacheInterceptor, Interceptor, LogInterceptor, X_DEBUG_ERROR};
use crate::observability::metrics;
use crate::providers::ProviderSet;
use crate::routing::combinators::{AllHandler, RaceHandler, SharedHandler};
use crate::routing::errors::RouteError;
use crate::routing::handlers::{bad_request_reply, NotFoundHandler, ProviderHandler};
use crate::routing::matcher::{ApiFallbackMatcher, DirectMatcher, PingMatcher, PrefixMatcher, RouteMatcher};

/// A handler selected for a request, with the route that selected it.
#[derive(Clone)]
pub struct RouteMatch {
    pub route: &'static str,
    pub handler: SharedHandler,
}

/// Top-level dispatcher.
pub struct Router {
    routes: Vec<Box<dyn RouteMatcher>>,
    interceptors: Vec<Box<dyn Interceptor>>,
}

/// Ordered construction of a [`Router`].
#[derive(Default)]
pub struct RouterBuilder {
    routes: Vec<Box<dyn RouteMatcher>>,
    interceptors: Vec<Box<dyn Interceptor>>,
}

impl RouterBuilder {
    /// Append a matcher; earlier matchers take priority.
    pub fn route(mut self, matcher: impl RouteMatcher + 'static) -> Self {
        self.routes.push(Box::new(matcher));
        self
    }

    /// Append an interceptor; both phases run in registration order.
    pub fn interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    pub fn build(self) -> Router {
        Router {
            routes: self.routes,
            interceptors: self.interceptors,
        }
    }
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// The standard route table over `providers`.
    ///
    /// Routes: ping, race, all, direct, then (strict validation only) a 400
    /// fallback for other `/api/...` paths. Interceptors: cache (if enabled),
    /// then log, so the debug header is computed on the final reply.
    pub fn from_config(config: &RouterConfig, providers: &ProviderSet, cache: WindowCache<Reply>) -> Self {
        let deadline = (config.timeouts.combinator_ms > 0)
            .then(|| Duration::from_millis(config.timeouts.combinator_ms));

        let direct: Vec<(String, SharedHandler)> = providers
            .iter()
            .map(|api| {
                let handler: SharedHandler = Arc::new(ProviderHandler::new(Arc::clone(api)));
                (api.name().to_string(), handler)
            })
            .collect();
        let fanout: Vec<SharedHandler> = direct.iter().map(|(_, h)| Arc::clone(h)).collect();

        let mut builder = Self::builder()
            .route(PingMatcher)
            .route(PrefixMatcher::race(Arc::new(
                RaceHandler::new(fanout.clone()).with_deadline(deadline),
            )))
            .route(PrefixMatcher::all(Arc::new(
                AllHandler::new(fanout).with_deadline(deadline),
            )))
            .route(DirectMatcher::new(direct));
        if config.routing.strict_validation {
            builder = builder.route(ApiFallbackMatcher);
        }
        if config.cache.enabled {
            builder = builder.interceptor(CacheInterceptor::new(cache));
        }
        let router = builder.interceptor(LogInterceptor).build();

        tracing::info!(
            routes = ?router.route_names(),
            interceptors = ?router.interceptor_names(),
            "Route table built"
        );
        router
    }

    pub fn route_names(&self) -> Vec<&'static str> {
        self.routes.iter().map(|r| r.name()).collect()
    }

    pub fn interceptor_names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    /// First matcher (in table order) that claims the request.
    pub fn match_request(&self, ctx: &RequestContext) -> Option<RouteMatch> {
        self.routes.iter().find_map(|route| {
            route.matches(ctx).map(|handler| RouteMatch {
                route: route.name(),
                handler,
            })
        })
    }

    /// Matched handler, or NotFound when nothing matches.
    pub fn route(&self, ctx: &RequestContext) -> RouteMatch {
        match self.match_request(ctx) {
            Some(m) => {
                tracing::debug!(request_id = %ctx.request_id(), route = m.route, path = %ctx.path(), "Found handler");
                m
            }
            None => {
                tracing::debug!(request_id = %ctx.request_id(), path = %ctx.path(), "No route matched");
                RouteMatch {
                    route: "none",
                    handler: Arc::new(NotFoundHandler),
                }
            }
        }
    }

    /// Answer an inbound HTTP request. Never fails.
    pub async fn handle<B>(&self, request: &Request<B>) -> Reply {
        let start = Instant::now();
        let method = request.method().to_string();

        let (route, reply) = match RequestContext::from_request(request) {
            Ok(ctx) => self.dispatch(&ctx).await,
            Err(e) => ("none", Self::error_reply(None, e)),
        };

        metrics::record_request(&method, reply.status_code().as_u16(), route, start);
        reply
    }

    /// Run the interceptor chain and route dispatch for a prepared context.
    ///
    /// Returns the name of the route that answered (or `intercepted` when a
    /// pre-process interceptor substituted a reply) with the final reply.
    pub async fn dispatch(&self, ctx: &RequestContext) -> (&'static str, Reply) {
        let mut substitute = None;
        for interceptor in &self.interceptors {
            substitute = interceptor.pre_process(ctx, substitute);
        }

        let (route, reply) = match substitute {
            Some(reply) => {
                tracing::debug!(request_id = %ctx.request_id(), path = %ctx.path(), "Dispatch skipped by interceptor");
                ("intercepted", reply)
            }
            None => {
                let RouteMatch { route, handler } = self.route(ctx);
                let outcome = AssertUnwindSafe(handler.handle(ctx))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| Err(RouteError::Task(format!("{} handler panicked", handler.name()))));
                let reply = match outcome {
                    Ok(reply) => reply,
                    Err(e) => Self::error_reply(Some(ctx), e),
                };
                (route, reply)
            }
        };

        let reply = self
            .interceptors
            .iter()
            .fold(reply, |reply, interceptor| interceptor.post_process(ctx, reply));
        (route, reply)
    }

    fn error_reply(ctx: Option<&RequestContext>, err: RouteError) -> Reply {
        let status = err.status();
        let message = err.to_string();
        metrics::record_route_error(err.kind());

        let request_id = ctx.map(RequestContext::request_id).unwrap_or("unknown");
        if status.is_server_error() {
            tracing::error!(request_id = %request_id, error = %message, "Handler failed");
        } else {
            tracing::warn!(request_id = %request_id, error = %message, "Request rejected");
        }

        let mut reply = if status == axum::http::StatusCode::BAD_REQUEST {
            bad_request_reply(&message)
        } else {
            Reply::status(status, format!("Error. {}", message))
        };

        if let Some(ctx) = ctx {
            ctx.log().push(format!("Error: {}", message));
            if ctx.debug() {
                if let Ok(value) = HeaderValue::from_str(&encode_component(&message)) {
                    reply.set_header(X_DEBUG_ERROR.clone(), value);
                }
            }
        }
        reply
    }
}
