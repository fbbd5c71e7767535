//! Leaf route handlers.
//!
//! # Responsibilities
//! - Answer ping, not-found, method-not-allowed and bad-request directly
//! - Serve a single provider's spot price for direct routes
//!
//! # Design Decisions
//! - Expected conditions (unknown route, wrong method) are replies, not errors
//! - Path and symbol problems are errors so racing handlers agree on them

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;

use crate::http::request::RequestContext;
use crate::http::response::Reply;
use crate::market::SpotQuery;
use crate::providers::SpotApi;
use crate::routing::errors::RouteResult;

/// Usage text returned with 400 responses.
pub const USAGE: &str = "\
Usage:
  GET /api/ping
  GET /api/race/spot/<base>-<target>
  GET /api/all/spot/<base>-<target>
  GET /api/direct/<provider>/spot/<base>-<target>
Query parameters:
  debug=true    return a percent-encoded trace in X-DEBUG
  max-age=<s>   accept a cached reply up to <s> seconds old
";

/// Something that can answer a request.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    /// Label used in logs and as the aggregate key.
    fn name(&self) -> &str;

    async fn handle(&self, ctx: &RequestContext) -> RouteResult<Reply>;
}

/// `pong;`
#[derive(Debug, Default)]
pub struct PingHandler;

#[async_trait]
impl RouteHandler for PingHandler {
    fn name(&self) -> &str {
        "ping"
    }

    async fn handle(&self, ctx: &RequestContext) -> RouteResult<Reply> {
        let reply = Reply::text("pong;");
        ctx.log().push(format!("Responding with pong; and {}", reply.status_code().as_u16()));
        Ok(reply)
    }
}

/// 404 Unknown route.
#[derive(Debug, Default)]
pub struct NotFoundHandler;

#[async_trait]
impl RouteHandler for NotFoundHandler {
    fn name(&self) -> &str {
        "not_found"
    }

    async fn handle(&self, ctx: &RequestContext) -> RouteResult<Reply> {
        ctx.log().push(format!("No route for {}", ctx.path()));
        Ok(Reply::status(StatusCode::NOT_FOUND, "Unknown route"))
    }
}

/// 405 Method not allowed.
#[derive(Debug, Default)]
pub struct MethodNotAllowedHandler;

#[async_trait]
impl RouteHandler for MethodNotAllowedHandler {
    fn name(&self) -> &str {
        "method_not_allowed"
    }

    async fn handle(&self, ctx: &RequestContext) -> RouteResult<Reply> {
        ctx.log().push(format!("{} not allowed on {}", ctx.method(), ctx.path()));
        Ok(Reply::status(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"))
    }
}

/// 400 with the usage text as body.
#[derive(Debug, Default)]
pub struct BadRequestHandler;

#[async_trait]
impl RouteHandler for BadRequestHandler {
    fn name(&self) -> &str {
        "bad_request"
    }

    async fn handle(&self, ctx: &RequestContext) -> RouteResult<Reply> {
        ctx.log().push(format!("Unrecognized api path {}", ctx.path()));
        Ok(bad_request_reply("Unrecognized api path"))
    }
}

/// 400 reply with the usage text.
pub fn bad_request_reply(status_text: &str) -> Reply {
    Reply::text(USAGE)
        .with_status(StatusCode::BAD_REQUEST)
        .with_status_text(status_text)
}

/// Spot price from one provider.
pub struct ProviderHandler {
    api: Arc<dyn SpotApi>,
}

impl ProviderHandler {
    pub fn new(api: Arc<dyn SpotApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RouteHandler for ProviderHandler {
    fn name(&self) -> &str {
        self.api.name()
    }

    async fn handle(&self, ctx: &RequestContext) -> RouteResult<Reply> {
        let query = SpotQuery::from_segments(ctx.segments())?;
        ctx.log().push(format!("{}: getting spot for {}", self.api.name(), query.symbol));

        let spot = self.api.get_spot(&query.symbol).await?;
        ctx.log().push(format!("{}: price {} at {}", spot.provider, spot.price, spot.utc_time));

        Ok(Reply::json(&spot)?.with_provider(self.api.name()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::market::{InstrumentSymbol, SpotPrice};
    use crate::providers::{UpstreamError, UpstreamResult};
    use crate::routing::errors::RouteError;

    /// Provider that answers from memory.
    pub(crate) struct StaticApi {
        pub name: &'static str,
        pub price: &'static str,
    }

    #[async_trait]
    impl SpotApi for StaticApi {
        fn name(&self) -> &str {
            self.name
        }

        async fn get_spot(&self, symbol: &InstrumentSymbol) -> UpstreamResult<SpotPrice> {
            if self.price.is_empty() {
                return Err(UpstreamError::Status {
                    provider: self.name.to_string(),
                    status: 503,
                });
            }
            Ok(SpotPrice {
                symbol: symbol.to_string(),
                price: self.price.to_string(),
                utc_time: "2018-03-23T05:23:59.807Z".to_string(),
                provider: self.name.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_ping() {
        let ctx = RequestContext::from_url("/api/ping").unwrap();
        let reply = PingHandler.handle(&ctx).await.unwrap();
        assert_eq!(reply.status_code(), StatusCode::OK);
        assert_eq!(reply.body_text(), "pong;");
        assert_eq!(ctx.log().lines(), vec!["Responding with pong; and 200"]);
    }

    #[tokio::test]
    async fn test_status_handlers() {
        let ctx = RequestContext::from_url("/rando").unwrap();
        let reply = NotFoundHandler.handle(&ctx).await.unwrap();
        assert_eq!(reply.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(reply.status_text(), Some("Unknown route"));

        let reply = MethodNotAllowedHandler.handle(&ctx).await.unwrap();
        assert_eq!(reply.status_code(), StatusCode::METHOD_NOT_ALLOWED);

        let reply = BadRequestHandler.handle(&ctx).await.unwrap();
        assert_eq!(reply.status_code(), StatusCode::BAD_REQUEST);
        assert!(reply.body_text().contains("/api/race/spot/<base>-<target>"));
    }

    #[tokio::test]
    async fn test_provider_handler_returns_symbol() {
        let handler = ProviderHandler::new(Arc::new(StaticApi { name: "gdax", price: "8371.58" }));
        let ctx = RequestContext::from_url("/api/direct/gdax/spot/btc-usd").unwrap();
        let reply = handler.handle(&ctx).await.unwrap();

        assert_eq!(reply.provider(), Some("gdax"));
        let spot: SpotPrice = serde_json::from_slice(reply.body()).unwrap();
        assert_eq!(spot.symbol, "btc-usd");
        assert_eq!(spot.price, "8371.58");
    }

    #[tokio::test]
    async fn test_provider_handler_rejects_bad_symbol() {
        let handler = ProviderHandler::new(Arc::new(StaticApi { name: "gdax", price: "1" }));
        let ctx = RequestContext::from_url("/api/direct/gdax/spot/btcusd").unwrap();
        let err = handler.handle(&ctx).await.unwrap_err();
        assert!(matches!(err, RouteError::InvalidSymbol(_)));
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let handler = ProviderHandler::new(Arc::new(StaticApi { name: "bitfinex", price: "" }));
        let ctx = RequestContext::from_url("/api/direct/bitfinex/spot/btc-usd").unwrap();
        let err = handler.handle(&ctx).await.unwrap_err();
        assert!(matches!(err, RouteError::Upstream(_)));
        assert_eq!(err.to_string(), "bitfinex returned status 503");
    }
}
