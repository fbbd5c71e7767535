//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum app with a single catch-all dispatch handler
//! - Wire up middleware (timeout, request ID, tracing)
//! - Bind server to listener and serve until the shutdown future resolves
//! - Hand every request to the routing engine

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::cache::WindowCache;
use crate::config::RouterConfig;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::providers::ProviderSet;
use crate::routing::Router as SpotRouter;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<SpotRouter>,
}

/// HTTP front end for the spot router.
pub struct HttpServer {
    app: Router,
}

impl HttpServer {
    /// Build providers, cache and route table from `config`.
    pub fn new(config: RouterConfig) -> Result<Self, ServerError> {
        let providers = ProviderSet::from_config(&config.providers, &config.timeouts)?;
        let router = SpotRouter::from_config(&config, &providers, WindowCache::new());
        Ok(Self::with_router(config, router))
    }

    /// Serve an already-built route table.
    pub fn with_router(config: RouterConfig, router: SpotRouter) -> Self {
        let state = AppState {
            router: Arc::new(router),
        };
        Self {
            app: Self::build_router(&config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// The layered Axum app, for serving or for `oneshot` in tests.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Run the server until `shutdown` resolves, then drain in-flight requests.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Single entry point: every method and path goes through the route table.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    // Handlers never read the body
    let (parts, _body) = request.into_parts();
    let request = Request::from_parts(parts, ());

    tracing::debug!(
        method = %request.method(),
        path = %request.uri().path(),
        "Dispatching request"
    );
    state.router.handle(&request).await.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode};
    use hyper::ext::ReasonPhrase;
    use tower::ServiceExt;

    use crate::routing::handlers::tests::StaticApi;

    fn server() -> HttpServer {
        let config = RouterConfig::default();
        let providers = ProviderSet::new().with(Arc::new(StaticApi { name: "gdax", price: "8371.58" }));
        let router = SpotRouter::from_config(&config, &providers, WindowCache::new());
        HttpServer::with_router(config, router)
    }

    async fn send(method: Method, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        server().app().oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_ping_through_app() {
        let response = send(Method::GET, "/api/ping").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"pong;");
    }

    #[tokio::test]
    async fn test_status_text_reaches_response() {
        let response = send(Method::GET, "/rando").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let reason = response.extensions().get::<ReasonPhrase>().unwrap();
        assert_eq!(reason.as_bytes(), b"Unknown route");
    }

    #[tokio::test]
    async fn test_every_method_reaches_router() {
        for method in [Method::POST, Method::PUT, Method::DELETE] {
            let response = send(method, "/api/ping").await;
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        }
        let response = send(Method::GET, "/").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_client_request_id_is_propagated() {
        let request = Request::builder()
            .uri("/api/ping")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = server().app().oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }
}
