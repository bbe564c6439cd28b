//! HTTP server setup and handler dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up server-level layers (request timeout, body limit)
//! - Drive instrumented handlers through a buffered response
//! - Bind server to listener with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{FromRequestParts, Path},
    http::{HeaderName, Request},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

use crate::config::ServiceConfig;
use crate::http::context::{PathVars, RequestContext};
use crate::http::handler::{Handler, HandlerWithVars};
use crate::http::handlers::{Echo, GetUser, Health};
use crate::http::middleware::Instrumentation;
use crate::http::response::BufferedResponse;
use crate::observability::metrics::HttpMetrics;

/// Dispatch an axum request to `handler`.
///
/// The context is built from the matched route and `tenant_header`; a
/// handler error is turned into the response with `IntoResponse`.
pub async fn serve<H>(handler: &H, tenant_header: &HeaderName, req: Request<Body>) -> Response
where
    H: Handler + ?Sized,
    H::Error: IntoResponse,
{
    let ctx = RequestContext::from_request(&req, tenant_header);
    let mut response = BufferedResponse::new();
    match handler.call(ctx, req, &mut response).await {
        Ok(()) => response.into_response(),
        Err(err) => err.into_response(),
    }
}

/// Dispatch an axum request to a handler taking path variables.
///
/// Variables come from the matched route template; a route without
/// variables yields an empty map.
pub async fn serve_with_vars<H>(
    handler: &H,
    tenant_header: &HeaderName,
    req: Request<Body>,
) -> Response
where
    H: HandlerWithVars + ?Sized,
    H::Error: IntoResponse,
{
    let ctx = RequestContext::from_request(&req, tenant_header);

    let (mut parts, body) = req.into_parts();
    let vars = Path::<PathVars>::from_request_parts(&mut parts, &())
        .await
        .map(|Path(vars)| vars)
        .unwrap_or_default();
    let req = Request::from_parts(parts, body);

    let mut response = BufferedResponse::new();
    match handler.call(ctx, req, &mut response, vars).await {
        Ok(()) => response.into_response(),
        Err(err) => err.into_response(),
    }
}

/// HTTP server for the instrumented API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig, metrics: HttpMetrics) -> Self {
        let instrumentation = Instrumentation::new(metrics);
        let router = Self::build_router(&config, &instrumentation);
        Self { router }
    }

    /// Build the Axum router with all handlers and layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, instrumentation: &Instrumentation) -> Router {
        let tenant_header = config.observability.tenant_header();

        let health = Arc::new(instrumentation.wrap(Health));
        let users = Arc::new(instrumentation.wrap_with_vars(GetUser));
        let echo = Arc::new(instrumentation.wrap(Echo));

        Router::new()
            .route("/health", get({
                let tenant_header = tenant_header.clone();
                move |req: Request<Body>| async move {
                    serve(health.as_ref(), &tenant_header, req).await
                }
            }))
            .route("/users/{id}", get({
                let tenant_header = tenant_header.clone();
                move |req: Request<Body>| async move {
                    serve_with_vars(users.as_ref(), &tenant_header, req).await
                }
            }))
            .route("/echo", post({
                let tenant_header = tenant_header.clone();
                move |req: Request<Body>| async move {
                    serve(echo.as_ref(), &tenant_header, req).await
                }
            }))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
    }

    /// The router, for embedding or driving directly.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Run the server until `shutdown` resolves.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
