//! Per-request logging and metrics around an application handler.
//!
//! # Data Flow
//! ```text
//! RequestContext + Request + ResponseWriter
//!     → correlation ID + request span
//!     → ResponseObserver wraps the sink
//!     → inner handler (runs inside the span)
//!     → RequestObservation (timing, bytes, status, route, tenant)
//!     → HttpMetrics (if a route was resolved)
//!     → one INFO line (if the handler returned Ok)
//!     → handler result, unchanged
//! ```
//!
//! # Design Decisions
//! - Route and tenant come from resolver functions set at construction;
//!   the context's own `route`/`tenant` fields are the default resolvers
//! - No route means no metrics, so unmatched requests add no label values
//! - Failed requests are still timed and measured, only the log line is
//!   left to the caller

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
};
use tracing::{Instrument, Level, Span};

use crate::http::context::{CorrelationId, PathVars, RequestContext};
use crate::http::handler::{Handler, HandlerWithVars};
use crate::http::middleware::observer::ResponseObserver;
use crate::http::response::ResponseWriter;
use crate::observability::metrics::HttpMetrics;

/// Resolves a value (route template, tenant) from the request context.
pub type Resolver = Arc<dyn Fn(&RequestContext) -> Option<String> + Send + Sync>;

/// Everything observed about one completed request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestObservation {
    pub method: Method,
    pub path: String,
    pub route: Option<String>,
    pub tenant: Option<String>,
    pub status: StatusCode,
    pub elapsed: Duration,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl RequestObservation {
    /// Elapsed time in whole milliseconds, truncated.
    pub fn execution_ms(&self) -> u64 {
        elapsed_millis(self.elapsed)
    }

    fn log(&self, span: &Span) {
        tracing::info!(
            parent: span,
            tenant = self.tenant.as_deref().unwrap_or_default(),
            api_route = self.route.as_deref().unwrap_or_default(),
            api_http_status = self.status.as_u16(),
            api_http_method = %self.method,
            api_http_path = %self.path,
            execution_ms = self.execution_ms(),
            net_bytes_in = self.bytes_in,
            net_bytes_out = self.bytes_out,
            net_proto = "http",
            "Processed API request"
        );
    }
}

/// Request instrumentation: correlation-tagged logging plus latency and
/// size histograms.
#[derive(Clone)]
pub struct Instrumentation {
    metrics: HttpMetrics,
    route_resolver: Resolver,
    tenant_resolver: Resolver,
}

impl Instrumentation {
    /// Instrumentation reading route and tenant from the context itself.
    pub fn new(metrics: HttpMetrics) -> Self {
        Self {
            metrics,
            route_resolver: Arc::new(context_route),
            tenant_resolver: Arc::new(context_tenant),
        }
    }

    /// Replace the route resolver.
    pub fn with_route_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&RequestContext) -> Option<String> + Send + Sync + 'static,
    {
        self.route_resolver = Arc::new(resolver);
        self
    }

    /// Replace the tenant resolver.
    pub fn with_tenant_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&RequestContext) -> Option<String> + Send + Sync + 'static,
    {
        self.tenant_resolver = Arc::new(resolver);
        self
    }

    /// Decorate `handler`.
    pub fn wrap<H: Handler>(&self, handler: H) -> Instrumented<H> {
        Instrumented {
            instrumentation: self.clone(),
            inner: handler,
        }
    }

    /// Decorate a handler that receives path variables.
    pub fn wrap_with_vars<H: HandlerWithVars>(&self, handler: H) -> InstrumentedWithVars<H> {
        InstrumentedWithVars {
            instrumentation: self.clone(),
            inner: handler,
        }
    }

    /// Run `handler` for one request, observing it.
    pub async fn run<H>(
        &self,
        ctx: RequestContext,
        req: Request<Body>,
        w: &mut dyn ResponseWriter,
        handler: &H,
    ) -> Result<(), H::Error>
    where
        H: Handler + ?Sized,
    {
        let correlation_id = CorrelationId::new();
        let span = request_span(&ctx, correlation_id);

        let start = Instant::now();

        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let bytes_in = content_length(req.headers());

        let mut observer = ResponseObserver::new(w);
        let handler_ctx = ctx
            .clone()
            .with_logger(span.clone())
            .with_correlation_id(correlation_id);

        let result = handler
            .call(handler_ctx, req, &mut observer)
            .instrument(span.clone())
            .await;

        let observation = RequestObservation {
            elapsed: start.elapsed(),
            method,
            path,
            route: (self.route_resolver)(&ctx).filter(|r| !r.is_empty()),
            tenant: (self.tenant_resolver)(&ctx),
            status: observer.status().unwrap_or(StatusCode::OK),
            bytes_in,
            bytes_out: observer.bytes_written(),
        };

        if let Some(route) = observation.route.as_deref() {
            self.metrics.record_request(
                &observation.method,
                route,
                observation.elapsed,
                observation.bytes_in,
                observation.bytes_out,
            );
        }

        if result.is_ok() {
            observation.log(&span);
        }

        result
    }
}

impl std::fmt::Debug for Instrumentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instrumentation")
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

/// A handler decorated with `Instrumentation`.
#[derive(Debug, Clone)]
pub struct Instrumented<H> {
    instrumentation: Instrumentation,
    inner: H,
}

#[async_trait]
impl<H: Handler> Handler for Instrumented<H> {
    type Error = H::Error;

    async fn call(
        &self,
        ctx: RequestContext,
        req: Request<Body>,
        w: &mut dyn ResponseWriter,
    ) -> Result<(), Self::Error> {
        self.instrumentation.run(ctx, req, w, &self.inner).await
    }
}

/// A path-variable handler decorated with `Instrumentation`.
#[derive(Debug, Clone)]
pub struct InstrumentedWithVars<H> {
    instrumentation: Instrumentation,
    inner: H,
}

#[async_trait]
impl<H: HandlerWithVars> HandlerWithVars for InstrumentedWithVars<H> {
    type Error = H::Error;

    async fn call(
        &self,
        ctx: RequestContext,
        req: Request<Body>,
        w: &mut dyn ResponseWriter,
        vars: PathVars,
    ) -> Result<(), Self::Error> {
        let bound = BoundVars {
            inner: &self.inner,
            vars,
        };
        self.instrumentation.run(ctx, req, w, &bound).await
    }
}

/// Presents a `HandlerWithVars` plus one request's variables as a `Handler`.
struct BoundVars<'h, H: ?Sized> {
    inner: &'h H,
    vars: PathVars,
}

#[async_trait]
impl<'h, H: HandlerWithVars + ?Sized> Handler for BoundVars<'h, H> {
    type Error = H::Error;

    async fn call(
        &self,
        ctx: RequestContext,
        req: Request<Body>,
        w: &mut dyn ResponseWriter,
    ) -> Result<(), Self::Error> {
        self.inner.call(ctx, req, w, self.vars.clone()).await
    }
}

fn context_route(ctx: &RequestContext) -> Option<String> {
    ctx.route().map(str::to_owned)
}

fn context_tenant(ctx: &RequestContext) -> Option<String> {
    ctx.tenant().map(str::to_owned)
}

/// Request span carrying the correlation ID, parented on the context's
/// logger or the current span.
///
/// The span is ERROR level so it stays enabled under any filter that lets
/// events through, and every event inside it keeps the correlation ID.
fn request_span(ctx: &RequestContext, correlation_id: CorrelationId) -> Span {
    let parent = ctx.logger_or_current();
    tracing::span!(parent: &parent, Level::ERROR, "request", correlation_id = %correlation_id)
}

/// `Content-Length` as a byte count; anything unparseable counts as zero.
pub fn content_length(headers: &HeaderMap) -> u64 {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Whole milliseconds in `elapsed`, truncated toward zero.
pub fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
