//! Request-scoped values threaded explicitly from router to handler.
//!
//! # Responsibilities
//! - Generate per-request correlation IDs
//! - Carry tenant, route and logger span for one request
//! - Build a context from an axum request (matched route, tenant header)
//!
//! # Design Decisions
//! - Every field is optional; absence means "fall back to the default"
//! - A fresh context is built per request, never shared across requests

use std::collections::HashMap;

use axum::{
    extract::MatchedPath,
    http::{HeaderName, Request},
};
use tracing::Span;
use uuid::Uuid;

/// Path variables extracted from a templated route (`/users/{id}`).
pub type PathVars = HashMap<String, String>;

/// Unique identifier joining every log line of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generate a new random correlation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Uuid renders lower-case hyphenated.
        write!(f, "{}", self.0)
    }
}

/// Ambient values for a single request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    tenant: Option<String>,
    route: Option<String>,
    logger: Option<Span>,
    correlation_id: Option<CorrelationId>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from an axum request.
    ///
    /// The route comes from axum's `MatchedPath` (absent when nothing
    /// matched) and the tenant from `tenant_header`.
    pub fn from_request<B>(req: &Request<B>, tenant_header: &HeaderName) -> Self {
        let route = req
            .extensions()
            .get::<MatchedPath>()
            .map(|p| p.as_str().to_owned());
        let tenant = req
            .headers()
            .get(tenant_header)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned);

        Self {
            tenant,
            route,
            ..Self::default()
        }
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Use `span` as the base logger for this request.
    pub fn with_logger(mut self, span: Span) -> Self {
        self.logger = Some(span);
        self
    }

    pub(crate) fn with_correlation_id(mut self, id: CorrelationId) -> Self {
        self.correlation_id = Some(id);
        self
    }

    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Logger span attached to this context, if any.
    pub fn logger(&self) -> Option<&Span> {
        self.logger.as_ref()
    }

    /// Logger span attached to this context, or the current span.
    pub fn logger_or_current(&self) -> Span {
        self.logger.clone().unwrap_or_else(Span::current)
    }

    /// Correlation ID assigned by the instrumentation wrapper.
    pub fn correlation_id(&self) -> Option<CorrelationId> {
        self.correlation_id
    }
}
