//! Handler traits the instrumentation wrapper decorates.

use async_trait::async_trait;
use axum::{body::Body, http::Request};

use crate::http::context::{PathVars, RequestContext};
use crate::http::response::ResponseWriter;

/// An application handler writing its response through a `ResponseWriter`.
#[async_trait]
pub trait Handler: Send + Sync {
    type Error: Send + 'static;

    async fn call(
        &self,
        ctx: RequestContext,
        req: Request<Body>,
        w: &mut dyn ResponseWriter,
    ) -> Result<(), Self::Error>;
}

/// A handler that also receives the variables extracted from its route
/// template. The map is always present and may be empty.
#[async_trait]
pub trait HandlerWithVars: Send + Sync {
    type Error: Send + 'static;

    async fn call(
        &self,
        ctx: RequestContext,
        req: Request<Body>,
        w: &mut dyn ResponseWriter,
        vars: PathVars,
    ) -> Result<(), Self::Error>;
}
