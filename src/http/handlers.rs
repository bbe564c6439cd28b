//! Application handlers served by the bundled server.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::http::context::{PathVars, RequestContext};
use crate::http::handler::{Handler, HandlerWithVars};
use crate::http::response::ResponseWriter;

/// Errors returned by the bundled handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing path variable `{0}`")]
    MissingVar(&'static str),

    #[error("request body is empty")]
    EmptyBody,

    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("failed to write response: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode response: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingVar(_) => StatusCode::NOT_FOUND,
            AppError::EmptyBody | AppError::Body(_) => StatusCode::BAD_REQUEST,
            AppError::Io(_) | AppError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log the failure. Handlers call this before returning, while the
    /// request span (and its correlation ID) is still entered.
    fn log(&self) {
        if self.status().is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Liveness probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct Health;

#[async_trait]
impl Handler for Health {
    type Error = AppError;

    async fn call(
        &self,
        _ctx: RequestContext,
        _req: Request<Body>,
        w: &mut dyn ResponseWriter,
    ) -> Result<(), AppError> {
        w.write(b"ok")
            .map_err(AppError::from)
            .inspect_err(AppError::log)?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct UserView<'a> {
    id: &'a str,
    tenant: Option<&'a str>,
}

/// `GET /users/{id}`: renders the user ID and tenant as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetUser;

#[async_trait]
impl HandlerWithVars for GetUser {
    type Error = AppError;

    async fn call(
        &self,
        ctx: RequestContext,
        _req: Request<Body>,
        w: &mut dyn ResponseWriter,
        vars: PathVars,
    ) -> Result<(), AppError> {
        render_user(&ctx, w, &vars).inspect_err(AppError::log)
    }
}

fn render_user(
    ctx: &RequestContext,
    w: &mut dyn ResponseWriter,
    vars: &PathVars,
) -> Result<(), AppError> {
    let id = vars.get("id").ok_or(AppError::MissingVar("id"))?;
    tracing::debug!(user_id = %id, "Rendering user");

    let body = serde_json::to_vec(&UserView {
        id,
        tenant: ctx.tenant(),
    })?;

    w.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    w.write_header(StatusCode::OK);
    w.write(&body)?;
    Ok(())
}

/// `POST /echo`: writes the request body back, rejecting empty bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct Echo;

#[async_trait]
impl Handler for Echo {
    type Error = AppError;

    async fn call(
        &self,
        _ctx: RequestContext,
        req: Request<Body>,
        w: &mut dyn ResponseWriter,
    ) -> Result<(), AppError> {
        echo(req, w).await.inspect_err(AppError::log)
    }
}

async fn echo(req: Request<Body>, w: &mut dyn ResponseWriter) -> Result<(), AppError> {
    let content_type = req.headers().get(header::CONTENT_TYPE).cloned();
    let body = axum::body::to_bytes(req.into_body(), usize::MAX).await?;
    if body.is_empty() {
        return Err(AppError::EmptyBody);
    }

    if let Some(content_type) = content_type {
        w.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    w.write(&body)?;
    Ok(())
}
