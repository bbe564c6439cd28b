//! Request instrumentation for HTTP handlers.
//!
//! Wraps application handlers with correlation-tagged structured logging and
//! per-route latency and body-size histograms.

pub mod config;
pub mod http;
pub mod observability;

pub use config::schema::ServiceConfig;
pub use http::{Handler, HandlerWithVars, HttpServer, Instrumentation, RequestContext, ResponseWriter};
pub use observability::metrics::HttpMetrics;
