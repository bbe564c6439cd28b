//! HTTP handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, timeouts, body limit)
//!     → context.rs (matched route, tenant header)
//!     → middleware/ (instrumentation around the handler)
//!     → handlers.rs (application handlers)
//!     → response.rs (buffered response → Axum response)
//!     → Send to client
//! ```

pub mod context;
pub mod handler;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;

pub use context::{CorrelationId, PathVars, RequestContext};
pub use handler::{Handler, HandlerWithVars};
pub use middleware::{Instrumentation, Instrumented, InstrumentedWithVars, ResponseObserver};
pub use response::{BufferedResponse, ResponseWriter};
pub use server::HttpServer;
