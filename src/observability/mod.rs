//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Instrumented handlers produce:
//!     → logging.rs (structured log events, one summary line per request)
//!     → metrics.rs (latency and body-size histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Correlation ID flows through every event of a request
//! - Metrics recorder is injected, not global

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::{HttpMetrics, MetricsError};
