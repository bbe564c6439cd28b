//! Handler middleware.
//!
//! # Data Flow
//! ```text
//! router → instrument.rs (correlation ID, timer, metrics, log line)
//!            → observer.rs (counts bytes, records status)
//!              → application handler
//! ```

pub mod instrument;
pub mod observer;

pub use instrument::{Instrumentation, Instrumented, InstrumentedWithVars, RequestObservation, Resolver};
pub use observer::ResponseObserver;
