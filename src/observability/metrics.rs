//! Request metrics.
//!
//! # Responsibilities
//! - Describe the request histograms once, at construction
//! - Record per-request latency and body sizes, labelled by method and route
//! - Build Prometheus recorders with the configured buckets
//!
//! # Metrics
//! - `http_request_duration_seconds` (histogram): latency distribution
//! - `http_request_bytes` (histogram): inbound body size
//! - `http_response_bytes` (histogram): outbound body size
//!
//! # Design Decisions
//! - The recorder is injected, never installed globally
//! - Recorder handles are internally synchronised; `HttpMetrics` is `Clone`
//!   and shared across in-flight requests
//! - Labels are `method` and `route` only, keeping cardinality bounded

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use metrics::{Key, KeyName, Label, Level, Metadata, Recorder, SharedString, Unit};
use metrics_exporter_prometheus::{
    BuildError, ExporterFuture, Matcher, PrometheusBuilder, PrometheusHandle,
};
use thiserror::Error;

use crate::config::MetricsConfig;

pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const REQUEST_BYTES: &str = "http_request_bytes";
pub const RESPONSE_BYTES: &str = "http_response_bytes";

/// Errors raised while building the metrics backend.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to build Prometheus recorder: {0}")]
    Build(#[from] BuildError),
}

/// Registry of the request histograms.
///
/// `new` takes ownership of the recorder, so each recorder has its
/// histograms described exactly once. Share one registry across handlers by
/// cloning `HttpMetrics`; clones record into the same series.
#[derive(Clone)]
pub struct HttpMetrics {
    recorder: Arc<dyn Recorder + Send + Sync>,
}

impl HttpMetrics {
    /// Register the request histograms with `recorder`.
    pub fn new<R>(recorder: R) -> Self
    where
        R: Recorder + Send + Sync + 'static,
    {
        recorder.describe_histogram(
            KeyName::from(REQUEST_DURATION_SECONDS),
            Some(Unit::Seconds),
            SharedString::from("Histogram of API latency."),
        );
        recorder.describe_histogram(
            KeyName::from(REQUEST_BYTES),
            Some(Unit::Bytes),
            SharedString::from("Histogram of API incoming bytes, labelled by method and route."),
        );
        recorder.describe_histogram(
            KeyName::from(RESPONSE_BYTES),
            Some(Unit::Bytes),
            SharedString::from("Histogram of API outgoing bytes, labelled by method and route."),
        );

        Self {
            recorder: Arc::new(recorder),
        }
    }

    /// Build an isolated Prometheus recorder and return its render handle.
    pub fn prometheus(config: &MetricsConfig) -> Result<(Self, PrometheusHandle), MetricsError> {
        let recorder = prometheus_builder(config)?.build_recorder();
        let handle = recorder.handle();
        Ok((Self::new(recorder), handle))
    }

    /// Build a Prometheus recorder together with the exporter serving it on
    /// `addr`. The exporter future must be spawned on a Tokio runtime.
    pub fn with_http_listener(
        config: &MetricsConfig,
        addr: SocketAddr,
    ) -> Result<(Self, ExporterFuture), MetricsError> {
        let (recorder, exporter) = prometheus_builder(config)?
            .with_http_listener(addr)
            .build()?;
        Ok((Self::new(recorder), exporter))
    }

    /// Record one request against the `(method, route)` series.
    pub fn record_request(
        &self,
        method: &Method,
        route: &str,
        elapsed: Duration,
        bytes_in: u64,
        bytes_out: u64,
    ) {
        let labels = vec![
            Label::new("method", method.as_str().to_owned()),
            Label::new("route", route.to_owned()),
        ];

        self.histogram(REQUEST_DURATION_SECONDS, &labels, elapsed.as_secs_f64());
        self.histogram(REQUEST_BYTES, &labels, bytes_in as f64);
        self.histogram(RESPONSE_BYTES, &labels, bytes_out as f64);
    }

    fn histogram(&self, name: &'static str, labels: &[Label], value: f64) {
        let key = Key::from_parts(name, labels.to_vec());
        let metadata = Metadata::new(module_path!(), Level::INFO, Some(module_path!()));
        self.recorder.register_histogram(&key, &metadata).record(value);
    }
}

impl std::fmt::Debug for HttpMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMetrics").finish_non_exhaustive()
    }
}

/// Linear bucket boundaries: `count` buckets `width` apart from `start`.
pub fn linear_buckets(start: f64, width: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + width * i as f64).collect()
}

fn prometheus_builder(config: &MetricsConfig) -> Result<PrometheusBuilder, MetricsError> {
    let size_buckets = linear_buckets(
        config.size_bucket_start,
        config.size_bucket_width,
        config.size_bucket_count,
    );

    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )?
        .set_buckets_for_metric(Matcher::Full(REQUEST_BYTES.to_string()), &size_buckets)?
        .set_buckets_for_metric(Matcher::Full(RESPONSE_BYTES.to_string()), &size_buckets)?;

    Ok(builder)
}
