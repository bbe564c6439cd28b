//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use axum::http::HeaderName;
use serde::{Deserialize, Serialize};

/// Root configuration for the instrumented service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration, enforced by the server layer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the metrics exporter.
    pub metrics_enabled: bool,

    /// Metrics exporter bind address.
    pub metrics_address: String,

    /// Request header carrying the tenant identifier.
    pub tenant_header: String,

    /// Histogram bucket layout.
    pub metrics: MetricsConfig,
}

impl ObservabilityConfig {
    /// The tenant header as a `HeaderName`, falling back to the default when
    /// the configured value is not a valid header name.
    pub fn tenant_header(&self) -> HeaderName {
        HeaderName::try_from(self.tenant_header.as_str())
            .unwrap_or_else(|_| HeaderName::from_static(DEFAULT_TENANT_HEADER))
    }
}

pub const DEFAULT_TENANT_HEADER: &str = "x-tenant-id";

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
            tenant_header: DEFAULT_TENANT_HEADER.to_string(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Histogram bucket configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Upper bounds for `http_request_duration_seconds`.
    pub duration_buckets: Vec<f64>,

    /// First bound for the request/response byte histograms.
    pub size_bucket_start: f64,

    /// Distance between byte histogram bounds.
    pub size_bucket_width: f64,

    /// Number of byte histogram bounds.
    pub size_bucket_count: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            // Prometheus client defaults.
            duration_buckets: vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
            size_bucket_start: 0.0,
            size_bucket_width: 1000.0,
            size_bucket_count: 5,
        }
    }
}
