//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, log settings and bucket layouts
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field}: `{value}` is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("observability.log_level: `{0}` is not a valid filter")]
    InvalidLogLevel(String),

    #[error("observability.tenant_header: `{0}` is not a valid header name")]
    InvalidTenantHeader(String),

    #[error("observability.metrics.duration_buckets must not be empty")]
    EmptyDurationBuckets,

    #[error("observability.metrics.duration_buckets must be strictly increasing")]
    UnorderedDurationBuckets,

    #[error("observability.metrics.size_bucket_width must be positive")]
    InvalidBucketWidth,

    #[error("observability.metrics.size_bucket_count must be positive")]
    InvalidBucketCount,

    #[error("timeouts.request_secs must be positive")]
    ZeroRequestTimeout,
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let observability = &config.observability;

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &observability.metrics_address,
        );
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if EnvFilter::try_new(&observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(observability.log_level.clone()));
    }

    if HeaderName::try_from(observability.tenant_header.as_str()).is_err() {
        errors.push(ValidationError::InvalidTenantHeader(
            observability.tenant_header.clone(),
        ));
    }

    let metrics = &observability.metrics;
    if metrics.duration_buckets.is_empty() {
        errors.push(ValidationError::EmptyDurationBuckets);
    } else if metrics.duration_buckets.windows(2).any(|w| w[0] >= w[1]) {
        errors.push(ValidationError::UnorderedDurationBuckets);
    }
    if !(metrics.size_bucket_width > 0.0) {
        errors.push(ValidationError::InvalidBucketWidth);
    }
    if metrics.size_bucket_count == 0 {
        errors.push(ValidationError::InvalidBucketCount);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
