//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use api_instrumentation::config::MetricsConfig;
use api_instrumentation::HttpMetrics;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// One captured event, with the fields of its enclosing spans merged in.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn message(&self) -> Option<&str> {
        self.field("message")
    }
}

#[derive(Debug, Default, Clone)]
struct FieldMap(BTreeMap<String, String>);

impl Visit for FieldMap {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

/// Layer recording every event into a shared buffer.
#[derive(Clone, Default)]
pub struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureLayer {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Events carrying the per-request summary message.
    pub fn summaries(&self) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.message() == Some("Processed API request"))
            .collect()
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut fields = FieldMap::default();
        attrs.record(&mut fields);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(fields);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut fields = FieldMap::default();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(span_fields) = span.extensions().get::<FieldMap>() {
                    fields.0.extend(span_fields.0.clone());
                }
            }
        }
        event.record(&mut fields);

        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: fields.0,
        });
    }
}

/// Install a capturing subscriber for the current thread.
pub fn capture_logs() -> (CaptureLayer, tracing::subscriber::DefaultGuard) {
    capture_logs_at(LevelFilter::TRACE)
}

/// Install a capturing subscriber that drops spans and events below `max`.
pub fn capture_logs_at(max: LevelFilter) -> (CaptureLayer, tracing::subscriber::DefaultGuard) {
    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(max).with(layer.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (layer, guard)
}

/// An isolated Prometheus-backed metrics registry.
pub fn test_metrics() -> (HttpMetrics, PrometheusHandle) {
    HttpMetrics::prometheus(&MetricsConfig::default()).unwrap()
}

/// Value of the `<series>_<suffix>` sample labelled with `route`, if any.
pub fn sample(handle: &PrometheusHandle, series: &str, suffix: &str, route: &str) -> Option<f64> {
    let prefix = format!("{series}_{suffix}{{");
    let route = format!("route=\"{route}\"");
    handle
        .render()
        .lines()
        .find(|l| l.starts_with(&prefix) && l.contains(&route))
        .and_then(|l| l.rsplit(' ').next())
        .and_then(|v| v.parse().ok())
}

/// Whether any sample of `series` was rendered at all.
pub fn has_series(handle: &PrometheusHandle, series: &str) -> bool {
    let prefix = format!("{series}_count");
    handle.render().lines().any(|l| l.starts_with(&prefix))
}
