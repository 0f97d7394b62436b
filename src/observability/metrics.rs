//! Backend and process metrics.
//!
//! # Responsibilities
//! - Derive success rate and error count from an outcome
//! - Describe the event as a structured log record
//! - Mirror it into the `metrics` facade for Prometheus scraping
//!
//! # Metrics
//! - `service_messages_total` (counter): events by type, target
//! - `service_errors_total` (counter): failed events by type, target
//! - `service_response_time_seconds` (histogram): response time by type, target

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use serde_json::{Map, Value};

use crate::observability::fields::keys;

pub const BACKEND_METRICS: &str = "BackendMetrics";
pub const PROCESS_METRICS: &str = "ProcessMetrics";

/// One metrics sample.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsEvent {
    pub metric_type: String,
    /// Backend or service the sample belongs to.
    pub target: String,
    /// 100 on success, 0 otherwise.
    pub success_rate: u32,
    /// 0 on success, 1 otherwise.
    pub error_count: u32,
    pub message_count: u32,
    pub response_time_ms: u64,
    extra: Map<String, Value>,
}

impl MetricsEvent {
    pub fn new(metric_type: impl Into<String>, success: bool, response_time: Duration) -> Self {
        let (success_rate, error_count) = if success { (100, 0) } else { (0, 1) };
        Self {
            metric_type: metric_type.into(),
            target: String::new(),
            success_rate,
            error_count,
            message_count: 1,
            response_time_ms: u64::try_from(response_time.as_millis()).unwrap_or(u64::MAX),
            extra: Map::new(),
        }
    }

    /// A `BackendMetrics` sample for a call to `backend` made by `service_name`.
    pub fn backend(
        backend: &str,
        service_name: &str,
        success: bool,
        response_time: Duration,
    ) -> Self {
        let mut event = Self::new(BACKEND_METRICS, success, response_time)
            .with_field(keys::BACKEND, backend)
            .with_field(keys::SERVICE_NAME, service_name);
        event.target = backend.to_owned();
        event
    }

    /// A `ProcessMetrics` sample for the whole of `service_name`.
    pub fn process(service_name: &str, success: bool, response_time: Duration) -> Self {
        let mut event = Self::new(PROCESS_METRICS, success, response_time)
            .with_field(keys::SERVICE_NAME, service_name);
        event.target = service_name.to_owned();
        event
    }

    pub fn with_field(mut self, key: &str, value: &str) -> Self {
        self.extra.insert(key.to_owned(), Value::String(value.to_owned()));
        self
    }

    pub fn is_success(&self) -> bool {
        self.error_count == 0
    }

    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(keys::METRICS_TYPE.into(), self.metric_type.clone().into());
        fields.insert(keys::MESSAGE_COUNT.into(), self.message_count.into());
        fields.insert(keys::ERROR_COUNT.into(), self.error_count.into());
        fields.insert(keys::SUCCESS_RATE.into(), self.success_rate.into());
        fields.insert(keys::RESPONSE_TIME_IN_MS.into(), self.response_time_ms.into());
        for (key, value) in &self.extra {
            fields.insert(key.clone(), value.clone());
        }
        fields
    }
}

/// Install the Prometheus exporter with its own scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Mirror a sample into the `metrics` recorder.
pub fn record_event(event: &MetricsEvent) {
    let metric_type = event.metric_type.clone();
    let target = event.target.clone();

    metrics::counter!(
        "service_messages_total",
        "type" => metric_type.clone(),
        "target" => target.clone()
    )
    .increment(u64::from(event.message_count));
    if !event.is_success() {
        metrics::counter!(
            "service_errors_total",
            "type" => metric_type.clone(),
            "target" => target.clone()
        )
        .increment(u64::from(event.error_count));
    }
    metrics::histogram!(
        "service_response_time_seconds",
        "type" => metric_type,
        "target" => target
    )
    .record(event.response_time_ms as f64 / 1000.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_derivation() {
        let event = MetricsEvent::new("ProcessMetrics", true, Duration::from_secs(3));
        assert_eq!(event.success_rate, 100);
        assert_eq!(event.error_count, 0);
        assert_eq!(event.message_count, 1);
        assert_eq!(event.response_time_ms, 3000);

        let event = MetricsEvent::new("ProcessMetrics", false, Duration::from_millis(1500));
        assert_eq!(event.success_rate, 0);
        assert_eq!(event.error_count, 1);
        assert_eq!(event.message_count, 1);
        assert_eq!(event.response_time_ms, 1500);
    }

    #[test]
    fn test_backend_fields() {
        let event =
            MetricsEvent::backend("BackendSample", "BackendService", true, Duration::from_secs(3));
        let fields = event.to_fields();

        assert_eq!(fields[keys::METRICS_TYPE], BACKEND_METRICS);
        assert_eq!(fields[keys::BACKEND], "BackendSample");
        assert_eq!(fields[keys::SERVICE_NAME], "BackendService");
        assert_eq!(fields[keys::RESPONSE_TIME_IN_MS], 3000);
        assert_eq!(event.target, "BackendSample");
    }

    #[test]
    fn test_process_fields() {
        let event = MetricsEvent::process("ApiService", false, Duration::from_millis(20));
        let fields = event.to_fields();

        assert_eq!(fields[keys::METRICS_TYPE], PROCESS_METRICS);
        assert_eq!(fields[keys::SERVICE_NAME], "ApiService");
        assert_eq!(fields[keys::ERROR_COUNT], 1);
        assert_eq!(fields[keys::SUCCESS_RATE], 0);
        assert!(!fields.contains_key(keys::BACKEND));
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        // no recorder installed: the macros fall back to a no-op
        record_event(&MetricsEvent::process("ApiService", false, Duration::from_millis(5)));
    }
}
