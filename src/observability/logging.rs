//! Structured logging facade.
//!
//! # Responsibilities
//! - Level-gated message emission (`debug`..`fatal`)
//! - Per-request scopes carrying accumulated key/value fields
//! - Writing `EndInfo`, fault and metrics events with fixed keys
//!
//! # Design Decisions
//! - No global logger: the root `Logger` is built once at startup and
//!   handed to whoever needs it; request scopes are cheap clones
//! - The gate is checked before anything is formatted or allocated
//! - Scope fields are copy-on-write, so a clone handed to a child task
//!   never sees fields attached later by its parent (and vice versa)
//! - Records are JSON objects: `logLevel`, scope fields, event fields,
//!   `message`, in that order; a later key replaces an earlier one

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::observability::fields::{
    keys, now_timestamp, EndInfo, ExceptionInfo, FaultDetails, FieldValue, LogEvent,
};
use crate::observability::level::Severity;
use crate::observability::metrics::{self, MetricsEvent};
use crate::observability::writer::{select_writer, LogWriter};

/// `debugf!(logger, "fmt", args..)`
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug(::std::format_args!($($arg)+))
    };
}

/// `infof!(logger, "fmt", args..)`
#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(::std::format_args!($($arg)+))
    };
}

/// `warnf!(logger, "fmt", args..)`
#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warn(::std::format_args!($($arg)+))
    };
}

/// `errorf!(logger, "fmt", args..)`
#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(::std::format_args!($($arg)+))
    };
}

/// `fatalf!(logger, "fmt", args..)`; never returns.
#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal(::std::format_args!($($arg)+))
    };
}

struct Core {
    threshold: Severity,
    writer: LogWriter,
}

/// Logger handle. Cloning is cheap; each clone is its own scope.
#[derive(Clone)]
pub struct Logger {
    core: Arc<Core>,
    fields: Arc<Map<String, Value>>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("threshold", &self.core.threshold)
            .field("console", &self.core.writer.is_console())
            .field("fields", &self.fields)
            .finish()
    }
}

impl Logger {
    pub fn new(threshold: Severity, writer: LogWriter) -> Self {
        Self {
            core: Arc::new(Core { threshold, writer }),
            fields: Arc::new(Map::new()),
        }
    }

    /// Build the process logger.
    ///
    /// Dev debug mode switches to console output and opens every level,
    /// including HTTP trace dumps, whatever `level` says.
    pub fn from_settings(level: Severity, dev_debug_mode: bool) -> Self {
        if dev_debug_mode {
            Self::new(Severity::Trace, select_writer(true))
        } else {
            Self::new(level, select_writer(false))
        }
    }

    pub fn threshold(&self) -> Severity {
        self.core.threshold
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        severity.passes(self.core.threshold)
    }

    /// Untagged records (metrics) are only stopped by `disabled`.
    fn untagged_enabled(&self) -> bool {
        self.core.threshold != Severity::Disabled
    }

    /// Fields accumulated in this scope.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// A child scope starting with this scope's fields.
    pub fn scoped(&self) -> Logger {
        self.clone()
    }

    /// A child scope with one more field.
    pub fn with_field(&self, key: &str, value: &str) -> Logger {
        let mut child = self.clone();
        child.attach_field(key, value);
        child
    }

    pub fn attach_field(&mut self, key: &str, value: &str) {
        self.insert(key, Value::String(value.to_owned()));
    }

    pub fn attach_structured_field(&mut self, key: &str, value: impl Into<FieldValue>) {
        match value.into().into_json() {
            Ok(json) => self.insert(key, json),
            Err(e) => self.error(format_args!("error on attach field {}: {}", key, e)),
        }
    }

    /// Attach any serializable value as an opaque field.
    pub fn attach_serializable<T>(&mut self, key: &str, value: &T)
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_value(value) {
            Ok(json) => self.attach_structured_field(key, FieldValue::Opaque(json)),
            Err(e) => self.error(format_args!("error on attach field {}: {}", key, e)),
        }
    }

    /// Stamp `info` and merge its fixed fields into this scope.
    pub fn attach_end_info(&mut self, info: &mut EndInfo) {
        info.stamp();
        let fields = Arc::make_mut(&mut self.fields);
        for (key, value) in info.to_fields() {
            fields.insert(key, value);
        }
    }

    fn insert(&mut self, key: &str, value: Value) {
        Arc::make_mut(&mut self.fields).insert(key.to_owned(), value);
    }

    pub fn trace(&self, args: fmt::Arguments<'_>) {
        self.log(Severity::Trace, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Severity::Debug, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Severity::Info, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Severity::Warn, args);
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Severity::Error, args);
    }

    /// Emit at `fatal`, then exit the process with status 1.
    pub fn fatal(&self, args: fmt::Arguments<'_>) -> ! {
        self.log(Severity::Fatal, args);
        std::process::exit(1)
    }

    /// Emit at `panic`, then panic with the same message.
    pub fn panic(&self, args: fmt::Arguments<'_>) -> ! {
        let message = args.to_string();
        if self.enabled(Severity::Panic) {
            self.write(Some(Severity::Panic), Map::new(), &message);
        }
        panic!("{}", message)
    }

    pub fn log(&self, severity: Severity, args: fmt::Arguments<'_>) {
        if !self.enabled(severity) {
            return;
        }
        let message = match args.as_str() {
            Some(s) => s.to_owned(),
            None => args.to_string(),
        };
        self.write(Some(severity), Map::new(), &message);
    }

    /// One-shot `EndInfo` record; the message is the log point.
    pub fn emit_end_info(&self, severity: Severity, info: &EndInfo) {
        if !self.enabled(severity) {
            return;
        }
        let mut info = info.clone();
        info.stamp();
        self.write(Some(severity), info.to_fields(), &info.log_point);
    }

    /// Fault record at `error`. `details` and an empty `payload` are left
    /// out of the record rather than written as empty values.
    pub fn emit_fault(
        &self,
        info: &ExceptionInfo,
        details: Option<&FaultDetails>,
        payload: Option<&str>,
    ) {
        if !self.enabled(Severity::Error) {
            return;
        }
        match fault_fields(info, details, payload) {
            Ok(fields) => self.write(Some(Severity::Error), fields, &info.end_message()),
            Err(e) => self.error(format_args!("error on log exception: {}", e)),
        }
    }

    /// Untagged metrics record; also feeds the metrics recorder.
    pub fn emit_metrics(&self, event: &MetricsEvent) {
        metrics::record_event(event);
        if self.untagged_enabled() {
            self.write(None, event.to_fields(), "");
        }
    }

    pub fn backend_metrics(
        &self,
        backend: &str,
        service_name: &str,
        success: bool,
        response_time: Duration,
    ) {
        self.emit_metrics(&MetricsEvent::backend(
            backend,
            service_name,
            success,
            response_time,
        ));
    }

    pub fn process_metrics(&self, service_name: &str, success: bool, response_time: Duration) {
        self.emit_metrics(&MetricsEvent::process(service_name, success, response_time));
    }

    /// Write any event without a level key.
    pub fn log_without_level(&self, event: &LogEvent) {
        match event {
            LogEvent::Metrics(metrics) => self.emit_metrics(metrics),
            _ if !self.untagged_enabled() => {}
            LogEvent::End(info) => {
                let mut info = info.clone();
                info.stamp();
                self.write(None, info.to_fields(), "");
            }
            LogEvent::Fault {
                info,
                details,
                payload,
            } => match fault_fields(info, details.as_ref(), payload.as_deref()) {
                Ok(fields) => self.write(None, fields, ""),
                Err(e) => self.error(format_args!("error on log exception: {}", e)),
            },
        }
    }

    fn write(&self, level: Option<Severity>, event_fields: Map<String, Value>, message: &str) {
        let mut record = Map::with_capacity(self.fields.len() + event_fields.len() + 2);
        if let Some(severity) = level {
            record.insert(keys::LOG_LEVEL.into(), severity.as_str().into());
        }
        for (key, value) in self.fields.iter() {
            record.insert(key.clone(), value.clone());
        }
        for (key, value) in event_fields {
            record.insert(key, value);
        }
        record.insert(keys::MESSAGE.into(), message.into());

        self.core.writer.write_record(level, &record);
    }
}

fn fault_fields(
    info: &ExceptionInfo,
    details: Option<&FaultDetails>,
    payload: Option<&str>,
) -> serde_json::Result<Map<String, Value>> {
    let mut exception = serde_json::to_value(info)?;
    if info.time_stamp.is_empty() {
        exception[keys::TIME_STAMP] = Value::String(now_timestamp());
    }

    let mut fields = Map::new();
    fields.insert(keys::EXCEPTION_INFO.into(), exception);
    if let Some(details) = details {
        fields.insert(keys::FAULT_DETAILS.into(), serde_json::to_value(details)?);
    }
    if let Some(payload) = payload.filter(|p| !p.is_empty()) {
        fields.insert(keys::REQUEST_PAYLOAD.into(), payload.into());
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::writer::MemorySink;
    use std::cell::Cell;

    fn capture(threshold: Severity) -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        (Logger::new(threshold, LogWriter::plain(sink.clone())), sink)
    }

    #[test]
    fn test_level_gate() {
        let (logger, sink) = capture(Severity::Info);

        crate::debugf!(logger, "hidden {}", 1);
        crate::infof!(logger, "shown {}", 2);
        crate::warnf!(logger, "warned");

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0][keys::LOG_LEVEL], "info");
        assert_eq!(records[0][keys::MESSAGE], "shown 2");
        assert_eq!(records[1][keys::LOG_LEVEL], "warn");
    }

    #[test]
    fn test_disabled_gate_skips_formatting() {
        struct Counted<'a>(&'a Cell<u32>);
        impl fmt::Display for Counted<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.set(self.0.get() + 1);
                f.write_str("x")
            }
        }

        let (logger, sink) = capture(Severity::Info);
        let calls = Cell::new(0);
        crate::debugf!(logger, "{}", Counted(&calls));

        assert_eq!(calls.get(), 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_scope_last_write_wins() {
        let (logger, sink) = capture(Severity::Debug);
        let mut scope = logger.scoped();
        scope.attach_field("transactionId", "Trx123");
        scope.attach_field("transactionId", "Trx456");
        crate::infof!(scope, "done");

        let line = &sink.lines()[0];
        assert_eq!(line.matches("\"transactionId\"").count(), 1);
        assert_eq!(sink.records()[0]["transactionId"], "Trx456");
    }

    #[test]
    fn test_scopes_are_isolated() {
        let (logger, sink) = capture(Severity::Debug);
        let parent = logger.with_field("channelId", "web");
        let mut child = parent.scoped();
        child.attach_field("step", "child");

        crate::infof!(parent, "parent");
        crate::infof!(child, "child");
        crate::infof!(logger, "root");

        let records = sink.records();
        assert!(records[0].get("step").is_none());
        assert_eq!(records[0]["channelId"], "web");
        assert_eq!(records[1]["step"], "child");
        assert_eq!(records[1]["channelId"], "web");
        assert!(records[2].get("channelId").is_none());
    }

    #[test]
    fn test_structured_fields() {
        let (logger, sink) = capture(Severity::Debug);
        let mut scope = logger.scoped();

        scope.attach_structured_field(
            "exception",
            ExceptionInfo {
                trace_id: "000000000000000000000000".into(),
                exception_code: "20002".into(),
                ..Default::default()
            },
        );
        scope.attach_serializable("data", &serde_json::json!({"msisdn": "628123456789"}));
        crate::infof!(scope, "enriched");

        let record = &sink.records()[0];
        assert_eq!(record["exception"]["traceId"], "000000000000000000000000");
        assert_eq!(record["exception"]["exceptionCode"], "20002");
        assert_eq!(record["data"]["msisdn"], "628123456789");
    }

    #[test]
    fn test_attach_end_info_stamps_and_merges() {
        let (logger, sink) = capture(Severity::Debug);
        let mut scope = logger.scoped();
        let mut info = EndInfo {
            api_id: "Test12345".into(),
            transaction_id: "Trx12345678".into(),
            ..Default::default()
        };
        scope.attach_end_info(&mut info);
        assert!(!info.timestamp.is_empty());

        crate::infof!(scope, "after");
        let record = &sink.records()[0];
        assert_eq!(record[keys::API_ID], "Test12345");
        assert_eq!(record[keys::LOG_TIMESTAMP], info.timestamp.as_str());
        assert_eq!(record[keys::MESSAGE], "after");
    }

    #[test]
    fn test_emit_end_info_uses_log_point() {
        let (logger, sink) = capture(Severity::Info);
        let info = EndInfo {
            log_point: "api-test-logpoint".into(),
            http_status_code: 200,
            ..Default::default()
        };
        logger.emit_end_info(Severity::Trace, &info);
        logger.emit_end_info(Severity::Info, &info);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0][keys::MESSAGE], "api-test-logpoint");
        assert_eq!(records[0][keys::HTTP_STATUS_CODE], 200);
    }

    #[test]
    fn test_emit_fault_without_details() {
        let (logger, sink) = capture(Severity::Info);
        let info = ExceptionInfo {
            api_id: "A1".into(),
            service_name: "Svc".into(),
            ..Default::default()
        };
        logger.emit_fault(&info, None, None);

        let record = &sink.records()[0];
        assert_eq!(record[keys::LOG_LEVEL], "error");
        assert_eq!(record[keys::MESSAGE], "A1-Svc-End");
        assert!(record.get(keys::FAULT_DETAILS).is_none());
        assert!(record.get(keys::REQUEST_PAYLOAD).is_none());
        assert!(!record[keys::EXCEPTION_INFO][keys::TIME_STAMP]
            .as_str()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_emit_fault_with_details() {
        let (logger, sink) = capture(Severity::Info);
        let details = FaultDetails {
            error: "Error Exception".into(),
            stack_trace: vec!["handler.test".into()],
            trace: None,
        };
        logger.emit_fault(&ExceptionInfo::default(), Some(&details), Some("{\"a\":1}"));

        let record = &sink.records()[0];
        assert_eq!(record[keys::FAULT_DETAILS]["error"], "Error Exception");
        assert_eq!(record[keys::FAULT_DETAILS]["stackTrace"][0], "handler.test");
        assert_eq!(record[keys::REQUEST_PAYLOAD], "{\"a\":1}");
    }

    #[test]
    fn test_metrics_ignore_level_but_not_disabled() {
        let (logger, sink) = capture(Severity::Panic);
        logger.process_metrics("ApiService", true, Duration::from_secs(3));
        let record = &sink.records()[0];
        assert!(record.get(keys::LOG_LEVEL).is_none());
        assert_eq!(record[keys::SUCCESS_RATE], 100);

        let (logger, sink) = capture(Severity::Disabled);
        logger.backend_metrics("BackendSample", "BackendService", true, Duration::from_secs(3));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_log_without_level() {
        let (logger, sink) = capture(Severity::Error);
        logger.log_without_level(&LogEvent::End(EndInfo {
            log_point: "lp".into(),
            ..Default::default()
        }));
        logger.log_without_level(&LogEvent::Fault {
            info: ExceptionInfo::default(),
            details: None,
            payload: Some("raw".into()),
        });

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.get(keys::LOG_LEVEL).is_none()));
        assert_eq!(records[0][keys::MESSAGE], "");
        assert_eq!(records[1][keys::REQUEST_PAYLOAD], "raw");
    }

    #[test]
    #[should_panic(expected = "boom 7")]
    fn test_panic_emits_then_panics() {
        let (logger, _sink) = capture(Severity::Info);
        logger.panic(format_args!("boom {}", 7));
    }

    #[test]
    fn test_from_settings_debug_mode_opens_trace() {
        let logger = Logger::from_settings(Severity::Error, true);
        assert_eq!(logger.threshold(), Severity::Trace);

        let logger = Logger::from_settings(Severity::Error, false);
        assert_eq!(logger.threshold(), Severity::Error);
        assert!(!logger.enabled(Severity::Warn));
    }
}
