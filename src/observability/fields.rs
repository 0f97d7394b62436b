//! Structured field schemas.
//!
//! Downstream log parsers key on these names, so every emitter writes a given
//! field under exactly one key. The names live in [`keys`]; [`EndInfo`] is
//! flattened by [`EndInfo::to_fields`] and nothing else.
//!
//! # Schema
//! - `httpStatusCode` is a number, `processTime` a number of milliseconds
//! - Identity keys (`transactionId`, `internalTransactionId`, `serviceId`)
//!   and the timestamp are always written; everything else is omitted when
//!   empty or zero

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::observability::metrics::MetricsEvent;

/// Record timestamp layout, millisecond precision with numeric offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// Fixed output key names.
pub mod keys {
    pub const LOG_LEVEL: &str = "logLevel";
    pub const MESSAGE: &str = "message";

    pub const API_ID: &str = "apiId";
    pub const CHANNEL_ID: &str = "channelId";
    pub const HTTP_STATUS_CODE: &str = "httpStatusCode";
    pub const INTERNAL_TRANSACTION_ID: &str = "internalTransactionId";
    pub const LOG_MESSAGE: &str = "logMessage";
    pub const LOG_POINT: &str = "logPoint";
    pub const LOG_TIMESTAMP: &str = "logTimestamp";
    pub const NOTIFICATION_TYPE: &str = "notificationType";
    pub const PROCESS_TIME: &str = "processTime";
    pub const REQUEST_PAYLOAD: &str = "requestPayload";
    pub const RESPONSE_PAYLOAD: &str = "responsePayload";
    pub const SERVICE_ID: &str = "serviceId";
    pub const SERVICE_NAME: &str = "serviceName";
    pub const TIME_STAMP: &str = "timeStamp";
    pub const TRANSACTION_ID: &str = "transactionId";

    pub const EXCEPTION_INFO: &str = "ExceptionInfo";
    pub const FAULT_DETAILS: &str = "FaultDetails";

    pub const METRICS_TYPE: &str = "type";
    pub const BACKEND: &str = "backend";
    pub const MESSAGE_COUNT: &str = "messageCount";
    pub const ERROR_COUNT: &str = "errorCount";
    pub const SUCCESS_RATE: &str = "successRate";
    pub const RESPONSE_TIME_IN_MS: &str = "responseTimeInMs";
}

/// Format a timestamp with [`TIMESTAMP_FORMAT`].
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn now_timestamp() -> String {
    format_timestamp(&Local::now().fixed_offset())
}

/// A completed request or operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndInfo {
    /// When the operation ended; `None` means "when it gets logged".
    pub log_timestamp: Option<DateTime<FixedOffset>>,
    pub internal_transaction_id: String,
    pub transaction_id: String,
    pub service_id: String,
    pub channel_id: String,
    pub api_id: String,
    pub log_point: String,
    pub log_message: String,
    pub notification_type: String,
    pub request_payload: String,
    pub response_payload: String,
    pub http_status_code: u16,
    /// Milliseconds.
    pub process_time: u64,
    /// Formatted `log_timestamp`, filled in by [`EndInfo::stamp`].
    pub timestamp: String,
}

impl EndInfo {
    /// Render `log_timestamp` (or the current time) into `timestamp`.
    pub fn stamp(&mut self) {
        let ts = self
            .log_timestamp
            .unwrap_or_else(|| Local::now().fixed_offset());
        self.timestamp = format_timestamp(&ts);
    }

    /// Flatten into the fixed field set.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();

        put_str(&mut fields, keys::API_ID, &self.api_id);
        put_str(&mut fields, keys::CHANNEL_ID, &self.channel_id);
        if self.http_status_code != 0 {
            fields.insert(keys::HTTP_STATUS_CODE.into(), self.http_status_code.into());
        }
        put_str(&mut fields, keys::LOG_MESSAGE, &self.log_message);
        put_str(&mut fields, keys::LOG_POINT, &self.log_point);
        fields.insert(keys::LOG_TIMESTAMP.into(), self.timestamp.clone().into());
        put_str(&mut fields, keys::NOTIFICATION_TYPE, &self.notification_type);
        put_str(&mut fields, keys::REQUEST_PAYLOAD, &self.request_payload);
        put_str(&mut fields, keys::RESPONSE_PAYLOAD, &self.response_payload);
        fields.insert(keys::SERVICE_ID.into(), self.service_id.clone().into());
        fields.insert(
            keys::TRANSACTION_ID.into(),
            self.transaction_id.clone().into(),
        );
        fields.insert(
            keys::INTERNAL_TRANSACTION_ID.into(),
            self.internal_transaction_id.clone().into(),
        );
        if self.process_time != 0 {
            fields.insert(keys::PROCESS_TIME.into(), self.process_time.into());
        }

        fields
    }
}

fn put_str(fields: &mut Map<String, Value>, key: &str, value: &str) {
    if !value.is_empty() {
        fields.insert(key.to_owned(), Value::String(value.to_owned()));
    }
}

fn is_zero_u16(v: &u16) -> bool {
    *v == 0
}

fn is_zero_u64(v: &u64) -> bool {
    *v == 0
}

/// A single fault.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub channel_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub trace_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub exception_category: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub exception_code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub exception_message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub exception_severity: String,
    #[serde(default, skip_serializing_if = "is_zero_u16")]
    pub http_status_code: u16,
    #[serde(default)]
    pub internal_transaction_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notification_type: String,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub process_time: u64,
    #[serde(default)]
    pub service_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_name: String,
    #[serde(default)]
    pub time_stamp: String,
    #[serde(default)]
    pub transaction_id: String,
}

impl ExceptionInfo {
    /// Message body for a fault record: `<apiId>-<serviceName>-End`.
    pub fn end_message(&self) -> String {
        format!("{}-{}-End", self.api_id, self.service_name)
    }
}

/// Underlying cause of a fault.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultDetails {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stack_trace: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Trace>,
}

impl FaultDetails {
    /// Details from any error, walking its `source()` chain into the stack.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut stack_trace = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            stack_trace.push(cause.to_string());
            source = cause.source();
        }
        Self {
            error: err.to_string(),
            stack_trace,
            trace: None,
        }
    }
}

/// Call-site context attached to [`FaultDetails`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub db_table_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_payload: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub response_payload: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub soap_operation: String,
}

/// Value for
/// [`Logger::attach_structured_field`](crate::observability::Logger::attach_structured_field).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Exception(ExceptionInfo),
    FaultDetails(FaultDetails),
    /// Anything else, already in JSON form.
    Opaque(Value),
}

impl FieldValue {
    pub fn into_json(self) -> serde_json::Result<Value> {
        match self {
            FieldValue::Exception(info) => serde_json::to_value(info),
            FieldValue::FaultDetails(details) => serde_json::to_value(details),
            FieldValue::Opaque(value) => Ok(value),
        }
    }
}

impl From<ExceptionInfo> for FieldValue {
    fn from(info: ExceptionInfo) -> Self {
        FieldValue::Exception(info)
    }
}

impl From<FaultDetails> for FieldValue {
    fn from(details: FaultDetails) -> Self {
        FieldValue::FaultDetails(details)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Opaque(value)
    }
}

/// Any structured event the facade knows how to write.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    End(EndInfo),
    Fault {
        info: ExceptionInfo,
        details: Option<FaultDetails>,
        payload: Option<String>,
    },
    Metrics(MetricsEvent),
}
