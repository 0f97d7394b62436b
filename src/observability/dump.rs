//! HTTP request/response trace dumps.
//!
//! # Responsibilities
//! - Dump hyper messages in wire format (request line, headers, body)
//! - Dump reqwest messages as a one-element JSON array
//!
//! # Design Decisions
//! - Everything here is gated at `trace`; a closed gate costs one compare
//! - A dump that cannot be built is reported at `error` and dropped, the
//!   caller's message is never touched

use std::fmt::Write as _;

use hyper::body::Bytes;
use hyper::header::{HeaderMap, HOST};
use hyper::{Request, Response, StatusCode};
use serde_json::json;

use crate::observability::level::Severity;
use crate::observability::logging::Logger;

/// Why a dump could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("header {0} is not valid text")]
    InvalidHeader(String),
    #[error("body is a stream")]
    StreamingBody,
    #[error(transparent)]
    Format(#[from] std::fmt::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Logger {
    pub fn trace_http_request<B: AsRef<[u8]>>(&self, req: &Request<B>) {
        if !self.enabled(Severity::Trace) {
            return;
        }
        match dump_wire_request(req) {
            Ok(dump) => self.trace(format_args!("{}", dump)),
            Err(e) => self.error(format_args!("error on dump request {}", e)),
        }
    }

    pub fn trace_http_response<B: AsRef<[u8]>>(&self, resp: &Response<B>) {
        if !self.enabled(Severity::Trace) {
            return;
        }
        match dump_wire_response(resp) {
            Ok(dump) => self.trace(format_args!("{}", dump)),
            Err(e) => self.error(format_args!("error on dump response {}", e)),
        }
    }

    pub fn trace_reqwest_request(&self, req: &reqwest::Request) {
        if !self.enabled(Severity::Trace) {
            return;
        }
        match dump_json_request(req) {
            Ok(dump) => self.trace(format_args!("{}", dump)),
            Err(e) => self.error(format_args!("error on dump request {}", e)),
        }
    }

    /// Dump a reqwest response.
    ///
    /// With the gate open the body has to be buffered; the returned response
    /// carries the same status, version, headers and body. Its `url()` is
    /// not preserved.
    pub async fn trace_reqwest_response(
        &self,
        resp: reqwest::Response,
    ) -> reqwest::Result<reqwest::Response> {
        if !self.enabled(Severity::Trace) {
            return Ok(resp);
        }

        let status = resp.status();
        let version = resp.version();
        let headers = resp.headers().clone();
        let body = match resp.bytes().await {
            Ok(body) => body,
            Err(e) => {
                self.error(format_args!("error on dump response {}", e));
                return Err(e);
            }
        };

        match dump_json_response(status, &headers, &body) {
            Ok(dump) => self.trace(format_args!("{}", dump)),
            Err(e) => self.error(format_args!("error on dump response {}", e)),
        }

        let mut rebuilt = Response::new(body);
        *rebuilt.status_mut() = status;
        *rebuilt.version_mut() = version;
        *rebuilt.headers_mut() = headers;
        Ok(reqwest::Response::from(rebuilt))
    }
}

fn write_wire_headers(out: &mut String, headers: &HeaderMap) -> Result<(), DumpError> {
    for (name, value) in headers {
        let value = value
            .to_str()
            .map_err(|_| DumpError::InvalidHeader(name.to_string()))?;
        write!(out, "{}: {}\r\n", name, value)?;
    }
    Ok(())
}

fn dump_wire_request<B: AsRef<[u8]>>(req: &Request<B>) -> Result<String, DumpError> {
    let mut out = String::new();
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    write!(out, "{} {} {:?}\r\n", req.method(), target, req.version())?;

    if !req.headers().contains_key(HOST) {
        if let Some(authority) = req.uri().authority() {
            write!(out, "Host: {}\r\n", authority)?;
        }
    }
    write_wire_headers(&mut out, req.headers())?;
    out.push_str("\r\n");
    out.push_str(&String::from_utf8_lossy(req.body().as_ref()));
    Ok(out)
}

fn dump_wire_response<B: AsRef<[u8]>>(resp: &Response<B>) -> Result<String, DumpError> {
    let mut out = String::new();
    write!(out, "{:?} {}\r\n", resp.version(), resp.status())?;
    write_wire_headers(&mut out, resp.headers())?;
    out.push_str("\r\n");
    out.push_str(&String::from_utf8_lossy(resp.body().as_ref()));
    Ok(out)
}

/// `name: value\n` per header.
fn flatten_headers(headers: &HeaderMap) -> Result<String, DumpError> {
    let mut out = String::new();
    for (name, value) in headers {
        let value = value
            .to_str()
            .map_err(|_| DumpError::InvalidHeader(name.to_string()))?;
        writeln!(out, "{}: {}", name, value)?;
    }
    Ok(out)
}

fn dump_json_request(req: &reqwest::Request) -> Result<String, DumpError> {
    let body = match req.body() {
        Some(body) => body.as_bytes().ok_or(DumpError::StreamingBody)?,
        None => &[],
    };
    let dump = json!([{
        "Method": req.method().as_str(),
        "URI": req.url().as_str(),
        "Headers": flatten_headers(req.headers())?,
        "Body": String::from_utf8_lossy(body),
    }]);
    Ok(serde_json::to_string(&dump)?)
}

fn dump_json_response(
    status: StatusCode,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<String, DumpError> {
    let dump = json!([{
        "StatusCode": status.as_u16().to_string(),
        "Headers": flatten_headers(headers)?,
        "Body": String::from_utf8_lossy(body),
    }]);
    Ok(serde_json::to_string(&dump)?)
}
