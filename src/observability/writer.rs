//! Output sinks for log records.
//!
//! # Responsibilities
//! - Choose between machine (JSON lines) and console (human) output
//! - Serialize whole records under a lock so lines never interleave
//!
//! # Design Decisions
//! - The writer is picked once when the logger is built, never per call
//! - Console mode sends `error` and above to the error sink
//! - Write failures are dropped: the sink is the last place to report to

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Local;
use serde_json::{Map, Value};

use crate::observability::fields::keys;
use crate::observability::level::Severity;

/// Boxed byte sink.
pub type Sink = Box<dyn Write + Send>;

/// Destination for rendered log records.
pub enum LogWriter {
    /// One JSON object per line, all levels to the same sink.
    Plain(Mutex<Sink>),
    /// Human-readable lines split between an error and a standard sink.
    Console { err: Mutex<Sink>, out: Mutex<Sink> },
}

/// Pick the process writer: console formatting when `console_mode` is set,
/// plain JSON lines on stdout otherwise.
pub fn select_writer(console_mode: bool) -> LogWriter {
    if console_mode {
        LogWriter::console(io::stderr(), io::stdout())
    } else {
        LogWriter::plain(io::stdout())
    }
}

impl LogWriter {
    pub fn plain<W>(sink: W) -> Self
    where
        W: Write + Send + 'static,
    {
        LogWriter::Plain(Mutex::new(Box::new(sink)))
    }

    pub fn console<E, O>(err: E, out: O) -> Self
    where
        E: Write + Send + 'static,
        O: Write + Send + 'static,
    {
        LogWriter::Console {
            err: Mutex::new(Box::new(err)),
            out: Mutex::new(Box::new(out)),
        }
    }

    pub fn is_console(&self) -> bool {
        matches!(self, LogWriter::Console { .. })
    }

    /// Render and write one record. `level` is `None` for untagged records.
    pub fn write_record(&self, level: Option<Severity>, record: &Map<String, Value>) {
        match self {
            LogWriter::Plain(sink) => {
                let Ok(mut line) = serde_json::to_vec(record) else {
                    return;
                };
                line.push(b'\n');
                write_locked(sink, &line);
            }
            LogWriter::Console { err, out } => {
                let line = render_console(level, record);
                let sink = match level {
                    Some(severity) if severity >= Severity::Error => err,
                    _ => out,
                };
                write_locked(sink, line.as_bytes());
            }
        }
    }
}

fn write_locked(sink: &Mutex<Sink>, bytes: &[u8]) {
    let mut guard = sink.lock().unwrap_or_else(PoisonError::into_inner);
    let _ = guard.write_all(bytes);
    let _ = guard.flush();
}

fn level_tag(level: Option<Severity>) -> &'static str {
    match level {
        Some(Severity::Trace) => "TRC",
        Some(Severity::Debug) => "DBG",
        Some(Severity::Info) => "INF",
        Some(Severity::Warn) => "WRN",
        Some(Severity::Error) => "ERR",
        Some(Severity::Fatal) => "FTL",
        Some(Severity::Panic) => "PNC",
        Some(Severity::Disabled) | None => "???",
    }
}

/// `15:04:05.000 INF message key=value ...`
fn render_console(level: Option<Severity>, record: &Map<String, Value>) -> String {
    let mut line = format!(
        "{} {}",
        Local::now().format("%H:%M:%S%.3f"),
        level_tag(level)
    );

    if let Some(Value::String(message)) = record.get(keys::MESSAGE) {
        if !message.is_empty() {
            line.push(' ');
            line.push_str(message);
        }
    }

    for (key, value) in record {
        if key == keys::LOG_LEVEL || key == keys::MESSAGE {
            continue;
        }
        line.push(' ');
        line.push_str(key);
        line.push('=');
        match value {
            Value::String(s) if !s.is_empty() && !s.contains(char::is_whitespace) => {
                line.push_str(s)
            }
            other => line.push_str(&other.to_string()),
        }
    }

    line.push('\n');
    line
}

/// Shared in-memory sink, mainly for capturing output in tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    /// Parse every line as a JSON record; lines that are not JSON are skipped.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl Write for MemorySink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
