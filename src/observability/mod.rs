//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! startup.rs
//!     → level.rs (LOG_LEVEL → Severity)
//!     → writer.rs (plain JSON lines or console)
//!     → logging.rs (root Logger)
//!
//! Request handling:
//!     Logger::scoped() / attach_field()
//!     → logging.rs (gate, build record)
//!     → fields.rs (EndInfo / ExceptionInfo flattening)
//!     → metrics.rs (backend / process samples)
//!     → dump.rs (HTTP trace dumps)
//!     → writer.rs
//! ```
//!
//! # Design Decisions
//! - One JSON object per record, fixed key per field
//! - The crate's own diagnostics go through `tracing`; service records
//!   go through `Logger`

pub mod dump;
pub mod fields;
pub mod level;
pub mod logging;
pub mod metrics;
pub mod writer;

pub use fields::{EndInfo, ExceptionInfo, FaultDetails, FieldValue, LogEvent, Trace};
pub use level::{map_level, Severity};
pub use logging::Logger;
pub use metrics::MetricsEvent;
pub use writer::{select_writer, LogWriter, MemorySink};
