//! Telemetry and structured logging components for framegrab.
//!
//! Handles URL redaction, console/NDJSON output, file rotation, and
//! extraction event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, ExtractEvent};
pub use logger::init_logger;
pub use redact::{redact_sensitive_data, redact_url};
