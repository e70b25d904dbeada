//! Extraction Event Logger
//!
//! Pipeline milestones emitted as structured records under the
//! `extract_events` target, so a JSON file layer yields NDJSON.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtractEvent {
    Probed {
        total_size: u64,
    },
    WindowFetched {
        attempt: u32,
        window_len: u64,
        bytes_written: u64,
    },
    DecodeFailed {
        attempt: u32,
        window_len: u64,
        reason: String,
    },
    WindowGrown {
        from: u64,
        to: u64,
    },
    Completed {
        attempts: u32,
        payload_len: usize,
    },
    Failed {
        kind: String,
        message: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub event: ExtractEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Log one extraction event. Free-text fields are redacted first.
    pub fn log_event(url: &str, mut event: ExtractEvent) {
        match &mut event {
            ExtractEvent::DecodeFailed { reason, .. } => {
                *reason = redact_sensitive_data(reason);
            }
            ExtractEvent::Failed { message, .. } => {
                *message = redact_sensitive_data(message);
            }
            _ => {}
        }

        let entry = EventLogEntry {
            url: redact_sensitive_data(url),
            timestamp: Utc::now(),
            event,
        };

        info!(target: "extract_events", event = ?entry, "Extraction event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let value = serde_json::to_value(ExtractEvent::WindowGrown { from: 1, to: 2 }).unwrap();
        assert_eq!(value["type"], "window_grown");
        assert_eq!(value["to"], 2);
    }
}
