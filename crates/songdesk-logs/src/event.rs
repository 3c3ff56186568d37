//! Events emitted by the order log

use serde::Serialize;

/// Outcome of an append, broadcast to any subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEvent {
    /// A row was written
    Appended {
        file: String,
        date: String,
        data_rows: usize,
    },

    /// The row was dropped
    AppendFailed {
        file: String,
        date: String,
        error: String,
    },
}

impl LogEvent {
    pub fn is_failure(&self) -> bool {
        matches!(self, LogEvent::AppendFailed { .. })
    }
}
