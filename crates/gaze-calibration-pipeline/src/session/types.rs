//! Session metadata and operation log types.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Metadata about a calibration session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Schema version of the serialized session.
    pub schema_version: u32,

    /// Unix timestamp when session was created (seconds since epoch).
    pub created_at: u64,

    /// Unix timestamp when session was last modified (seconds since epoch).
    pub last_modified: u64,

    /// Optional user-provided description (participant, block, ...).
    pub description: Option<String>,
}

impl SessionMetadata {
    pub fn new(schema_version: u32) -> Self {
        let now = current_timestamp();
        Self {
            schema_version,
            created_at: now,
            last_modified: now,
            description: None,
        }
    }

    pub fn with_description(schema_version: u32, description: impl Into<String>) -> Self {
        let mut meta = Self::new(schema_version);
        meta.description = Some(description.into());
        meta
    }

    /// Update the last_modified timestamp to now.
    pub fn touch(&mut self) {
        self.last_modified = current_timestamp();
    }
}

/// Lightweight operation log entry.
///
/// Intended as an audit trail of what happened during a session, not for
/// replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unix timestamp of the operation (seconds since epoch).
    pub timestamp: u64,

    /// Operation name (e.g., "calibrate", "validate", "accept").
    pub operation: String,

    pub success: bool,

    /// Optional notes or error message.
    pub notes: Option<String>,
}

impl LogEntry {
    pub fn success(operation: impl Into<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            operation: operation.into(),
            success: true,
            notes: None,
        }
    }

    pub fn success_with_notes(operation: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            operation: operation.into(),
            success: true,
            notes: Some(notes.into()),
        }
    }

    pub fn failure(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            operation: operation.into(),
            success: false,
            notes: Some(error.into()),
        }
    }
}

/// Get the current Unix timestamp in seconds (0 if the clock predates the epoch).
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
