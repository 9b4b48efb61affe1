//! Session bookkeeping: metadata, operation log and saved assets.

use cone_rays_core::ConeRayAngles;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Metadata about an estimation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Session kind identifier (see [`SESSION_KIND`](super::SESSION_KIND)).
    pub kind: String,

    pub schema_version: u32,

    /// Seconds since the Unix epoch.
    pub created_at: u64,
    pub last_modified: u64,

    /// Interactor the last collection was recorded for.
    #[serde(default)]
    pub interactor: Option<String>,

    /// Free text, e.g. participant and hand.
    pub description: Option<String>,
}

impl SessionMetadata {
    /// Create metadata stamped with the current time.
    pub fn new(kind: impl Into<String>, schema_version: u32) -> Self {
        let now = current_timestamp();
        Self {
            kind: kind.into(),
            schema_version,
            created_at: now,
            last_modified: now,
            interactor: None,
            description: None,
        }
    }

    /// Update the last_modified timestamp to now.
    pub fn touch(&mut self) {
        self.last_modified = current_timestamp();
    }
}

/// One line of the session's operation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: u64,

    /// e.g. "start_data_collection", "estimate".
    pub operation: String,

    pub success: bool,

    /// Summary on success, error chain on failure.
    pub notes: Option<String>,
}

impl LogEntry {
    fn new(operation: impl Into<String>, success: bool, notes: Option<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            operation: operation.into(),
            success,
            notes,
        }
    }

    /// Create a success log entry.
    pub fn success(operation: impl Into<String>) -> Self {
        Self::new(operation, true, None)
    }

    /// Create a success log entry with a summary.
    pub fn success_with_notes(operation: impl Into<String>, notes: impl Into<String>) -> Self {
        Self::new(operation, true, Some(notes.into()))
    }

    /// Create a failure log entry carrying the error text.
    pub fn failure(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(operation, false, Some(error.into()))
    }
}

/// A generated asset handed to the host for persisting.
///
/// The session only records what was saved; where the asset ends up is up
/// to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAsset {
    pub saved_at: u64,

    pub asset: ConeRayAngles,

    /// Save location or other notes supplied by the host.
    pub notes: Option<String>,
}

impl SavedAsset {
    /// Record an asset saved now.
    pub fn new(asset: ConeRayAngles, notes: Option<String>) -> Self {
        Self {
            saved_at: current_timestamp(),
            asset,
            notes,
        }
    }
}

/// Current Unix timestamp in seconds; 0 if the clock is before the epoch.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
