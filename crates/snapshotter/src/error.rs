//! Rotation error types

use snapshotter_cloud::CloudError;
use thiserror::Error;

/// How far a rotation failure reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Abort the whole run immediately
    Fatal,
    /// Stop the run, but report below the fatal level
    Halt,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Fatal => write!(f, "fatal"),
            Severity::Halt => write!(f, "halt"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RotationError {
    #[error("Failed to resolve volume {volume_id}: {source}")]
    ResolveVolume {
        volume_id: String,
        source: CloudError,
    },

    #[error("Failed to create snapshot of volume {volume_id}: {source}")]
    CreateSnapshot {
        volume_id: String,
        source: CloudError,
    },

    #[error("Failed to list snapshots of volume {volume_id}: {source}")]
    ListSnapshots {
        volume_id: String,
        source: CloudError,
    },

    #[error(
        "Snapshot {snapshot_id} of volume {volume_id} has a malformed creation time {value:?}: {source}"
    )]
    InvalidTimestamp {
        volume_id: String,
        snapshot_id: String,
        value: String,
        source: chrono::ParseError,
    },

    #[error("Failed to delete snapshot {snapshot_id} of volume {volume_id}: {source}")]
    DeleteSnapshot {
        volume_id: String,
        snapshot_id: String,
        /// Snapshots of the same volume already deleted, oldest first
        deleted_before_failure: Vec<String>,
        source: CloudError,
    },
}

impl RotationError {
    pub fn severity(&self) -> Severity {
        match self {
            RotationError::DeleteSnapshot { .. } => Severity::Halt,
            _ => Severity::Fatal,
        }
    }

    /// The configured volume being processed when the error occurred
    pub fn volume_id(&self) -> &str {
        match self {
            RotationError::ResolveVolume { volume_id, .. }
            | RotationError::CreateSnapshot { volume_id, .. }
            | RotationError::ListSnapshots { volume_id, .. }
            | RotationError::InvalidTimestamp { volume_id, .. }
            | RotationError::DeleteSnapshot { volume_id, .. } => volume_id,
        }
    }
}

pub type Result<T> = std::result::Result<T, RotationError>;
