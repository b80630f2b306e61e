//! Domain objects returned by the gateway

use serde::{Deserialize, Serialize};

/// A provider-managed block-storage volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Provider-assigned identifier
    pub id: String,

    /// Display name (informational only)
    pub name: String,

    /// Region slug, when the provider reports one
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub size_gigabytes: Option<u64>,
}

impl Volume {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            region: None,
            size_gigabytes: None,
        }
    }
}

/// A point-in-time copy of a volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Provider-assigned identifier
    pub id: String,

    /// Identifier of the volume this snapshot was taken from
    pub volume_id: String,

    /// Display name
    pub name: String,

    /// Creation time exactly as the provider encoded it
    ///
    /// Kept raw so the rotation engine can reject malformed values instead of
    /// the transport layer silently defaulting them.
    pub created_at: String,

    #[serde(default)]
    pub size_gigabytes: Option<f64>,
}

impl Snapshot {
    pub fn new(
        id: impl Into<String>,
        volume_id: impl Into<String>,
        name: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            volume_id: volume_id.into(),
            name: name.into(),
            created_at: created_at.into(),
            size_gigabytes: None,
        }
    }
}
