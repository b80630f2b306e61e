//! Snapshot rotation
//!
//! For every configured volume, strictly in order:
//!
//! ```text
//! START → VOLUME_RESOLVED → SNAPSHOT_CREATED → LISTED → { DONE | PRUNING → DONE }
//! ```
//!
//! Any step may end the run instead. Nothing is retried, and nothing is
//! remembered between runs: what to prune is derived from the provider's
//! listing every time.

use crate::error::{Result, RotationError};
use crate::sink::EventSink;
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use snapshotter_cloud::{Snapshot, SnapshotGateway, Volume};
use snapshotter_config::RetentionConfig;
use std::collections::HashSet;

/// Layout of the provider's `created_at` values
///
/// `%.f` also accepts an optional fractional second.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Layout of the names given to new snapshots (local time, no offset)
pub const SNAPSHOT_NAME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Name for a snapshot taken at `now`
pub fn snapshot_name(now: DateTime<Local>) -> String {
    now.format(SNAPSHOT_NAME_FORMAT).to_string()
}

/// Parse a provider creation timestamp
pub fn parse_created_at(value: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, CREATED_AT_FORMAT).map(|t| t.and_utc())
}

/// Sort snapshots oldest first
///
/// Every timestamp is parsed before anything is reordered, so one malformed
/// value fails the whole set. Snapshots created at the same instant keep their
/// listing order.
pub fn order_by_creation(volume_id: &str, snapshots: Vec<Snapshot>) -> Result<Vec<Snapshot>> {
    let mut keyed = snapshots
        .into_iter()
        .map(|snapshot| match parse_created_at(&snapshot.created_at) {
            Ok(created_at) => Ok((created_at, snapshot)),
            Err(source) => Err(RotationError::InvalidTimestamp {
                volume_id: volume_id.to_string(),
                snapshot_id: snapshot.id.clone(),
                value: snapshot.created_at.clone(),
                source,
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    keyed.sort_by_key(|(created_at, _)| *created_at);

    Ok(keyed.into_iter().map(|(_, snapshot)| snapshot).collect())
}

/// Select the snapshots to delete so that at most `keep` remain
///
/// Returned oldest first. Timestamps are only inspected when something has
/// to go.
pub fn plan_deletions(
    volume_id: &str,
    snapshots: Vec<Snapshot>,
    keep: usize,
) -> Result<Vec<Snapshot>> {
    if snapshots.len() <= keep {
        return Ok(Vec::new());
    }

    let excess = snapshots.len() - keep;
    let mut ordered = order_by_creation(volume_id, snapshots)?;
    ordered.truncate(excess);

    Ok(ordered)
}

/// Drop repeated snapshot ids, keeping the first occurrence
///
/// Returns the unique snapshots and the ids that were repeated.
pub fn dedupe_by_id(snapshots: Vec<Snapshot>) -> (Vec<Snapshot>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    let unique = snapshots
        .into_iter()
        .filter(|snapshot| {
            if seen.insert(snapshot.id.clone()) {
                true
            } else {
                duplicates.push(snapshot.id.clone());
                false
            }
        })
        .collect();

    (unique, duplicates)
}

/// Outcome of one volume's rotation cycle
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeRotation {
    pub volume_id: String,
    pub volume_name: String,

    /// Snapshot created by this cycle
    pub created: Snapshot,

    /// Deleted snapshot ids, in deletion order
    pub deleted: Vec<String>,
}

/// Outcome of a full run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub volumes: Vec<VolumeRotation>,
}

impl RunReport {
    pub fn created_count(&self) -> usize {
        self.volumes.len()
    }

    pub fn deleted_count(&self) -> usize {
        self.volumes.iter().map(|v| v.deleted.len()).sum()
    }
}

/// Drives the create-then-prune cycle over the configured volumes
pub struct Rotator<G, S> {
    gateway: G,
    sink: S,
    retention: RetentionConfig,
}

impl<G: SnapshotGateway, S: EventSink> Rotator<G, S> {
    pub fn new(gateway: G, sink: S, retention: RetentionConfig) -> Self {
        Self {
            gateway,
            sink,
            retention,
        }
    }

    /// Rotate every configured volume in order
    ///
    /// Stops at the first error. The error is reported to the sink before it
    /// is returned; rotations completed for earlier volumes stand.
    pub async fn run(&self) -> Result<RunReport> {
        let mut report = RunReport::default();

        for volume_id in &self.retention.volume_ids {
            match self.rotate_volume(volume_id).await {
                Ok(rotation) => report.volumes.push(rotation),
                Err(err) => {
                    self.sink.run_aborted(&err);
                    return Err(err);
                }
            }
        }

        Ok(report)
    }

    /// Run one rotation cycle for a single volume
    pub async fn rotate_volume(&self, volume_id: &str) -> Result<VolumeRotation> {
        let volume = self.gateway.get_volume(volume_id).await.map_err(|source| {
            RotationError::ResolveVolume {
                volume_id: volume_id.to_string(),
                source,
            }
        })?;

        let name = snapshot_name(Local::now());
        let created = self
            .gateway
            .create_snapshot(&volume.id, &name)
            .await
            .map_err(|source| RotationError::CreateSnapshot {
                volume_id: volume_id.to_string(),
                source,
            })?;
        self.sink.snapshot_created(&volume, &created);

        let listed = self
            .gateway
            .list_snapshots(&volume.id)
            .await
            .map_err(|source| RotationError::ListSnapshots {
                volume_id: volume_id.to_string(),
                source,
            })?;
        let snapshots = self.check_listing(&volume, &created, listed);

        let doomed = plan_deletions(volume_id, snapshots, self.retention.snapshot_count)?;
        let deleted = self.prune(volume_id, &volume, doomed).await?;

        Ok(VolumeRotation {
            volume_id: volume.id,
            volume_name: volume.name,
            created,
            deleted,
        })
    }

    fn check_listing(
        &self,
        volume: &Volume,
        created: &Snapshot,
        listed: Vec<Snapshot>,
    ) -> Vec<Snapshot> {
        let (snapshots, duplicates) = dedupe_by_id(listed);

        for id in duplicates {
            self.sink.warning(&format!(
                "Snapshot {} is listed more than once for volume {}; considering it once",
                id, volume.id
            ));
        }

        if !snapshots.iter().any(|s| s.id == created.id) {
            self.sink.warning(&format!(
                "Snapshot {} is not yet listed for volume {}; rotating the listed {} snapshots",
                created.id,
                volume.id,
                snapshots.len()
            ));
        }

        snapshots
    }

    /// Delete one at a time, oldest first, stopping at the first failure
    async fn prune(
        &self,
        volume_id: &str,
        volume: &Volume,
        doomed: Vec<Snapshot>,
    ) -> Result<Vec<String>> {
        let mut deleted = Vec::with_capacity(doomed.len());

        for snapshot in doomed {
            if let Err(source) = self.gateway.delete_snapshot(&snapshot.id).await {
                return Err(RotationError::DeleteSnapshot {
                    volume_id: volume_id.to_string(),
                    snapshot_id: snapshot.id,
                    deleted_before_failure: deleted,
                    source,
                });
            }

            self.sink.snapshot_deleted(volume, &snapshot);
            deleted.push(snapshot.id);
        }

        Ok(deleted)
    }
}
