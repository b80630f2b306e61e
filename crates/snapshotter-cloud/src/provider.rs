//! Snapshot gateway trait definition

use crate::error::Result;
use crate::model::{Snapshot, Volume};
use async_trait::async_trait;

/// Volume snapshot gateway
///
/// The narrow set of provider operations the rotation engine needs. Every
/// call either succeeds or hands its error back unchanged; implementations
/// must not retry.
#[async_trait]
pub trait SnapshotGateway: Send + Sync {
    /// Returns the provider name (e.g., "digitalocean")
    fn name(&self) -> &str;

    /// Resolve a volume identifier to its metadata
    async fn get_volume(&self, volume_id: &str) -> Result<Volume>;

    /// Create a snapshot of `volume_id` with the given display name
    async fn create_snapshot(&self, volume_id: &str, name: &str) -> Result<Snapshot>;

    /// List every snapshot currently associated with `volume_id`
    ///
    /// The order of the returned snapshots is unspecified.
    async fn list_snapshots(&self, volume_id: &str) -> Result<Vec<Snapshot>>;

    /// Permanently delete a snapshot
    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()>;
}

#[async_trait]
impl<G: SnapshotGateway + ?Sized> SnapshotGateway for &G {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn get_volume(&self, volume_id: &str) -> Result<Volume> {
        (**self).get_volume(volume_id).await
    }

    async fn create_snapshot(&self, volume_id: &str, name: &str) -> Result<Snapshot> {
        (**self).create_snapshot(volume_id, name).await
    }

    async fn list_snapshots(&self, volume_id: &str) -> Result<Vec<Snapshot>> {
        (**self).list_snapshots(volume_id).await
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()> {
        (**self).delete_snapshot(snapshot_id).await
    }
}
