//! DigitalOcean gateway implementation

use crate::client::{ApiSnapshot, ApiVolume, DigitalOceanClient};
use crate::error::Result;
use async_trait::async_trait;
use snapshotter_cloud::{Snapshot, SnapshotGateway, Volume};
use snapshotter_config::ProviderConfig;

/// DigitalOcean block storage gateway
pub struct DigitalOceanProvider {
    client: DigitalOceanClient,
}

impl DigitalOceanProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: DigitalOceanClient::new(config)?,
        })
    }
}

#[async_trait]
impl SnapshotGateway for DigitalOceanProvider {
    fn name(&self) -> &str {
        "digitalocean"
    }

    async fn get_volume(&self, volume_id: &str) -> snapshotter_cloud::Result<Volume> {
        let volume = self.client.get_volume(volume_id).await?;
        Ok(into_volume(volume))
    }

    async fn create_snapshot(
        &self,
        volume_id: &str,
        name: &str,
    ) -> snapshotter_cloud::Result<Snapshot> {
        let snapshot = self.client.create_snapshot(volume_id, name).await?;
        Ok(into_snapshot(snapshot, volume_id))
    }

    async fn list_snapshots(&self, volume_id: &str) -> snapshotter_cloud::Result<Vec<Snapshot>> {
        let snapshots = self.client.list_snapshots(volume_id).await?;
        Ok(snapshots
            .into_iter()
            .map(|s| into_snapshot(s, volume_id))
            .collect())
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> snapshotter_cloud::Result<()> {
        self.client.delete_snapshot(snapshot_id).await?;
        Ok(())
    }
}

fn into_volume(volume: ApiVolume) -> Volume {
    Volume {
        id: volume.id,
        name: volume.name,
        region: volume.region.map(|r| r.slug),
        size_gigabytes: volume.size_gigabytes,
    }
}

/// Convert a wire snapshot, falling back to the requested volume when the
/// API omits `resource_id`
fn into_snapshot(snapshot: ApiSnapshot, volume_id: &str) -> Snapshot {
    Snapshot {
        id: snapshot.id,
        volume_id: snapshot
            .resource_id
            .unwrap_or_else(|| volume_id.to_string()),
        name: snapshot.name,
        created_at: snapshot.created_at,
        size_gigabytes: snapshot.size_gigabytes,
    }
}
