use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use snapshotter::{EventSink, RotationError, Severity};
use snapshotter_cloud::{CloudError, Snapshot, SnapshotGateway, Volume};

/// Timestamp given to snapshots created through the fake
pub const CREATED_NOW: &str = "2030-01-01T00:00:00Z";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetVolume(String),
    CreateSnapshot(String),
    ListSnapshots(String),
    DeleteSnapshot(String),
}

#[derive(Default)]
struct State {
    volumes: HashMap<String, Volume>,
    /// Snapshots per volume, in listing order
    snapshots: HashMap<String, Vec<Snapshot>>,
    calls: Vec<Call>,
    created_names: Vec<String>,
    next_id: usize,
    unlisted_created: HashSet<String>,
}

/// In-memory gateway with per-operation failure injection
#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<State>,
    fail_get: HashSet<String>,
    fail_create: HashSet<String>,
    fail_list: HashSet<String>,
    fail_delete: HashSet<String>,
    hide_created: bool,
}

#[allow(dead_code)]
impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_volume(self, id: &str, name: &str, existing: &[(&str, &str)]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.volumes.insert(id.to_string(), Volume::new(id, name));
            state.snapshots.insert(
                id.to_string(),
                existing
                    .iter()
                    .map(|(snap_id, created_at)| Snapshot::new(*snap_id, id, *snap_id, *created_at))
                    .collect(),
            );
        }
        self
    }

    pub fn failing_get(mut self, volume_id: &str) -> Self {
        self.fail_get.insert(volume_id.to_string());
        self
    }

    pub fn failing_create(mut self, volume_id: &str) -> Self {
        self.fail_create.insert(volume_id.to_string());
        self
    }

    pub fn failing_list(mut self, volume_id: &str) -> Self {
        self.fail_list.insert(volume_id.to_string());
        self
    }

    pub fn failing_delete(mut self, snapshot_id: &str) -> Self {
        self.fail_delete.insert(snapshot_id.to_string());
        self
    }

    /// Created snapshots do not show up in listings (eventual consistency)
    pub fn hiding_created(mut self) -> Self {
        self.hide_created = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn created_names(&self) -> Vec<String> {
        self.state.lock().unwrap().created_names.clone()
    }

    /// Ids of the snapshots still stored for a volume, in listing order
    pub fn remaining(&self, volume_id: &str) -> Vec<String> {
        self.state.lock().unwrap().snapshots[volume_id]
            .iter()
            .map(|s| s.id.clone())
            .collect()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::DeleteSnapshot(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn touched(&self, volume_id: &str) -> bool {
        self.calls().iter().any(|c| match c {
            Call::GetVolume(id) | Call::CreateSnapshot(id) | Call::ListSnapshots(id) => {
                id == volume_id
            }
            Call::DeleteSnapshot(_) => false,
        })
    }
}

fn api_failure(what: &str) -> CloudError {
    CloudError::ApiError {
        status: 500,
        message: format!("{} failed", what),
    }
}

#[async_trait]
impl SnapshotGateway for FakeGateway {
    fn name(&self) -> &str {
        "fake"
    }

    async fn get_volume(&self, volume_id: &str) -> snapshotter_cloud::Result<Volume> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::GetVolume(volume_id.to_string()));

        if self.fail_get.contains(volume_id) {
            return Err(api_failure("get volume"));
        }

        state
            .volumes
            .get(volume_id)
            .cloned()
            .ok_or_else(|| CloudError::ResourceNotFound(volume_id.to_string()))
    }

    async fn create_snapshot(
        &self,
        volume_id: &str,
        name: &str,
    ) -> snapshotter_cloud::Result<Snapshot> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateSnapshot(volume_id.to_string()));

        if self.fail_create.contains(volume_id) {
            return Err(api_failure("create snapshot"));
        }

        state.next_id += 1;
        let snapshot = Snapshot::new(
            format!("new-{}", state.next_id),
            volume_id,
            name,
            CREATED_NOW,
        );
        state.created_names.push(name.to_string());

        if self.hide_created {
            state.unlisted_created.insert(snapshot.id.clone());
        }
        state
            .snapshots
            .entry(volume_id.to_string())
            .or_default()
            .push(snapshot.clone());

        Ok(snapshot)
    }

    async fn list_snapshots(&self, volume_id: &str) -> snapshotter_cloud::Result<Vec<Snapshot>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListSnapshots(volume_id.to_string()));

        if self.fail_list.contains(volume_id) {
            return Err(api_failure("list snapshots"));
        }

        let hidden = state.unlisted_created.clone();
        Ok(state
            .snapshots
            .get(volume_id)
            .map(|snapshots| {
                snapshots
                    .iter()
                    .filter(|s| !hidden.contains(&s.id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> snapshotter_cloud::Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::DeleteSnapshot(snapshot_id.to_string()));

        if self.fail_delete.contains(snapshot_id) {
            return Err(api_failure("delete snapshot"));
        }

        let mut found = false;
        for snapshots in state.snapshots.values_mut() {
            let before = snapshots.len();
            snapshots.retain(|s| s.id != snapshot_id);
            found |= snapshots.len() != before;
        }

        if found {
            Ok(())
        } else {
            Err(CloudError::ResourceNotFound(snapshot_id.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Created { volume: String, snapshot: String },
    Deleted { volume: String, snapshot: String },
    Warning(String),
    Aborted { severity: Severity, message: String },
}

/// Sink that records every event for later assertions
#[derive(Default)]
pub struct CapturingSink {
    events: Mutex<Vec<Event>>,
}

#[allow(dead_code)]
impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Warning(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    pub fn aborts(&self) -> Vec<(Severity, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Aborted { severity, message } => Some((severity, message)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for CapturingSink {
    fn snapshot_created(&self, volume: &Volume, snapshot: &Snapshot) {
        self.events.lock().unwrap().push(Event::Created {
            volume: volume.name.clone(),
            snapshot: snapshot.id.clone(),
        });
    }

    fn snapshot_deleted(&self, volume: &Volume, snapshot: &Snapshot) {
        self.events.lock().unwrap().push(Event::Deleted {
            volume: volume.name.clone(),
            snapshot: snapshot.id.clone(),
        });
    }

    fn warning(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Warning(message.to_string()));
    }

    fn run_aborted(&self, error: &RotationError) {
        self.events.lock().unwrap().push(Event::Aborted {
            severity: error.severity(),
            message: error.to_string(),
        });
    }
}
