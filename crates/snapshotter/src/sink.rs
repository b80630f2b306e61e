//! Operator-facing event reporting
//!
//! The rotation engine never logs directly. It reports what it did to an
//! [`EventSink`], which the binary backs with `tracing` and tests replace with
//! a capturing implementation.

use crate::error::{RotationError, Severity};
use snapshotter_cloud::{Snapshot, Volume};

pub trait EventSink: Send + Sync {
    /// A snapshot was created from `volume`
    fn snapshot_created(&self, volume: &Volume, snapshot: &Snapshot);

    /// A snapshot of `volume` was deleted by retention
    fn snapshot_deleted(&self, volume: &Volume, snapshot: &Snapshot);

    /// Something unexpected that does not stop the run
    fn warning(&self, message: &str);

    /// The run is terminating because of `error`
    fn run_aborted(&self, error: &RotationError);
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn snapshot_created(&self, volume: &Volume, snapshot: &Snapshot) {
        (**self).snapshot_created(volume, snapshot)
    }

    fn snapshot_deleted(&self, volume: &Volume, snapshot: &Snapshot) {
        (**self).snapshot_deleted(volume, snapshot)
    }

    fn warning(&self, message: &str) {
        (**self).warning(message)
    }

    fn run_aborted(&self, error: &RotationError) {
        (**self).run_aborted(error)
    }
}

/// Sink that emits `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn snapshot_created(&self, volume: &Volume, snapshot: &Snapshot) {
        tracing::info!(
            volume_id = %volume.id,
            "Created Snapshot with Id {} from volume {}",
            snapshot.id,
            volume.name
        );
    }

    fn snapshot_deleted(&self, volume: &Volume, snapshot: &Snapshot) {
        tracing::info!(
            volume_id = %volume.id,
            created_at = %snapshot.created_at,
            "Deleted Snapshot with Id {}",
            snapshot.id
        );
    }

    fn warning(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn run_aborted(&self, error: &RotationError) {
        match error.severity() {
            Severity::Fatal => tracing::error!(fatal = true, "{}", error),
            Severity::Halt => tracing::error!(fatal = false, "{}", error),
        }
    }
}
