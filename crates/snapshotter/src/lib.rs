//! Snapshotter
//!
//! Creates a fresh snapshot of each configured block storage volume, then
//! deletes the oldest snapshots beyond the retention count.
//!
//! ```ignore
//! use snapshotter::{Rotator, TracingSink};
//! use snapshotter_cloud_digitalocean::DigitalOceanProvider;
//! use snapshotter_config::SnapshotterConfig;
//!
//! let config = SnapshotterConfig::from_env()?;
//! let provider = DigitalOceanProvider::new(&config.provider)?;
//!
//! let report = Rotator::new(provider, TracingSink, config.retention).run().await?;
//! println!("deleted {} snapshots", report.deleted_count());
//! ```

pub mod error;
pub mod rotation;
pub mod sink;

pub use error::{Result, RotationError, Severity};
pub use rotation::{RunReport, Rotator, VolumeRotation};
pub use sink::{EventSink, TracingSink};
