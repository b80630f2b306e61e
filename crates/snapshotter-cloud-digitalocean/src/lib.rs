//! DigitalOcean provider for snapshotter
//!
//! This crate implements the `SnapshotGateway` trait for DigitalOcean block
//! storage volumes using the public v2 REST API.
//!
//! # Requirements
//!
//! - A personal access token with read/write scope (`DO_TOKEN`)
//!
//! # Example
//!
//! ```ignore
//! use snapshotter_cloud::SnapshotGateway;
//! use snapshotter_cloud_digitalocean::DigitalOceanProvider;
//! use snapshotter_config::SnapshotterConfig;
//!
//! let config = SnapshotterConfig::from_env()?;
//! let provider = DigitalOceanProvider::new(&config.provider)?;
//!
//! let volume = provider.get_volume("82a48a18-873f-11e9-a4b7-0a58ac14d123").await?;
//! let snapshots = provider.list_snapshots(&volume.id).await?;
//! ```

pub mod client;
pub mod error;
pub mod provider;

pub use client::DigitalOceanClient;
pub use error::{DigitalOceanError, Result};
pub use provider::DigitalOceanProvider;
