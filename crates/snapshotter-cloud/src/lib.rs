//! Snapshotter cloud gateway
//!
//! This crate defines the boundary between the rotation engine and a cloud
//! provider's block-storage API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                snapshotter CLI                   │
//! │         (create, list, prune per volume)         │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               snapshotter-cloud                  │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │            Gateway Abstraction            │   │
//! │  │  trait SnapshotGateway { ... }            │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │    Volume    │  │   Snapshot   │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │ digitalocean  │
//! │   provider    │
//! └───────────────┘
//! ```

pub mod error;
pub mod model;
pub mod provider;

// Re-exports
pub use error::{CloudError, Result};
pub use model::{Snapshot, Volume};
pub use provider::SnapshotGateway;
