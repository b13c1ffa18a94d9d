//! # Desktop Bridge
//!
//! Desktop implementations of the platform traits in `bridge-traits`:
//!
//! - [`SqlitePositionStore`]: durable playback-position persistence backed
//!   by SQLite, for real deployments.
//! - [`MemoryPositionStore`]: process-lifetime persistence, for tests and
//!   hosts that opt out of durable resume.
//!
//! Media engines themselves are platform-owned (GStreamer, AVFoundation,
//! Media Foundation wrappers live with the host); this crate only provides
//! the storage side of the bridge.

pub mod memory;
pub mod positions;

pub use memory::MemoryPositionStore;
pub use positions::SqlitePositionStore;
