//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback session core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that every platform provides differently:
//!
//! - [`MediaEngine`](media::MediaEngine) — the decode/demux/render pipeline
//!   behind a small async command surface
//! - [`PositionStore`](store::PositionStore) — durable key → offset mapping
//!   used for resume-on-reopen
//!
//! The core treats both purely as interfaces: it never inspects a media
//! identity, never touches storage mechanics, and never blocks on engine
//! preparation (readiness is signaled back into the session by the host).
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`] for consistent error handling.
//! Platform implementations should convert platform-specific errors to
//! `BridgeError` and include actionable context (key names, engine status).
//!
//! ## Thread Safety
//!
//! Bridge traits require `Send + Sync` so implementations can be shared
//! across async tasks. The *session core* on top of them assumes a single
//! writer; these traits do not.

pub mod error;
pub mod media;
pub mod store;

pub use error::BridgeError;

// Re-export commonly used types
pub use media::{MediaEngine, MediaIdentity};
pub use store::PositionStore;
