//! # Playback Session Core
//!
//! Manages exactly one active media resource across its full lifecycle —
//! load, play, pause, seek, resume-from-saved-position, and teardown —
//! independent of any UI toolkit or rendering surface.
//!
//! ## Overview
//!
//! A [`PlaybackSession`] owns one [`MediaEngine`](bridge_traits::MediaEngine)
//! handle and translates host commands into engine operations while
//! mirroring the engine's position and writing it through to a
//! [`PositionStore`](bridge_traits::PositionStore) at the moments that
//! matter: `stop`, `lifecycle_pause`, `teardown`, and whenever `load`
//! switches away from a playing identity. Progress is observed by pulling
//! [`ProgressSample`]s at whatever cadence the host chooses; the core never
//! renders anything and never pushes callbacks.
//!
//! ## Concurrency
//!
//! Commands take `&mut self` and must be serialized by the hosting surface
//! (a single-threaded event loop or an external mutex). [`progress`] takes
//! `&self` and may be interleaved from a timer: it only reads session state
//! and queries the engine.
//!
//! [`progress`]: PlaybackSession::progress

pub mod error;
pub mod progress;
pub mod session;
pub mod state;

pub use error::{Result, SessionError};
pub use progress::ProgressSample;
pub use session::{PlaybackSession, SessionId};
pub use state::PlaybackState;
