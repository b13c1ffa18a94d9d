//! Pull-based progress observation.
//!
//! The hosting surface polls [`PlaybackSession::progress`] on whatever
//! cadence suits its rendering (observed hosts use 500ms–1000ms). Each
//! sample queries the engine's live position — the core never extrapolates
//! from wall-clock time, so arbitrary or irregular cadence cannot drift.
//!
//! [`PlaybackSession::progress`]: crate::session::PlaybackSession::progress

/// One observation of playback progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSample {
    /// No meaningful progress right now: the session is loading, idle,
    /// stopped, or released, or the engine could not be queried. A stale
    /// value is never returned in its place.
    Unavailable,
    /// A live reading from the engine.
    Sample {
        /// Current position in milliseconds.
        position_ms: u64,
        /// Total duration in milliseconds.
        duration_ms: u64,
    },
}

impl ProgressSample {
    /// Returns `true` when this is a live reading.
    pub fn is_available(&self) -> bool {
        matches!(self, ProgressSample::Sample { .. })
    }

    /// The position, when available.
    pub fn position_ms(&self) -> Option<u64> {
        match self {
            ProgressSample::Sample { position_ms, .. } => Some(*position_ms),
            ProgressSample::Unavailable => None,
        }
    }

    /// Completed fraction in `[0.0, 1.0]`, for progress bars. `None` when
    /// unavailable or the duration is zero.
    pub fn fraction(&self) -> Option<f64> {
        match self {
            ProgressSample::Sample {
                position_ms,
                duration_ms,
            } if *duration_ms > 0 => {
                Some((*position_ms as f64 / *duration_ms as f64).clamp(0.0, 1.0))
            }
            _ => None,
        }
    }
}
