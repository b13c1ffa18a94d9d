//! Playback lifecycle state.

/// State of a playback session.
///
/// Distinct from the user's play/pause *intent*
/// (`PlaybackSession::play_requested`): a `Loading` item remembers whether
/// to auto-play once the engine signals readiness, so intent and state can
/// legitimately disagree while a prepare is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// No media loaded.
    Idle,
    /// Engine prepare in flight.
    Loading,
    /// Engine is advancing.
    Playing,
    /// Loaded, not advancing, position preserved.
    Paused,
    /// Loaded, position reset to zero, not advancing.
    Stopped,
    /// Terminal; engine resources freed, no further transitions.
    Released,
}

impl PlaybackState {
    /// Returns `true` for the terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, PlaybackState::Released)
    }

    /// Returns `true` while a media identity is attached to the session.
    pub fn has_media(self) -> bool {
        !matches!(self, PlaybackState::Idle | PlaybackState::Released)
    }

    /// Returns `true` in the states where a progress sample is meaningful.
    /// Sampling in any other state yields the unavailable sentinel.
    pub fn is_observable(self) -> bool {
        matches!(self, PlaybackState::Playing | PlaybackState::Paused)
    }
}
