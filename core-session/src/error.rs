//! Session error types.
//!
//! Persistence failures are deliberately absent here: a position store that
//! cannot be read or written degrades the resume convenience, it never fails
//! a playback command. Those failures surface as
//! [`SessionEvent::PersistenceWarning`](core_runtime::events::SessionEvent)
//! on the event bus instead.

use crate::state::PlaybackState;
use thiserror::Error;

/// Errors surfaced synchronously by session commands.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Command issued after `teardown`. Programmer error; the session is
    /// terminal and a new one must be constructed.
    #[error("Session already released")]
    Released,

    /// The engine failed to prepare or drive a source. Recoverable by
    /// calling `load` again, possibly with a different identity.
    #[error("Media unavailable: {identity}: {message}")]
    MediaUnavailable {
        /// The media identity involved.
        identity: String,
        /// Engine-reported failure description.
        message: String,
    },

    /// Command issued from a state it is not valid in.
    #[error("Command `{command}` not valid from state {state:?}")]
    InvalidTransition {
        /// The rejected command.
        command: &'static str,
        /// The state the session was in.
        state: PlaybackState,
    },
}

impl SessionError {
    /// Returns `true` if the failed operation may succeed after another
    /// `load`.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SessionError::MediaUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverability_classification() {
        let unavailable = SessionError::MediaUnavailable {
            identity: "a.mp4".to_string(),
            message: "prepare failed".to_string(),
        };
        assert!(unavailable.is_recoverable());
        assert!(!SessionError::Released.is_recoverable());
    }

    #[test]
    fn invalid_transition_names_command_and_state() {
        let err = SessionError::InvalidTransition {
            command: "play_pause",
            state: PlaybackState::Idle,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("play_pause"));
        assert!(rendered.contains("Idle"));
    }
}
