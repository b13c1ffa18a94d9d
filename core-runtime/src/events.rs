//! # Event Bus System
//!
//! Decoupled notification channel for the session core, built on
//! `tokio::sync::broadcast`.
//!
//! Sessions publish [`SessionEvent`]s on every state transition and whenever
//! position persistence succeeds or degrades. The hosting surface subscribes
//! to drive notifications, analytics, or UI state — none of which may block
//! a playback command, which is why delivery is broadcast-and-forget.
//!
//! Persistence failures in particular are *only* reported here (plus a log
//! line): they never abort an in-progress playback command.
//!
//! ## Error Handling
//!
//! - `RecvError::Lagged(n)`: the subscriber fell behind by `n` events.
//!   Non-fatal; it keeps receiving new events.
//! - `RecvError::Closed`: all senders dropped, treat as shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Session Events
// ============================================================================

/// Events published by a playback session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// A new media identity entered engine preparation.
    Loading {
        /// The media identity being prepared.
        identity: String,
    },
    /// Playback started or resumed.
    Playing {
        /// The media identity.
        identity: String,
        /// Position when playback started (milliseconds).
        position_ms: u64,
    },
    /// Playback paused (user toggle or lifecycle backgrounding).
    Paused {
        /// The media identity.
        identity: String,
        /// Position when paused (milliseconds).
        position_ms: u64,
    },
    /// Playback stopped; position reset to zero.
    Stopped {
        /// The media identity.
        identity: String,
    },
    /// The session was torn down; engine resources freed.
    Released,
    /// A saved offset was found and applied while loading.
    PositionRestored {
        /// The media identity.
        identity: String,
        /// The restored offset (milliseconds).
        position_ms: u64,
    },
    /// A playback offset was written through to the position store.
    PositionPersisted {
        /// The media identity.
        identity: String,
        /// The persisted offset (milliseconds).
        position_ms: u64,
    },
    /// A position store read or write failed. Playback continues; resume
    /// convenience degrades for this identity.
    PersistenceWarning {
        /// The media identity, if one was involved.
        identity: Option<String>,
        /// Human-readable failure description.
        message: String,
    },
    /// The engine failed to prepare a source.
    EngineError {
        /// The media identity that failed, if known.
        identity: Option<String>,
        /// Human-readable error message.
        message: String,
        /// Whether a retry (e.g., `load` with another identity) may succeed.
        recoverable: bool,
    },
}

impl SessionEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            SessionEvent::Loading { .. } => "Media preparation started",
            SessionEvent::Playing { .. } => "Playback started",
            SessionEvent::Paused { .. } => "Playback paused",
            SessionEvent::Stopped { .. } => "Playback stopped",
            SessionEvent::Released => "Session released",
            SessionEvent::PositionRestored { .. } => "Saved position restored",
            SessionEvent::PositionPersisted { .. } => "Position persisted",
            SessionEvent::PersistenceWarning { .. } => "Position persistence degraded",
            SessionEvent::EngineError { .. } => "Engine error",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            SessionEvent::EngineError { .. } => EventSeverity::Error,
            SessionEvent::PersistenceWarning { .. } => EventSeverity::Warning,
            SessionEvent::Loading { .. } | SessionEvent::Playing { .. } => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to session events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// When a subscriber falls behind by more than `capacity` events it
    /// receives a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers. Publishers that do not care
    /// whether anyone is listening call `emit(event).ok()`.
    pub fn emit(&self, event: SessionEvent) -> Result<usize, SendError<SessionEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all
    /// future events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_creation() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        let event = SessionEvent::Released;

        // Should error when no subscribers
        assert!(bus.emit(event).is_err());
    }

    #[tokio::test]
    async fn event_emission_with_subscribers() {
        let bus = EventBus::new(10);
        let mut sub = bus.subscribe();

        let event = SessionEvent::Playing {
            identity: "a.mp4".to_string(),
            position_ms: 0,
        };

        let result = bus.emit(event.clone());
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 1);

        let received = sub.recv().await.unwrap();
        assert_eq!(received, event);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = SessionEvent::PositionPersisted {
            identity: "a.mp4".to_string(),
            position_ms: 5000,
        };

        bus.emit(event.clone()).ok();

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn lagged_subscriber() {
        let bus = EventBus::new(2); // Very small buffer
        let mut sub = bus.subscribe();

        for i in 0..5 {
            let event = SessionEvent::Paused {
                identity: format!("media-{}", i),
                position_ms: i * 1000,
            };
            bus.emit(event).ok();
        }

        // First recv should indicate lagging
        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn event_severity() {
        let warning = SessionEvent::PersistenceWarning {
            identity: Some("a.mp4".to_string()),
            message: "store offline".to_string(),
        };
        assert_eq!(warning.severity(), EventSeverity::Warning);

        let error = SessionEvent::EngineError {
            identity: Some("a.mp4".to_string()),
            message: "prepare failed".to_string(),
            recoverable: true,
        };
        assert_eq!(error.severity(), EventSeverity::Error);

        let persisted = SessionEvent::PositionPersisted {
            identity: "a.mp4".to_string(),
            position_ms: 1000,
        };
        assert_eq!(persisted.severity(), EventSeverity::Debug);
    }

    #[test]
    fn event_description() {
        let event = SessionEvent::Loading {
            identity: "a.mp4".to_string(),
        };
        assert_eq!(event.description(), "Media preparation started");
    }

    #[tokio::test]
    async fn event_serialization() {
        let event = SessionEvent::PersistenceWarning {
            identity: Some("content://media/42".to_string()),
            message: "disk full".to_string(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("PersistenceWarning"));
        assert!(json.contains("content://media/42"));

        let deserialized: SessionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }
}
