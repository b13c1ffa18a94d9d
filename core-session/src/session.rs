//! # Playback Session
//!
//! The aggregate root of the session core. A `PlaybackSession` owns exactly
//! one media engine handle, tracks the current media identity and the user's
//! play/pause intent, mirrors the engine position, and writes that position
//! through to the position store on the lifecycle moments that matter.
//!
//! ## Command surface
//!
//! | Command | Valid from |
//! |---|---|
//! | [`load`] | any except `Released` |
//! | [`on_engine_ready`] | `Loading` (stale signals are dropped) |
//! | [`play_pause`] | `Playing`, `Paused` |
//! | [`seek`] | `Playing`, `Paused`, `Stopped` |
//! | [`stop`] | `Playing`, `Paused` |
//! | [`lifecycle_pause`] | `Playing`, `Paused`, `Loading` |
//! | [`teardown`] | any (idempotent) |
//!
//! Engine preparation is asynchronous: `load` returns once the prepare has
//! been issued, and the host signals completion through [`on_engine_ready`]
//! or failure through [`on_engine_error`]. Both callbacks carry the identity
//! they belong to, which is how a slow prepare superseded by a newer `load`
//! gets recognized as stale and dropped.
//!
//! [`load`]: PlaybackSession::load
//! [`on_engine_ready`]: PlaybackSession::on_engine_ready
//! [`on_engine_error`]: PlaybackSession::on_engine_error
//! [`play_pause`]: PlaybackSession::play_pause
//! [`seek`]: PlaybackSession::seek
//! [`stop`]: PlaybackSession::stop
//! [`lifecycle_pause`]: PlaybackSession::lifecycle_pause
//! [`teardown`]: PlaybackSession::teardown

use crate::error::{Result, SessionError};
use crate::progress::ProgressSample;
use crate::state::PlaybackState;
use bridge_traits::{MediaEngine, MediaIdentity, PositionStore};
use core_runtime::events::{EventBus, SessionEvent};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Unique identifier for a playback session, used to correlate log lines
/// and events when a surface is rebuilt across lifecycle re-entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Manages one active media resource across its full lifecycle.
///
/// Commands take `&mut self`; the hosting surface must serialize them.
/// [`progress`](Self::progress) takes `&self` and may be interleaved from a
/// timer. Exactly one session may drive a given engine handle at a time, and
/// [`teardown`](Self::teardown) is the only path that releases it.
pub struct PlaybackSession {
    id: SessionId,
    engine: Arc<dyn MediaEngine>,
    store: Arc<dyn PositionStore>,
    events: EventBus,
    state: PlaybackState,
    current_identity: Option<MediaIdentity>,
    /// Cached mirror of the engine position. Updated by every
    /// state-changing command and by progress ticks; atomic so ticks can
    /// refresh it through `&self`.
    last_known_position_ms: AtomicU64,
    known_duration_ms: Option<u64>,
    /// The user's play/pause *intent*, distinct from `state`: a `Loading`
    /// item must remember whether to auto-play once the engine is ready.
    play_requested: bool,
}

impl PlaybackSession {
    /// Create an idle session around an engine handle, a position store,
    /// and an event bus.
    ///
    /// Play intent starts out set: in every host surveyed, picking a media
    /// item *is* the request to play it, so the first `load` auto-plays
    /// once the engine reports ready.
    pub fn new(
        engine: Arc<dyn MediaEngine>,
        store: Arc<dyn PositionStore>,
        events: EventBus,
    ) -> Self {
        Self {
            id: SessionId::new(),
            engine,
            store,
            events,
            state: PlaybackState::Idle,
            current_identity: None,
            last_known_position_ms: AtomicU64::new(0),
            known_duration_ms: None,
            play_requested: true,
        }
    }

    /// This session's correlation id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// The identity currently attached to the session.
    ///
    /// `None` exactly when the state is `Idle` or `Released`.
    pub fn current_identity(&self) -> Option<&MediaIdentity> {
        self.current_identity.as_ref()
    }

    /// Last engine position mirrored into the session, in milliseconds.
    pub fn last_known_position_ms(&self) -> u64 {
        self.last_known_position_ms.load(Ordering::Relaxed)
    }

    /// Whether the user's standing intent is to play.
    pub fn play_requested(&self) -> bool {
        self.play_requested
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Attach a new media identity and begin asynchronous engine
    /// preparation.
    ///
    /// If another identity is currently attached its position is persisted
    /// first, so switching media never loses a resume point. A saved offset
    /// for the new identity, when one exists, is applied to the engine
    /// before `prepare` so playback resumes where it left off. Play intent
    /// is preserved across loads and applied once
    /// [`on_engine_ready`](Self::on_engine_ready) fires.
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn load(&mut self, identity: MediaIdentity) -> Result<()> {
        if self.state.is_terminal() {
            return Err(SessionError::Released);
        }

        // Write-through for the outgoing identity before switching away.
        if let Some(previous) = self.current_identity.clone() {
            if previous != identity {
                if self.state.is_observable() {
                    self.refresh_position_from_engine().await;
                }
                let position = Duration::from_millis(self.last_known_position_ms());
                self.persist_position(&previous, position).await;
            }
        }

        info!(identity = %identity, "loading media");
        self.current_identity = Some(identity.clone());
        self.known_duration_ms = None;
        self.set_position_mirror(0);
        self.state = PlaybackState::Loading;
        self.events
            .emit(SessionEvent::Loading {
                identity: identity.to_string(),
            })
            .ok();

        // A failed store read degrades to start-of-media; a saved zero
        // carries no resume value either way.
        let resume = match self.store.load(&identity).await {
            Ok(offset) => offset.filter(|offset| !offset.is_zero()),
            Err(e) => {
                warn!(identity = %identity, error = %e, "position restore failed");
                self.events
                    .emit(SessionEvent::PersistenceWarning {
                        identity: Some(identity.to_string()),
                        message: e.to_string(),
                    })
                    .ok();
                None
            }
        };

        if let Err(e) = self.engine.set_source(&identity).await {
            return Err(self.fail_media(&identity, e.to_string()));
        }
        if let Some(offset) = resume {
            if let Err(e) = self.engine.seek_to(offset).await {
                return Err(self.fail_media(&identity, e.to_string()));
            }
            let offset_ms = offset.as_millis() as u64;
            self.set_position_mirror(offset_ms);
            debug!(identity = %identity, position_ms = offset_ms, "restored saved position");
            self.events
                .emit(SessionEvent::PositionRestored {
                    identity: identity.to_string(),
                    position_ms: offset_ms,
                })
                .ok();
        }
        if let Err(e) = self.engine.prepare().await {
            return Err(self.fail_media(&identity, e.to_string()));
        }

        Ok(())
    }

    /// Host callback: the engine finished preparing `identity`.
    ///
    /// Signals for anything other than the identity currently loading are
    /// stale — a newer `load` or a `teardown` superseded them — and are
    /// dropped without touching the engine. When current, the stored play
    /// intent is applied exactly once: the session moves to `Playing` (with
    /// a single engine play call) or to `Paused`.
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn on_engine_ready(
        &mut self,
        identity: &MediaIdentity,
        duration: Duration,
    ) -> Result<()> {
        if self.state != PlaybackState::Loading
            || self.current_identity.as_ref() != Some(identity)
        {
            debug!(identity = %identity, state = ?self.state, "ignoring stale engine-ready signal");
            return Ok(());
        }

        let duration_ms = duration.as_millis() as u64;
        self.known_duration_ms = Some(duration_ms);
        let position_ms = self.last_known_position_ms().min(duration_ms);
        self.set_position_mirror(position_ms);

        let identity = identity.clone();
        if self.play_requested {
            if let Err(e) = self.engine.play().await {
                return Err(self.fail_media(&identity, e.to_string()));
            }
            self.state = PlaybackState::Playing;
            info!(identity = %identity, duration_ms, "engine ready, playing");
            self.events
                .emit(SessionEvent::Playing {
                    identity: identity.to_string(),
                    position_ms,
                })
                .ok();
        } else {
            self.state = PlaybackState::Paused;
            info!(identity = %identity, duration_ms, "engine ready, holding paused");
            self.events
                .emit(SessionEvent::Paused {
                    identity: identity.to_string(),
                    position_ms,
                })
                .ok();
        }
        Ok(())
    }

    /// Host callback: the engine failed to prepare `identity`.
    ///
    /// Stale signals are dropped like in
    /// [`on_engine_ready`](Self::on_engine_ready). When current, the
    /// session resets to `Idle` and the failure surfaces as
    /// [`SessionError::MediaUnavailable`]; a subsequent `load` with another
    /// identity may succeed.
    #[instrument(skip(self, message), fields(session = %self.id))]
    pub async fn on_engine_error(
        &mut self,
        identity: &MediaIdentity,
        message: impl Into<String>,
    ) -> Result<()> {
        if self.state != PlaybackState::Loading
            || self.current_identity.as_ref() != Some(identity)
        {
            debug!(identity = %identity, state = ?self.state, "ignoring stale engine-error signal");
            return Ok(());
        }
        let identity = identity.clone();
        Err(self.fail_media(&identity, message.into()))
    }

    /// Toggle between `Playing` and `Paused`, updating intent and the
    /// engine in lockstep.
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn play_pause(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Released => Err(SessionError::Released),
            PlaybackState::Playing => {
                let identity = self.attached_identity("play_pause")?;
                self.refresh_position_from_engine().await;
                if let Err(e) = self.engine.pause().await {
                    return Err(self.fail_media(&identity, e.to_string()));
                }
                self.play_requested = false;
                self.state = PlaybackState::Paused;
                debug!(identity = %identity, "paused");
                self.events
                    .emit(SessionEvent::Paused {
                        identity: identity.to_string(),
                        position_ms: self.last_known_position_ms(),
                    })
                    .ok();
                Ok(())
            }
            PlaybackState::Paused => {
                let identity = self.attached_identity("play_pause")?;
                if let Err(e) = self.engine.play().await {
                    return Err(self.fail_media(&identity, e.to_string()));
                }
                self.play_requested = true;
                self.state = PlaybackState::Playing;
                debug!(identity = %identity, "resumed");
                self.events
                    .emit(SessionEvent::Playing {
                        identity: identity.to_string(),
                        position_ms: self.last_known_position_ms(),
                    })
                    .ok();
                Ok(())
            }
            state => Err(SessionError::InvalidTransition {
                command: "play_pause",
                state,
            }),
        }
    }

    /// Seek to an absolute position, clamped to `[0, duration]`.
    ///
    /// Out-of-range targets — negative or beyond the known duration — are
    /// clamped, never an error. Seeking does not write through to the
    /// position store; only lifecycle moments do.
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn seek(&mut self, target_ms: i64) -> Result<()> {
        match self.state {
            PlaybackState::Released => return Err(SessionError::Released),
            PlaybackState::Playing | PlaybackState::Paused | PlaybackState::Stopped => {}
            state => {
                return Err(SessionError::InvalidTransition {
                    command: "seek",
                    state,
                })
            }
        }
        let identity = self.attached_identity("seek")?;

        let mut clamped_ms = target_ms.max(0) as u64;
        if let Some(duration_ms) = self.known_duration_ms {
            clamped_ms = clamped_ms.min(duration_ms);
        }

        if let Err(e) = self.engine.seek_to(Duration::from_millis(clamped_ms)).await {
            return Err(self.fail_media(&identity, e.to_string()));
        }
        self.set_position_mirror(clamped_ms);
        debug!(identity = %identity, target_ms, clamped_ms, "seek");
        Ok(())
    }

    /// Stop playback: persist the position for resume, pause the engine,
    /// and rewind it to zero. The identity stays attached.
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn stop(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Released => return Err(SessionError::Released),
            PlaybackState::Playing | PlaybackState::Paused => {}
            state => {
                return Err(SessionError::InvalidTransition {
                    command: "stop",
                    state,
                })
            }
        }
        let identity = self.attached_identity("stop")?;

        self.refresh_position_from_engine().await;
        let position = Duration::from_millis(self.last_known_position_ms());
        self.persist_position(&identity, position).await;

        if let Err(e) = self.engine.pause().await {
            return Err(self.fail_media(&identity, e.to_string()));
        }
        if let Err(e) = self.engine.seek_to(Duration::ZERO).await {
            return Err(self.fail_media(&identity, e.to_string()));
        }

        self.set_position_mirror(0);
        self.play_requested = false;
        self.state = PlaybackState::Stopped;
        info!(identity = %identity, "stopped");
        self.events
            .emit(SessionEvent::Stopped {
                identity: identity.to_string(),
            })
            .ok();
        Ok(())
    }

    /// The hosting surface moved to the background: persist the current
    /// position and pause the engine without releasing it.
    ///
    /// Clears play intent so the next explicit `play_pause` resumes.
    /// Interrupting a `Loading` prepare this way parks the session in
    /// `Paused`; a later engine-ready signal is treated as stale and the
    /// host re-issues `load` on foregrounding.
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn lifecycle_pause(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Released => return Err(SessionError::Released),
            PlaybackState::Playing | PlaybackState::Paused | PlaybackState::Loading => {}
            state => {
                return Err(SessionError::InvalidTransition {
                    command: "lifecycle_pause",
                    state,
                })
            }
        }
        let identity = self.attached_identity("lifecycle_pause")?;

        if self.state == PlaybackState::Playing {
            self.refresh_position_from_engine().await;
            if let Err(e) = self.engine.pause().await {
                return Err(self.fail_media(&identity, e.to_string()));
            }
        }

        let position = Duration::from_millis(self.last_known_position_ms());
        self.persist_position(&identity, position).await;

        self.play_requested = false;
        self.state = PlaybackState::Paused;
        info!(identity = %identity, position_ms = position.as_millis() as u64, "lifecycle pause");
        self.events
            .emit(SessionEvent::Paused {
                identity: identity.to_string(),
                position_ms: position.as_millis() as u64,
            })
            .ok();
        Ok(())
    }

    /// Release engine resources and end the session. Terminal and
    /// idempotent: the first call persists the position (if media is
    /// loaded) and releases the engine; further calls are no-ops.
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn teardown(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            debug!("teardown on released session is a no-op");
            return Ok(());
        }

        if let Some(identity) = self.current_identity.clone() {
            if self.state.is_observable() {
                self.refresh_position_from_engine().await;
            }
            let position = Duration::from_millis(self.last_known_position_ms());
            self.persist_position(&identity, position).await;
        }

        if let Err(e) = self.engine.release().await {
            warn!(error = %e, "engine release failed");
        }

        self.current_identity = None;
        self.known_duration_ms = None;
        self.play_requested = false;
        self.state = PlaybackState::Released;
        info!("session released");
        self.events.emit(SessionEvent::Released).ok();
        Ok(())
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Pull one progress sample.
    ///
    /// Queries the engine's live position — never extrapolates from
    /// wall-clock time — so the host may poll at any cadence without drift.
    /// Outside `Playing`/`Paused` this yields
    /// [`ProgressSample::Unavailable`] rather than a stale value, and a
    /// released engine handle is never touched.
    pub async fn progress(&self) -> ProgressSample {
        if !self.state.is_observable() {
            return ProgressSample::Unavailable;
        }
        let Some(duration_ms) = self.known_duration_ms else {
            return ProgressSample::Unavailable;
        };

        match self.engine.position().await {
            Ok(position) => {
                let position_ms = (position.as_millis() as u64).min(duration_ms);
                self.set_position_mirror(position_ms);
                ProgressSample::Sample {
                    position_ms,
                    duration_ms,
                }
            }
            Err(e) => {
                debug!(error = %e, "progress query failed");
                ProgressSample::Unavailable
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn set_position_mirror(&self, position_ms: u64) {
        self.last_known_position_ms
            .store(position_ms, Ordering::Relaxed);
    }

    /// Fetch the attached identity for a command that requires one. The
    /// identity invariant makes `None` unreachable in the states these
    /// commands accept; surfaced as an invalid transition rather than a
    /// panic.
    fn attached_identity(&self, command: &'static str) -> Result<MediaIdentity> {
        self.current_identity
            .clone()
            .ok_or(SessionError::InvalidTransition {
                command,
                state: self.state,
            })
    }

    /// Best-effort refresh of the position mirror from the live engine.
    async fn refresh_position_from_engine(&self) {
        if let Ok(position) = self.engine.position().await {
            let mut position_ms = position.as_millis() as u64;
            if let Some(duration_ms) = self.known_duration_ms {
                position_ms = position_ms.min(duration_ms);
            }
            self.set_position_mirror(position_ms);
        }
    }

    /// Write a position through to the store. Failures are downgraded to a
    /// warning event: resume is a convenience and must never abort a
    /// playback command.
    async fn persist_position(&self, identity: &MediaIdentity, position: Duration) {
        let position_ms = position.as_millis() as u64;
        match self.store.save(identity, position).await {
            Ok(()) => {
                debug!(identity = %identity, position_ms, "position persisted");
                self.events
                    .emit(SessionEvent::PositionPersisted {
                        identity: identity.to_string(),
                        position_ms,
                    })
                    .ok();
            }
            Err(e) => {
                warn!(identity = %identity, error = %e, "position persistence failed, resume will degrade");
                self.events
                    .emit(SessionEvent::PersistenceWarning {
                        identity: Some(identity.to_string()),
                        message: e.to_string(),
                    })
                    .ok();
            }
        }
    }

    /// Reset to `Idle` after an engine failure and build the surfaced
    /// error. Play intent survives so reloading another identity keeps the
    /// user's expectation.
    fn fail_media(&mut self, identity: &MediaIdentity, message: String) -> SessionError {
        error!(identity = %identity, message = %message, "engine failure, session reset to idle");
        self.current_identity = None;
        self.known_duration_ms = None;
        self.set_position_mirror(0);
        self.state = PlaybackState::Idle;
        self.events
            .emit(SessionEvent::EngineError {
                identity: Some(identity.to_string()),
                message: message.clone(),
                recoverable: true,
            })
            .ok();
        SessionError::MediaUnavailable {
            identity: identity.to_string(),
            message,
        }
    }
}

impl fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("current_identity", &self.current_identity)
            .field("last_known_position_ms", &self.last_known_position_ms())
            .field("play_requested", &self.play_requested)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
