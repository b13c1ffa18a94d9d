//! Media engine bridge trait and supporting types.
//!
//! The session core never decodes, demuxes, or renders anything itself; it
//! drives an opaque platform media engine through this trait. Host
//! applications provide a concrete implementation backed by whatever
//! pipeline their platform offers (ExoPlayer-style players, gstreamer,
//! symphonia + cpal, a web `<video>` element, ...).

use crate::error::Result;
use std::fmt;
use std::time::Duration;

/// Opaque, stable identifier for a playable resource.
///
/// Typically a content URI or remote URL. The core uses it only as a lookup
/// key — for the position store and for correlating asynchronous engine
/// callbacks with the media they belong to — and never parses it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaIdentity(String);

impl MediaIdentity {
    /// Wrap a raw identifier string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the underlying identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaIdentity {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for MediaIdentity {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Trait for platform media engines that perform the actual decode/render.
///
/// The session core issues commands through this trait and mirrors the
/// engine's position into its own state. `prepare` only *starts* source
/// preparation; the host signals completion (or failure) back into the
/// session, which is how a slow prepare can be superseded by a newer `load`.
///
/// Position queries are read-only and may be issued from a progress timer
/// interleaved with commands; implementations should keep them cheap.
#[async_trait::async_trait]
pub trait MediaEngine: Send + Sync {
    /// Point the engine at a new source. Any previously set source is
    /// discarded.
    async fn set_source(&self, identity: &MediaIdentity) -> Result<()>;

    /// Begin asynchronous preparation of the current source. Completion is
    /// reported out-of-band by the host, not by this call returning.
    async fn prepare(&self) -> Result<()>;

    /// Start or resume playback of the prepared source.
    async fn play(&self) -> Result<()>;

    /// Pause playback, keeping the source and position.
    async fn pause(&self) -> Result<()>;

    /// Seek to an absolute position within the current source.
    async fn seek_to(&self, position: Duration) -> Result<()>;

    /// Current playback position of the engine.
    async fn position(&self) -> Result<Duration>;

    /// Total duration of the current source, when known.
    async fn duration(&self) -> Result<Duration>;

    /// Whether the engine is actively advancing.
    async fn is_playing(&self) -> Result<bool>;

    /// Release all engine resources. The handle must not be used afterwards.
    async fn release(&self) -> Result<()>;
}
