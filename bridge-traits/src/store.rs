//! Position persistence abstraction.
//!
//! Maps a [`MediaIdentity`](crate::media::MediaIdentity) to the last-known
//! playback offset so a resource can resume where it left off. Backed by
//! whatever durable key-value mechanism the platform offers (SQLite, shared
//! preferences, a config file). The store must survive process restart.

use crate::error::Result;
use crate::media::MediaIdentity;
use async_trait::async_trait;
use std::time::Duration;

/// Durable identity → playback-offset mapping.
///
/// Semantics:
/// - `save` is an idempotent upsert; one entry per identity, last write wins.
/// - `load` returns `None` for identities that were never saved *and* for
///   saved offsets of zero — a zero offset carries no resume value, so
///   implementations normalize it away on read rather than making every
///   caller special-case it.
/// - Single-key atomicity only; no cross-key transactions.
/// - Failures surface as [`BridgeError::StoreUnavailable`]. Callers treat
///   them as non-fatal: resume is a convenience, not a correctness
///   requirement.
/// - Retention and eviction, if any, are an implementation concern; the
///   `delete`/`clear_all` hooks exist so hosts can wire one up.
///
/// [`BridgeError::StoreUnavailable`]: crate::error::BridgeError::StoreUnavailable
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Upsert the saved offset for an identity.
    async fn save(&self, identity: &MediaIdentity, position: Duration) -> Result<()>;

    /// Fetch the saved offset for an identity, if a meaningful one exists.
    async fn load(&self, identity: &MediaIdentity) -> Result<Option<Duration>>;

    /// Drop the saved offset for an identity. Unknown identities are a no-op.
    async fn delete(&self, identity: &MediaIdentity) -> Result<()>;

    /// Drop every saved offset.
    async fn clear_all(&self) -> Result<()>;

    /// Whether a saved offset with resume value exists for the identity.
    /// Zero offsets normalize away on read, so they read as absent here too.
    async fn contains(&self, identity: &MediaIdentity) -> Result<bool> {
        Ok(self.load(identity).await?.is_some())
    }
}
