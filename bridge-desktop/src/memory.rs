//! In-memory playback position storage.

use async_trait::async_trait;
use bridge_traits::{error::Result, media::MediaIdentity, store::PositionStore};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Position store held entirely in process memory.
///
/// Positions last only as long as the process; hosts that want resume
/// across launches use [`SqlitePositionStore`](crate::SqlitePositionStore).
/// Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct MemoryPositionStore {
    entries: Arc<RwLock<HashMap<String, u64>>>,
}

impl MemoryPositionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identities with a stored position.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` when no positions are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl PositionStore for MemoryPositionStore {
    async fn save(&self, identity: &MediaIdentity, position: Duration) -> Result<()> {
        self.entries
            .write()
            .insert(identity.to_string(), position.as_millis() as u64);
        Ok(())
    }

    async fn load(&self, identity: &MediaIdentity) -> Result<Option<Duration>> {
        Ok(self
            .entries
            .read()
            .get(identity.as_str())
            .copied()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis))
    }

    async fn delete(&self, identity: &MediaIdentity) -> Result<()> {
        self.entries.write().remove(identity.as_str());
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        self.entries.write().clear();
        Ok(())
    }
}
