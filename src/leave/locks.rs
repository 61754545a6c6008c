use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Entries idle this long are dropped; every hold is far shorter.
const LOCK_IDLE_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockKey {
    /// Guards overlap-check-then-insert and attendance check-then-insert.
    Student(u64),
    /// Guards load-decide-update on a single leave.
    Leave(u64),
}

/// Per-key async mutexes, created on demand and evicted once idle.
pub struct KeyedLocks {
    locks: Cache<LockKey, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self {
            locks: Cache::builder().time_to_idle(LOCK_IDLE_TTL).build(),
        }
    }

    pub async fn acquire(&self, key: LockKey) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .get_with(key, async { Arc::new(Mutex::new(())) })
            .await;
        lock.lock_owned().await
    }
}

impl Default for KeyedLocks {
    fn default() -> Self {
        Self::new()
    }
}
