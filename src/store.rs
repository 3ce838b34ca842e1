//! Persistence collaborator seam.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::StoreError;
use crate::model::Thread;

/// Source of the full thread read a feed starts from.
///
/// Called once per feed lifetime, on a blocking thread.
pub trait ThreadStore: Send + Sync + 'static {
    fn thread(&self, id: u64) -> Result<Thread, StoreError>;
}

/// In-memory store for embedders without a database and for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    threads: RwLock<FxHashMap<u64, Thread>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a thread.
    pub fn insert(&self, thread: Thread) {
        self.threads.write().insert(thread.id, thread);
    }

    pub fn remove(&self, id: u64) -> Option<Thread> {
        self.threads.write().remove(&id)
    }
}

impl ThreadStore for MemoryStore {
    fn thread(&self, id: u64) -> Result<Thread, StoreError> {
        self.threads
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }
}
