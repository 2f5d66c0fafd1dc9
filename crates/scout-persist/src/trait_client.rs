use async_trait::async_trait;
use std::sync::Arc;
use scout_types::{CreateThreadRequest, Thread, ThreadSnapshot, ThreadState};

use crate::error::Result;

/// Durable per-thread state used by the agent loop
///
/// `save` replaces the whole state for a thread in one write, so a reader
/// never observes a partially applied transition.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    /// Latest snapshot; an empty state when nothing was saved yet
    async fn snapshot(&self, thread_id: &str) -> Result<ThreadSnapshot>;

    async fn save(&self, thread_id: &str, state: ThreadState) -> Result<ThreadSnapshot>;

    async fn load(&self, thread_id: &str) -> Result<ThreadState> {
        Ok(self.snapshot(thread_id).await?.values)
    }
}

/// Thread registry
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Create a thread, honouring `if_exists` when the id is taken
    async fn create_thread(&self, request: CreateThreadRequest) -> Result<Thread>;

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>>;
}

/// A backend providing both halves of the persistence contract
pub trait PersistenceClient: Checkpointer + ThreadStore {
    /// The same backend viewed only as a checkpointer
    fn checkpointer(self: Arc<Self>) -> Arc<dyn Checkpointer>;
}

impl<T: Checkpointer + ThreadStore + 'static> PersistenceClient for T {
    fn checkpointer(self: Arc<Self>) -> Arc<dyn Checkpointer> {
        self
    }
}
