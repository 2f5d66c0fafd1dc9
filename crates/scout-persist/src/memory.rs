use async_trait::async_trait;
use chrono::Utc;
use scout_types::{CreateThreadRequest, IfExists, Thread, ThreadSnapshot, ThreadState};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::trait_client::{Checkpointer, ThreadStore};

/// Process-local backend. State is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    threads: RwLock<HashMap<String, Thread>>,
    checkpoints: RwLock<HashMap<String, ThreadSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

pub(crate) fn resolve_thread_id(request: &CreateThreadRequest) -> String {
    request
        .thread_id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

#[async_trait]
impl ThreadStore for MemoryStore {
    async fn create_thread(&self, request: CreateThreadRequest) -> Result<Thread> {
        let thread_id = resolve_thread_id(&request);
        let mut threads = self.threads.write().await;

        if let Some(existing) = threads.get(&thread_id) {
            return match request.if_exists {
                IfExists::DoNothing => {
                    tracing::debug!(thread_id = %thread_id, "Thread exists, keeping it");
                    Ok(existing.clone())
                }
                IfExists::Raise => Err(PersistError::ThreadExists(thread_id)),
            };
        }

        let thread = Thread::new(thread_id.clone(), request.metadata);
        threads.insert(thread_id, thread.clone());
        Ok(thread)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        Ok(self.threads.read().await.get(thread_id).cloned())
    }
}

#[async_trait]
impl Checkpointer for MemoryStore {
    async fn snapshot(&self, thread_id: &str) -> Result<ThreadSnapshot> {
        let checkpoints = self.checkpoints.read().await;
        Ok(checkpoints
            .get(thread_id)
            .cloned()
            .unwrap_or_else(|| ThreadSnapshot {
                thread_id: thread_id.to_string(),
                values: ThreadState::default(),
                updated_at: None,
            }))
    }

    async fn save(&self, thread_id: &str, state: ThreadState) -> Result<ThreadSnapshot> {
        let snapshot = ThreadSnapshot {
            thread_id: thread_id.to_string(),
            values: state,
            updated_at: Some(Utc::now()),
        };
        self.checkpoints
            .write()
            .await
            .insert(thread_id.to_string(), snapshot.clone());
        Ok(snapshot)
    }
}
