use chrono::{DateTime, Utc};
use scout_types::{Thread, ThreadMetadata, ThreadSnapshot, ThreadState};
use serde::{Deserialize, Serialize};

/// `threads` collection document, keyed by thread id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub metadata: ThreadMetadata,
    pub created_at: DateTime<Utc>,
}

impl From<Thread> for ThreadDocument {
    fn from(thread: Thread) -> Self {
        Self {
            id: thread.thread_id,
            metadata: thread.metadata,
            created_at: thread.created_at,
        }
    }
}

impl From<ThreadDocument> for Thread {
    fn from(doc: ThreadDocument) -> Self {
        Self {
            thread_id: doc.id,
            metadata: doc.metadata,
            created_at: doc.created_at,
        }
    }
}

/// `checkpoints` collection document: one per thread, replaced on every save
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointDocument {
    #[serde(rename = "_id")]
    pub thread_id: String,
    pub state: ThreadState,
    pub updated_at: DateTime<Utc>,
}

impl From<CheckpointDocument> for ThreadSnapshot {
    fn from(doc: CheckpointDocument) -> Self {
        Self {
            thread_id: doc.thread_id,
            values: doc.state,
            updated_at: Some(doc.updated_at),
        }
    }
}
