use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::doc;
use mongodb::{Client, Collection};
use scout_types::{CreateThreadRequest, IfExists, Thread, ThreadSnapshot, ThreadState};

use super::models::{CheckpointDocument, ThreadDocument};
use crate::error::{PersistError, Result};
use crate::memory::resolve_thread_id;
use crate::trait_client::{Checkpointer, ThreadStore};

pub struct MongoStore {
    threads: Collection<ThreadDocument>,
    checkpoints: Collection<CheckpointDocument>,
}

impl MongoStore {
    /// Connect to MongoDB and create client
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;
        let db = client.database(database);

        // The driver connects lazily; fail here rather than on the first run
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        Ok(Self {
            threads: db.collection("threads"),
            checkpoints: db.collection("checkpoints"),
        })
    }
}

#[async_trait]
impl ThreadStore for MongoStore {
    async fn create_thread(&self, request: CreateThreadRequest) -> Result<Thread> {
        let thread_id = resolve_thread_id(&request);
        let if_exists = request.if_exists;

        let mut insert = bson::to_document(&ThreadDocument::from(Thread::new(
            thread_id.clone(),
            request.metadata,
        )))?;
        insert.remove("_id");

        // Single round trip: inserts only when the id is free
        let result = self
            .threads
            .update_one(doc! { "_id": &thread_id }, doc! { "$setOnInsert": insert })
            .upsert(true)
            .await?;

        if result.upserted_id.is_none() && if_exists == IfExists::Raise {
            return Err(PersistError::ThreadExists(thread_id));
        }

        self.get_thread(&thread_id)
            .await?
            .ok_or(PersistError::ThreadNotFound(thread_id))
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let doc = self.threads.find_one(doc! { "_id": thread_id }).await?;
        Ok(doc.map(Thread::from))
    }
}

#[async_trait]
impl Checkpointer for MongoStore {
    async fn snapshot(&self, thread_id: &str) -> Result<ThreadSnapshot> {
        let doc = self.checkpoints.find_one(doc! { "_id": thread_id }).await?;
        Ok(doc.map(ThreadSnapshot::from).unwrap_or_else(|| ThreadSnapshot {
            thread_id: thread_id.to_string(),
            values: ThreadState::default(),
            updated_at: None,
        }))
    }

    async fn save(&self, thread_id: &str, state: ThreadState) -> Result<ThreadSnapshot> {
        let doc = CheckpointDocument {
            thread_id: thread_id.to_string(),
            state,
            updated_at: Utc::now(),
        };

        self.checkpoints
            .replace_one(doc! { "_id": thread_id }, &doc)
            .upsert(true)
            .await?;

        Ok(doc.into())
    }
}
