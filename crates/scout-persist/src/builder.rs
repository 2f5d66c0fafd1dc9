use std::sync::Arc;

use crate::error::Result;
use crate::memory::MemoryStore;
use crate::trait_client::PersistenceClient;

pub const DEFAULT_DATABASE: &str = "scout";

/// Selects a persistence backend: MongoDB when a URI is configured, memory otherwise
pub struct StoreBuilder {
    mongodb_uri: Option<String>,
    database: String,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self {
            mongodb_uri: None,
            database: DEFAULT_DATABASE.to_string(),
        }
    }

    pub fn mongodb_uri(mut self, uri: Option<String>) -> Self {
        self.mongodb_uri = uri.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    pub async fn build(self) -> Result<Arc<dyn PersistenceClient>> {
        match self.mongodb_uri {
            Some(uri) => connect_mongo(&uri, &self.database).await,
            None => {
                tracing::warn!("MONGODB_URI not set, using in-memory checkpoints");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An unreachable database degrades to in-memory checkpoints instead of
/// stopping the server
#[cfg(feature = "mongodb")]
async fn connect_mongo(uri: &str, database: &str) -> Result<Arc<dyn PersistenceClient>> {
    match crate::dbs::MongoStore::connect(uri, database).await {
        Ok(store) => {
            tracing::info!(database = %database, "Using MongoDB checkpoints");
            Ok(Arc::new(store))
        }
        Err(e) => {
            tracing::warn!(error = %e, "MongoDB unavailable, using in-memory checkpoints");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongo(_uri: &str, _database: &str) -> Result<Arc<dyn PersistenceClient>> {
    tracing::warn!("MONGODB_URI set but the mongodb feature is disabled, using in-memory checkpoints");
    Ok(Arc::new(MemoryStore::new()))
}
