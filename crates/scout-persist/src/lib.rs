pub mod builder;
#[cfg(feature = "mongodb")]
pub mod dbs;
pub mod error;
pub mod memory;
pub mod trait_client;

pub use builder::{StoreBuilder, DEFAULT_DATABASE};
#[cfg(feature = "mongodb")]
pub use dbs::MongoStore;
pub use error::{PersistError, Result};
pub use memory::MemoryStore;
pub use trait_client::{Checkpointer, PersistenceClient, ThreadStore};
