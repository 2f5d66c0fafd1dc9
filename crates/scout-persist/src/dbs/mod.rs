pub mod mongo;

pub use mongo::MongoStore;
