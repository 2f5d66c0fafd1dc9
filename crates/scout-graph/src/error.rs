use scout_persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Run aborted: tool hop limit ({max_hops}) exceeded")]
    RunAborted { max_hops: usize },

    #[error("Model call failed: {0:#}")]
    Model(#[source] anyhow::Error),

    #[error("Tool step failed: {0:#}")]
    Tools(#[source] anyhow::Error),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] PersistError),
}

pub type Result<T> = std::result::Result<T, GraphError>;
