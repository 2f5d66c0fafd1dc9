use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::types::{RunEvent, RunState};

/// Event channel towards the caller of a run
///
/// Sends never fail: once the receiver is dropped the run keeps going and
/// events are discarded.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<RunEvent>,
}

impl EventSender {
    pub fn new(tx: mpsc::Sender<RunEvent>) -> Self {
        Self { tx }
    }

    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<RunEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    pub async fn send(&self, event: RunEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::trace!("Run event receiver closed, dropping event");
        }
    }
}

/// One step of the agent loop
#[async_trait]
pub trait Node: Send + Sync {
    /// Execute the node's logic, modifying the run state and emitting events
    async fn execute(&self, run: &mut RunState, events: &EventSender) -> Result<()>;

    fn node_type(&self) -> NodeType;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Chatbot,
    Tools,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chatbot => "chatbot",
            Self::Tools => "tools",
        }
    }
}
