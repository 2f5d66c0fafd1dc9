use crate::config::Config;
use scout_graph::Graph;
use scout_persist::PersistenceClient;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Shared application state passed to all handlers
///
/// The Graph holds no per-thread state and is created once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn PersistenceClient>,
    pub graph: Arc<Graph>,
    pub runs: RunGuard,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn PersistenceClient>, graph: Graph) -> Self {
        Self {
            config: Arc::new(config),
            store,
            graph: Arc::new(graph),
            runs: RunGuard::default(),
        }
    }
}

/// Threads with a run in flight; at most one run per thread
#[derive(Clone, Default)]
pub struct RunGuard {
    active: Arc<Mutex<HashSet<String>>>,
}

impl RunGuard {
    /// `None` when the thread already has an active run
    pub fn try_acquire(&self, thread_id: &str) -> Option<RunPermit> {
        let mut active = self.active.lock().ok()?;
        if !active.insert(thread_id.to_string()) {
            return None;
        }
        Some(RunPermit {
            active: Arc::clone(&self.active),
            thread_id: thread_id.to_string(),
        })
    }

    pub fn is_active(&self, thread_id: &str) -> bool {
        self.active
            .lock()
            .map(|active| active.contains(thread_id))
            .unwrap_or(false)
    }
}

/// Releases the thread when dropped
pub struct RunPermit {
    active: Arc<Mutex<HashSet<String>>>,
    thread_id: String,
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        if let Ok(mut active) = self.active.lock() {
            active.remove(&self.thread_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_run_per_thread() {
        let guard = RunGuard::default();
        let permit = guard.try_acquire("t-1").unwrap();
        assert!(guard.try_acquire("t-1").is_none());
        assert!(guard.try_acquire("t-2").is_some());
        assert!(guard.is_active("t-1"));

        drop(permit);
        assert!(!guard.is_active("t-1"));
        assert!(guard.try_acquire("t-1").is_some());
    }
}
