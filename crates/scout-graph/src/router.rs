use scout_types::ThreadState;

/// Decides where the loop goes after a model turn
pub trait Router: Send + Sync {
    fn next(&self, state: &ThreadState) -> NextNode;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextNode {
    Tools,
    Done,
}

/// Tools when the last message requests any, otherwise done
pub struct SimpleRouter;

impl Router for SimpleRouter {
    fn next(&self, state: &ThreadState) -> NextNode {
        if state.has_pending_tool_calls() {
            NextNode::Tools
        } else {
            NextNode::Done
        }
    }
}
