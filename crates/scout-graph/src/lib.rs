pub mod builder;
pub mod error;
pub mod graph;
pub mod node;
pub mod nodes;
pub mod router;
pub mod tools;
pub mod types;

pub use builder::GraphBuilder;
pub use error::{GraphError, Result};
pub use graph::{AgentState, Graph};
pub use node::{EventSender, Node, NodeType};
pub use router::{NextNode, Router, SimpleRouter};
pub use tools::{Tool, ToolOutput, ToolRegistry};
pub use types::{GraphConfig, LLMConfig, RunEvent, RunState, DEFAULT_MAX_HOPS, DEFAULT_MODEL};
