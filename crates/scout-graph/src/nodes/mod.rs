pub mod chatbot_node;
pub mod tool_node;

pub use chatbot_node::ChatbotNode;
pub use tool_node::ToolNode;
