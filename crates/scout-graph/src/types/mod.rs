pub mod config;
pub mod events;
pub mod state;

pub use config::{GraphConfig, LLMConfig, DEFAULT_MAX_HOPS, DEFAULT_MODEL};
pub use events::RunEvent;
pub use state::RunState;
