use std::sync::Arc;

use anyhow::{anyhow, Result};
use scout_llm::ChatClient;
use scout_persist::{Checkpointer, MemoryStore};

use crate::graph::Graph;
use crate::tools::{Tool, ToolRegistry};
use crate::types::{GraphConfig, LLMConfig};

/// Builder for constructing a Graph with optional components
pub struct GraphBuilder {
    llm_client: Option<Arc<dyn ChatClient>>,
    tools: ToolRegistry,
    checkpointer: Option<Arc<dyn Checkpointer>>,
    llm_config: LLMConfig,
    config: GraphConfig,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            llm_client: None,
            tools: ToolRegistry::new(),
            checkpointer: None,
            llm_config: LLMConfig::default(),
            config: GraphConfig::default(),
        }
    }

    /// Set the LLM client
    pub fn llm_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.llm_client = Some(client);
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools = self.tools.register(tool);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Defaults to an in-memory store
    pub fn checkpointer(mut self, checkpointer: Arc<dyn Checkpointer>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    pub fn llm_config(mut self, config: LLMConfig) -> Self {
        self.llm_config = config;
        self
    }

    /// Set the graph configuration
    pub fn config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the Graph
    pub fn build(self) -> Result<Graph> {
        let llm_client = self
            .llm_client
            .ok_or_else(|| anyhow!("LLM client is required"))?;
        let checkpointer = self
            .checkpointer
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn Checkpointer>);

        Ok(Graph::new(
            llm_client,
            self.tools,
            checkpointer,
            self.llm_config,
            self.config,
        ))
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
