use crate::error::{GraphError, Result};
use crate::node::{EventSender, Node};
use crate::nodes::{ChatbotNode, ToolNode};
use crate::router::{NextNode, Router, SimpleRouter};
use crate::tools::ToolRegistry;
use crate::types::{GraphConfig, LLMConfig, RunEvent, RunState};
use scout_llm::{ChatClient, Message};
use scout_persist::Checkpointer;
use scout_types::ThreadState;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

const EVENT_BUFFER: usize = 1000;

/// Position of the agent loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Chatbot,
    Route,
    Tools,
    Done,
}

/// Tool-calling agent: CHATBOT -> ROUTE -> (TOOLS -> CHATBOT)* -> DONE,
/// checkpointing the thread after every transition that changes it
#[derive(Clone)]
pub struct Graph {
    chatbot: Arc<ChatbotNode>,
    tools: Arc<ToolNode>,
    router: Arc<dyn Router>,
    checkpointer: Arc<dyn Checkpointer>,
    config: GraphConfig,
}

impl Graph {
    pub fn new(
        client: Arc<dyn ChatClient>,
        tools: ToolRegistry,
        checkpointer: Arc<dyn Checkpointer>,
        llm_config: LLMConfig,
        config: GraphConfig,
    ) -> Self {
        let tools = Arc::new(tools);
        Self {
            chatbot: Arc::new(ChatbotNode::new(
                client,
                Arc::clone(&tools),
                llm_config,
                config.system_prompt.clone(),
            )),
            tools: Arc::new(ToolNode::new(tools, config.parallel_tools)),
            router: Arc::new(SimpleRouter),
            checkpointer,
            config,
        }
    }

    /// Create a builder for fluent construction
    pub fn builder() -> crate::builder::GraphBuilder {
        crate::builder::GraphBuilder::new()
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Spawn execution in background, return event receiver.
    ///
    /// The run always ends with [`RunEvent::End`], preceded by
    /// [`RunEvent::Error`] when it failed. Dropping the receiver does not
    /// cancel the run.
    pub fn spawn_run(&self, thread_id: impl Into<String>, input: Vec<Message>) -> mpsc::Receiver<RunEvent> {
        let (events, rx) = EventSender::channel(EVENT_BUFFER);
        let graph = self.clone();
        let thread_id = thread_id.into();

        tokio::spawn(async move {
            if let Err(e) = graph.run(&thread_id, input, &events).await {
                events
                    .send(RunEvent::Error {
                        message: e.to_string(),
                    })
                    .await;
            }
            events.send(RunEvent::End).await;
        });

        rx
    }

    /// Run the agent loop to completion and return the final thread state
    pub async fn run(&self, thread_id: &str, input: Vec<Message>, events: &EventSender) -> Result<ThreadState> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let start = Instant::now();
        tracing::info!(run_id = %run_id, thread_id = %thread_id, "Run started");

        events
            .send(RunEvent::Metadata {
                run_id: run_id.clone(),
                thread_id: thread_id.to_string(),
            })
            .await;

        let state = self.checkpointer.load(thread_id).await.inspect_err(|e| {
            tracing::error!(thread_id = %thread_id, error = %e, "Failed to load checkpoint");
        })?;
        let mut run = RunState::new(run_id, thread_id, state);

        // An earlier run may have stopped between model and tools
        let closed = run.close_pending_tool_calls("Error: tool call was interrupted before it ran");
        if closed > 0 {
            tracing::warn!(thread_id = %thread_id, closed, "Closed interrupted tool calls");
        }
        for message in input {
            run.state.add_message(message);
        }
        self.checkpoint(&run, events).await?;

        let result = self.execute_loop(&mut run, events).await;

        match &result {
            Ok(()) => tracing::info!(
                run_id = %run.run_id,
                steps = run.step,
                duration_ms = start.elapsed().as_millis() as u64,
                "Run finished"
            ),
            Err(GraphError::RunAborted { max_hops }) => {
                tracing::warn!(run_id = %run.run_id, max_hops, "Run aborted");
                run.close_pending_tool_calls("Error: run aborted, tool hop limit reached");
                self.checkpoint(&run, events).await?;
            }
            Err(e) => tracing::error!(run_id = %run.run_id, error = %e, "Run failed"),
        }

        result.map(|()| run.state)
    }

    async fn execute_loop(&self, run: &mut RunState, events: &EventSender) -> Result<()> {
        let mut current = AgentState::Chatbot;
        let mut hops = 0;

        loop {
            tracing::debug!(state = ?current, step = run.step, "Agent transition");

            current = match current {
                AgentState::Chatbot => {
                    run.step += 1;
                    self.chatbot.execute(run, events).await.map_err(GraphError::Model)?;
                    self.checkpoint(run, events).await?;
                    AgentState::Route
                }
                AgentState::Route => match self.router.next(&run.state) {
                    NextNode::Done => AgentState::Done,
                    NextNode::Tools if hops >= self.config.max_hops => {
                        return Err(GraphError::RunAborted {
                            max_hops: self.config.max_hops,
                        });
                    }
                    NextNode::Tools => {
                        hops += 1;
                        AgentState::Tools
                    }
                },
                AgentState::Tools => {
                    run.step += 1;
                    self.tools.execute(run, events).await.map_err(GraphError::Tools)?;
                    self.checkpoint(run, events).await?;
                    AgentState::Chatbot
                }
                AgentState::Done => return Ok(()),
            };
        }
    }

    async fn checkpoint(&self, run: &RunState, events: &EventSender) -> Result<()> {
        let snapshot = self
            .checkpointer
            .save(&run.thread_id, run.state.clone())
            .await
            .inspect_err(|e| {
                tracing::error!(thread_id = %run.thread_id, error = %e, "Failed to save checkpoint");
            })?;
        events.send(RunEvent::Values(snapshot.values)).await;
        Ok(())
    }
}
