use crate::node::{EventSender, Node, NodeType};
use crate::tools::{ToolOutput, ToolRegistry};
use crate::types::{RunEvent, RunState};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use scout_llm::{Message, ToolCall};
use scout_types::MessageChunk;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

/// Resolves every pending tool call into a tool result message.
/// Tool failures never fail the node; they become error results the model can read.
pub struct ToolNode {
    registry: Arc<ToolRegistry>,
    parallel: bool,
}

impl ToolNode {
    pub fn new(registry: Arc<ToolRegistry>, parallel: bool) -> Self {
        Self { registry, parallel }
    }

    async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput> {
        let start = Instant::now();
        // A panicking tool is reported like any other tool failure
        let outcome = AssertUnwindSafe(self.registry.invoke(call))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(anyhow!("tool panicked: {}", panic_message(&*panic))));
        let duration_ms = start.elapsed().as_millis() as u64;

        match &outcome {
            Ok(_) => tracing::debug!(tool = call.name(), duration_ms, "Tool succeeded"),
            Err(e) => {
                tracing::warn!(tool = call.name(), duration_ms, error = %format!("{:#}", e), "Tool failed")
            }
        }
        outcome
    }

    fn to_message(run: &mut RunState, call: &ToolCall, outcome: Result<ToolOutput>) -> Message {
        let output = match outcome {
            Ok(output) => output,
            Err(e) => {
                return Message::tool_error(&call.id, format!("Error: {:#}", e))
                    .with_tool_name(call.name())
            }
        };

        if let Some(chart_json) = output.chart_json {
            if let Err(e) = run.state.set_chart_json(chart_json) {
                tracing::warn!(tool = call.name(), error = %e, "Tool returned invalid chart JSON");
                return Message::tool_error(&call.id, format!("Error: invalid chart JSON: {}", e))
                    .with_tool_name(call.name());
            }
        }

        Message::tool_result(&call.id, output.content).with_tool_name(call.name())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[async_trait]
impl Node for ToolNode {
    async fn execute(&self, run: &mut RunState, events: &EventSender) -> Result<()> {
        let calls = run.state.pending_tool_calls();
        if calls.is_empty() {
            return Ok(());
        }

        let outcomes = if self.parallel {
            join_all(calls.iter().map(|call| self.invoke(call))).await
        } else {
            let mut outcomes = Vec::with_capacity(calls.len());
            for call in &calls {
                outcomes.push(self.invoke(call).await);
            }
            outcomes
        };

        // Results are appended in request order regardless of completion order
        let metadata = run.metadata(NodeType::Tools);
        for (call, outcome) in calls.iter().zip(outcomes) {
            let message = Self::to_message(run, call, outcome);
            events
                .send(RunEvent::Message {
                    chunk: MessageChunk::tool_message(&call.id, message.content()),
                    metadata: metadata.clone(),
                })
                .await;
            run.state.add_message(message);
        }

        Ok(())
    }

    fn node_type(&self) -> NodeType {
        NodeType::Tools
    }
}
