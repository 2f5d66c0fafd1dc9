use crate::node::{EventSender, Node, NodeType};
use crate::tools::ToolRegistry;
use crate::types::{LLMConfig, RunEvent, RunState};
use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use scout_llm::{
    ChatClient, ChatOptions, ChatRequest, EventStream, Message, StreamEvent, ToolCall, ToolChoice,
};
use scout_types::{MessageChunk, ToolCallChunk, FINISH_TOOL_CALLS};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Partial tool call assembled from streamed fragments
#[derive(Default)]
struct ToolCallBuffer {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

/// Model invocation: streams the reply as message chunks and appends the
/// assembled assistant message to the thread
pub struct ChatbotNode {
    client: Arc<dyn ChatClient>,
    tools: Arc<ToolRegistry>,
    llm_config: LLMConfig,
    system_prompt: String,
}

impl ChatbotNode {
    pub fn new(
        client: Arc<dyn ChatClient>,
        tools: Arc<ToolRegistry>,
        llm_config: LLMConfig,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            client,
            tools,
            llm_config,
            system_prompt: system_prompt.into(),
        }
    }

    fn build_request(&self, run: &RunState) -> ChatRequest {
        let mut messages = Vec::with_capacity(run.state.messages.len() + 1);
        if !self.system_prompt.is_empty() {
            messages.push(Message::system(self.system_prompt.clone()));
        }
        messages.extend(run.state.messages.iter().cloned());

        let mut options = ChatOptions::new();
        if !self.tools.is_empty() {
            options = options
                .tools(self.tools.definitions())
                .tool_choice(ToolChoice::Auto);
        }
        if let Some(temp) = self.llm_config.temperature {
            options = options.temperature(temp);
        }
        if let Some(max_tokens) = self.llm_config.max_tokens {
            options = options.max_tokens(max_tokens);
        }

        ChatRequest::new(self.llm_config.model.clone(), messages).with_options(options)
    }

    /// Forward provider events as chunks and accumulate the full message
    async fn process_stream(
        &self,
        mut stream: EventStream,
        run: &RunState,
        events: &EventSender,
    ) -> Result<Message> {
        let message_id = format!("run-{}", uuid::Uuid::new_v4());
        let metadata = run.metadata(NodeType::Chatbot);
        let emit = |chunk: MessageChunk| RunEvent::Message {
            chunk: chunk.with_id(message_id.clone()),
            metadata: metadata.clone(),
        };

        let mut content = String::new();
        let mut buffers: BTreeMap<u32, ToolCallBuffer> = BTreeMap::new();
        let mut finish_reason: Option<String> = None;

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::Message { content: fragment } => {
                    content.push_str(&fragment);
                    events.send(emit(MessageChunk::ai_text(fragment))).await;
                }
                StreamEvent::ToolCall {
                    index,
                    id,
                    name,
                    arguments,
                } => {
                    let buffer = buffers.entry(index).or_default();
                    if id.is_some() {
                        buffer.id.clone_from(&id);
                    }
                    if name.is_some() {
                        buffer.name.clone_from(&name);
                    }
                    let arguments = arguments.unwrap_or_default();
                    buffer.arguments.push_str(&arguments);

                    let fragment = ToolCallChunk {
                        index: Some(index),
                        id,
                        name,
                        args: arguments,
                    };
                    events.send(emit(MessageChunk::ai_tool_call(fragment))).await;
                }
                StreamEvent::Done {
                    finish_reason: reason,
                } => {
                    if finish_reason.is_none() {
                        finish_reason = reason;
                    }
                }
            }
        }

        let tool_calls: Vec<ToolCall> = buffers
            .into_iter()
            .filter_map(|(index, buffer)| match buffer.name {
                Some(name) => {
                    let id = buffer
                        .id
                        .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple()));
                    Some(ToolCall::new(id, name, buffer.arguments))
                }
                None => {
                    tracing::warn!(index, "Dropping streamed tool call without a name");
                    None
                }
            })
            .collect();

        let finish_reason = finish_reason.unwrap_or_else(|| {
            let reason = if tool_calls.is_empty() { "stop" } else { FINISH_TOOL_CALLS };
            reason.to_string()
        });
        events.send(emit(MessageChunk::ai_finish(finish_reason))).await;

        Ok(Message::ai_with_tools(content, tool_calls))
    }
}

#[async_trait]
impl Node for ChatbotNode {
    async fn execute(&self, run: &mut RunState, events: &EventSender) -> Result<()> {
        let request = self.build_request(run);
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Invoking model"
        );

        let stream = self.client.chat_stream(request).await?;
        let message = self.process_stream(stream, run, events).await?;

        tracing::debug!(tool_calls = message.tool_calls().len(), "Model turn complete");
        run.state.add_message(message);
        Ok(())
    }

    fn node_type(&self) -> NodeType {
        NodeType::Chatbot
    }
}
