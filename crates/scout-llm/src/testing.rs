//! Scripted chat client for tests and offline demos
//!
//! Replays a fixed sequence of responses, one per model call, and records the
//! requests it received.

use crate::streaming::StreamEvent;
use crate::traits::{ChatClient, ChatRequest, ChatResponse, EventStream};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

pub enum ScriptedTurn {
    Respond(ChatResponse),
    Fail(String),
}

pub struct ScriptedChatClient {
    turns: Mutex<VecDeque<ScriptedTurn>>,
    requests: Mutex<Vec<ChatRequest>>,
    /// Fallback once the script runs out; `None` means error
    repeat_last: Option<ChatResponse>,
}

impl ScriptedChatClient {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            turns: Mutex::new(responses.into_iter().map(ScriptedTurn::Respond).collect()),
            requests: Mutex::new(Vec::new()),
            repeat_last: None,
        }
    }

    pub fn from_turns(turns: Vec<ScriptedTurn>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            requests: Mutex::new(Vec::new()),
            repeat_last: None,
        }
    }

    /// Answer every call with the same response (e.g. a model stuck calling tools)
    pub fn repeating(response: ChatResponse) -> Self {
        Self {
            turns: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            repeat_last: Some(response),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn next_turn(&self, request: ChatRequest) -> Result<ChatResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let turn = self
            .turns
            .lock()
            .map_err(|_| anyhow!("scripted client poisoned"))?
            .pop_front();

        match turn {
            Some(ScriptedTurn::Respond(response)) => Ok(response),
            Some(ScriptedTurn::Fail(message)) => Err(anyhow!(message)),
            None => self
                .repeat_last
                .clone()
                .ok_or_else(|| anyhow!("scripted client has no more responses")),
        }
    }

    /// Split a response into the events a streaming provider would send
    fn to_events(response: ChatResponse) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        if let Some(content) = response.content.filter(|c| !c.is_empty()) {
            events.push(StreamEvent::Message { content });
        }

        for (index, call) in response.tool_calls.into_iter().enumerate() {
            let index = index as u32;
            events.push(StreamEvent::ToolCall {
                index,
                id: Some(call.id),
                name: Some(call.function.name),
                arguments: None,
            });
            if !call.function.arguments.is_empty() {
                events.push(StreamEvent::ToolCall {
                    index,
                    id: None,
                    name: None,
                    arguments: Some(call.function.arguments),
                });
            }
        }

        events.push(StreamEvent::Done {
            finish_reason: response.finish_reason,
        });
        events
    }
}

#[async_trait]
impl ChatClient for ScriptedChatClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.next_turn(request)
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        let events = Self::to_events(self.next_turn(request)?);
        Ok(Box::pin(futures::stream::iter(events.into_iter().map(Ok))))
    }
}
