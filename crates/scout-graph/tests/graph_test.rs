use async_trait::async_trait;
use scout_graph::{
    EventSender, Graph, GraphConfig, GraphError, RunEvent, Tool, ToolOutput, ToolRegistry,
};
use scout_llm::testing::{ScriptedChatClient, ScriptedTurn};
use scout_llm::{ChatResponse, Message, ToolCall};
use scout_persist::{Checkpointer, MemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

struct Lookup;

#[async_trait]
impl Tool for Lookup {
    fn name(&self) -> &str {
        "lookup"
    }

    fn description(&self) -> &str {
        "Look up a value by key"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"key": {"type": "string"}},
            "required": ["key"],
        })
    }

    async fn call(&self, arguments: Value) -> anyhow::Result<ToolOutput> {
        Ok(ToolOutput::text(format!("value of {}", arguments["key"])))
    }
}

fn lookup_call(id: &str) -> ChatResponse {
    ChatResponse::with_tool_calls(vec![ToolCall::new(id, "lookup", r#"{"key":"a"}"#)])
}

fn graph(client: Arc<ScriptedChatClient>, store: Arc<MemoryStore>, config: GraphConfig) -> Graph {
    Graph::builder()
        .llm_client(client)
        .tool(Arc::new(Lookup))
        .checkpointer(store)
        .config(config)
        .build()
        .unwrap()
}

async fn collect(mut rx: tokio::sync::mpsc::Receiver<RunEvent>) -> Vec<RunEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_terminates_after_one_model_call_without_tools() {
    let client = Arc::new(ScriptedChatClient::new(vec![ChatResponse::text("Hi there")]));
    let store = Arc::new(MemoryStore::new());
    let graph = graph(client.clone(), store.clone(), GraphConfig::default());

    let events = collect(graph.spawn_run("t-1", vec![Message::human("Hi")])).await;

    assert_eq!(client.call_count(), 1);
    assert!(matches!(events.first(), Some(RunEvent::Metadata { thread_id, .. }) if thread_id == "t-1"));
    assert_eq!(events.last(), Some(&RunEvent::End));
    assert!(!events.iter().any(|e| matches!(e, RunEvent::Error { .. })));

    let state = store.load("t-1").await.unwrap();
    assert_eq!(state.messages, vec![Message::human("Hi"), Message::ai("Hi there")]);
}

#[tokio::test]
async fn test_tool_round_trip() {
    let client = Arc::new(ScriptedChatClient::new(vec![
        lookup_call("c1"),
        ChatResponse::text("a is 1"),
    ]));
    let store = Arc::new(MemoryStore::new());
    let graph = graph(client.clone(), store.clone(), GraphConfig::default());
    let (events, _rx) = EventSender::channel(100);

    let state = graph.run("t-1", vec![Message::human("what is a?")], &events).await.unwrap();

    let roles: Vec<&str> = state.messages.iter().map(Message::role).collect();
    assert_eq!(roles, vec!["human", "assistant", "tool", "assistant"]);
    assert_eq!(state.messages[2].content(), "value of \"a\"");

    // The second model call sees the tool result
    let second = &client.requests()[1];
    assert!(matches!(second.messages.last(), Some(Message::Tool { tool_call_id, .. }) if tool_call_id == "c1"));
    assert_eq!(second.options.tools.as_ref().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_hop_limit_aborts_run() {
    let client = Arc::new(ScriptedChatClient::repeating(lookup_call("loop")));
    let store = Arc::new(MemoryStore::new());
    let graph = graph(client.clone(), store.clone(), GraphConfig::new().with_max_hops(2));
    let (events, _rx) = EventSender::channel(100);

    let err = graph.run("t-1", vec![Message::human("go")], &events).await.unwrap_err();

    assert!(matches!(err, GraphError::RunAborted { max_hops: 2 }));
    assert_eq!(client.call_count(), 3);

    // The dangling call is answered so the thread stays usable
    let state = store.load("t-1").await.unwrap();
    assert!(!state.has_pending_tool_calls());
}

#[tokio::test]
async fn test_model_failure_reported_as_error_event() {
    let client = Arc::new(ScriptedChatClient::from_turns(vec![ScriptedTurn::Fail(
        "provider down".to_string(),
    )]));
    let graph = graph(client, Arc::new(MemoryStore::new()), GraphConfig::default());

    let events = collect(graph.spawn_run("t-1", vec![Message::human("Hi")])).await;

    let n = events.len();
    assert!(matches!(&events[n - 2], RunEvent::Error { message } if message.contains("provider down")));
    assert_eq!(events[n - 1], RunEvent::End);
}

#[tokio::test]
async fn test_history_carries_across_runs() {
    let client = Arc::new(ScriptedChatClient::new(vec![
        ChatResponse::text("first"),
        ChatResponse::text("second"),
    ]));
    let store = Arc::new(MemoryStore::new());
    let graph = graph(client.clone(), store.clone(), GraphConfig::default());
    let (events, _rx) = EventSender::channel(100);

    graph.run("t-1", vec![Message::human("one")], &events).await.unwrap();
    graph.run("t-1", vec![Message::human("two")], &events).await.unwrap();

    assert_eq!(client.requests()[1].messages.len(), 3);
    assert_eq!(store.load("t-1").await.unwrap().messages.len(), 4);
}

#[tokio::test]
async fn test_run_completes_after_receiver_dropped() {
    let client = Arc::new(ScriptedChatClient::new(vec![
        lookup_call("c1"),
        ChatResponse::text("done"),
    ]));
    let store = Arc::new(MemoryStore::new());
    let graph = graph(client, store.clone(), GraphConfig::default());

    drop(graph.spawn_run("t-1", vec![Message::human("Hi")]));

    let mut messages = 0;
    for _ in 0..100 {
        messages = store.load("t-1").await.unwrap().messages.len();
        if messages == 4 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(messages, 4);
}
