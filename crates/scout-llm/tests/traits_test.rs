use futures::StreamExt;
use scout_llm::testing::{ScriptedChatClient, ScriptedTurn};
use scout_llm::{
    ChatClient, ChatOptions, ChatRequest, ChatResponse, Message, OpenAIClient, OpenAIConfig,
    StreamEvent, Tool, ToolCall, ToolChoice,
};
use serde_json::json;

#[test]
fn test_chat_request_with_options() {
    let options = ChatOptions::new()
        .temperature(0.0)
        .max_tokens(100)
        .tools(vec![Tool::new("test", "Test tool", json!({"type": "object"}))])
        .tool_choice(ToolChoice::Auto);

    let request = ChatRequest::new("llama", vec![Message::human("Hello")]).with_options(options);

    assert_eq!(request.model, "llama");
    assert_eq!(request.options.temperature, Some(0.0));
    assert_eq!(request.options.max_tokens, Some(100));
    assert_eq!(request.options.tools.as_ref().map(|t| t.len()), Some(1));
    assert_eq!(request.options.tool_choice, Some(ToolChoice::Auto));
}

#[test]
fn test_chat_response_into_message() {
    let msg = ChatResponse::with_tool_calls(vec![ToolCall::new("c1", "query_db", "{}")]).into_message();
    assert_eq!(msg.role(), "assistant");
    assert_eq!(msg.content(), "");
    assert!(msg.has_tool_calls());

    let msg = ChatResponse::text("done").into_message();
    assert_eq!(msg, Message::ai("done"));
}

#[tokio::test]
async fn test_scripted_client_streams_tool_call_fragments() {
    let client = ScriptedChatClient::new(vec![ChatResponse::with_tool_calls(vec![ToolCall::new(
        "call_1",
        "query_db",
        r#"{"q":1}"#,
    )])]);

    let events: Vec<StreamEvent> = client
        .chat_stream(ChatRequest::new("m", vec![Message::human("hi")]))
        .await
        .unwrap()
        .map(|e| e.unwrap())
        .collect()
        .await;

    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0], StreamEvent::ToolCall { name: Some(n), .. } if n == "query_db"));
    assert!(matches!(&events[1], StreamEvent::ToolCall { arguments: Some(a), .. } if a == r#"{"q":1}"#));
    assert_eq!(
        events[2],
        StreamEvent::Done { finish_reason: Some("tool_calls".into()) }
    );
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_scripted_client_exhausted_and_failures() {
    let client = ScriptedChatClient::from_turns(vec![ScriptedTurn::Fail("rate limited".into())]);
    let request = ChatRequest::new("m", vec![]);

    let err = client.chat(request.clone()).await.unwrap_err();
    assert!(err.to_string().contains("rate limited"));
    assert!(client.chat(request).await.is_err());
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn test_openai_client_streams_from_server() {
    let mut server = mockito::Server::new_async().await;
    let body = concat!(
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"Hi\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(mockito::Matcher::PartialJson(json!({"model": "llama", "stream": true})))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let client = OpenAIClient::new(OpenAIConfig::groq("test-key").with_base_url(server.url())).unwrap();
    let events: Vec<StreamEvent> = client
        .chat_stream(ChatRequest::new("llama", vec![Message::human("hi")]))
        .await
        .unwrap()
        .map(|e| e.unwrap())
        .collect()
        .await;

    mock.assert_async().await;
    assert_eq!(events[0], StreamEvent::Message { content: "Hi".into() });
    assert_eq!(events[1], StreamEvent::Done { finish_reason: Some("stop".into()) });
}

#[tokio::test]
async fn test_openai_client_chat_error_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body("invalid api key")
        .create_async()
        .await;

    let client = OpenAIClient::new(OpenAIConfig::groq("bad").with_base_url(server.url())).unwrap();
    let err = client
        .chat(ChatRequest::new("llama", vec![Message::human("hi")]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_openai_client_chat_parses_tool_calls() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_9",
                            "type": "function",
                            "function": {"name": "query_db", "arguments": "{\"q\":1}"}
                        }]
                    },
                    "finish_reason": "tool_calls"
                }],
                "usage": {"prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = OpenAIClient::new(OpenAIConfig::groq("k").with_base_url(server.url())).unwrap();
    let response = client
        .chat(ChatRequest::new("llama", vec![Message::human("hi")]))
        .await
        .unwrap();

    assert_eq!(response.finish_reason.as_deref(), Some("tool_calls"));
    assert_eq!(response.tool_calls[0].id, "call_9");
    assert_eq!(response.usage.unwrap().total_tokens, 7);
}
