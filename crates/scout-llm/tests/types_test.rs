use scout_llm::{Message, Tool, ToolCall, ToolChoice};
use serde_json::json;

#[test]
fn test_message_roles() {
    assert_eq!(Message::system("You are helpful").role(), "system");
    assert_eq!(Message::human("Hello").role(), "human");
    assert_eq!(Message::ai("Hi there!").role(), "assistant");
    assert_eq!(Message::tool_result("call_123", "42").role(), "tool");
}

#[test]
fn test_message_serialization_human() {
    let msg = Message::human("Hello");
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json, json!({"role": "human", "content": "Hello"}));
}

#[test]
fn test_message_deserialization_accepts_user_alias() {
    let msg: Message = serde_json::from_str(r#"{"role":"user","content":"Test"}"#).unwrap();
    assert_eq!(msg, Message::human("Test"));
}

#[test]
fn test_ai_message_without_tool_calls_omits_field() {
    let json = serde_json::to_value(Message::ai("Response")).unwrap();
    assert_eq!(json["role"], "assistant");
    assert!(json.get("tool_calls").is_none());
}

#[test]
fn test_ai_message_with_tool_calls_round_trips() {
    let msg = Message::ai_with_tools("", vec![ToolCall::new("call_1", "query_db", r#"{"q":1}"#)]);
    let json = serde_json::to_string(&msg).unwrap();
    let back: Message = serde_json::from_str(&json).unwrap();

    assert!(back.has_tool_calls());
    assert_eq!(back.tool_calls()[0].name(), "query_db");
    assert_eq!(back.tool_calls()[0].tool_type, "function");
}

#[test]
fn test_tool_error_flag_serialized_only_when_set() {
    let ok = serde_json::to_value(Message::tool_result("c1", "fine")).unwrap();
    assert!(ok.get("is_error").is_none());

    let err = serde_json::to_value(Message::tool_error("c1", "boom").with_tool_name("query_db")).unwrap();
    assert_eq!(err["is_error"], true);
    assert_eq!(err["name"], "query_db");
}

#[test]
fn test_tool_call_arguments() {
    let call = ToolCall::new("call_1", "query_db", r#"{"sql":"select 1"}"#);
    let args = call.arguments_value().unwrap();
    assert_eq!(args["sql"], "select 1");

    #[derive(serde::Deserialize)]
    struct Args {
        sql: String,
    }
    let parsed: Args = call.parse_arguments().unwrap();
    assert_eq!(parsed.sql, "select 1");
}

#[test]
fn test_blank_arguments_are_empty_object() {
    let call = ToolCall::new("call_1", "ping", "  ");
    assert_eq!(call.arguments_value().unwrap(), json!({}));
}

#[test]
fn test_invalid_arguments_error() {
    let call = ToolCall::new("call_1", "ping", "{not json");
    assert!(call.arguments_value().is_err());
}

#[test]
fn test_tool_definition_serialization() {
    let tool = Tool::new("query_db", "Run SQL", json!({"type": "object"}));
    let json = serde_json::to_value(&tool).unwrap();
    assert_eq!(json["type"], "function");
    assert_eq!(json["function"]["name"], "query_db");
    assert_eq!(json["function"]["description"], "Run SQL");
}

#[test]
fn test_tool_choice_serialization() {
    assert_eq!(serde_json::to_value(ToolChoice::Auto).unwrap(), json!("auto"));
    assert_eq!(serde_json::to_value(ToolChoice::None).unwrap(), json!("none"));
    assert_eq!(serde_json::to_value(ToolChoice::Required).unwrap(), json!("required"));
    assert_eq!(
        serde_json::to_value(ToolChoice::Function("query_db".into())).unwrap(),
        json!({"type": "function", "function": {"name": "query_db"}})
    );
}
