use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use scout_llm::{Tool as ToolDefinition, ToolCall};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// What a tool hands back to the agent loop
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    /// Text the model sees as the tool result
    pub content: String,
    /// Replacement chart artifact, if the tool produced one
    pub chart_json: Option<String>,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            chart_json: None,
        }
    }

    pub fn with_chart(mut self, chart_json: impl Into<String>) -> Self {
        self.chart_json = Some(chart_json.into());
        self
    }
}

/// A function the model may call
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object
    fn parameters(&self) -> Value;

    async fn call(&self, arguments: Value) -> Result<ToolOutput>;
}

/// Tool dispatch by name
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Definitions sent to the model with every request
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.parameters()))
            .collect()
    }

    pub async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput> {
        let name = call.name();
        let Some(tool) = self.tools.get(name) else {
            bail!("Unknown tool: {}", name);
        };

        let arguments = call
            .arguments_value()
            .with_context(|| format!("Invalid JSON arguments for {}", name))?;
        check_required(&tool.parameters(), &arguments)
            .with_context(|| format!("Invalid arguments for {}", name))?;

        tool.call(arguments).await
    }
}

fn check_required(schema: &Value, arguments: &Value) -> Result<()> {
    let Some(object) = arguments.as_object() else {
        bail!("arguments must be a JSON object");
    };

    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for field in required.iter().filter_map(Value::as_str) {
        if !object.contains_key(field) {
            bail!("missing required argument '{}'", field);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the text argument"
        }

        fn parameters(&self) -> Value {
            json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"],
            })
        }

        async fn call(&self, arguments: Value) -> Result<ToolOutput> {
            Ok(ToolOutput::text(arguments["text"].as_str().unwrap_or_default()))
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new().register(Arc::new(Echo))
    }

    #[tokio::test]
    async fn test_invoke_dispatches_by_name() {
        let output = registry()
            .invoke(&ToolCall::new("c1", "echo", r#"{"text":"hi"}"#))
            .await
            .unwrap();
        assert_eq!(output, ToolOutput::text("hi"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = registry()
            .invoke(&ToolCall::new("c1", "nope", "{}"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown tool: nope"));
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let registry = registry();

        let err = registry
            .invoke(&ToolCall::new("c1", "echo", "{not json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid JSON arguments"));

        let err = registry
            .invoke(&ToolCall::new("c1", "echo", "{}"))
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("missing required argument 'text'"));
    }

    #[test]
    fn test_definitions() {
        let defs = registry().definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name(), "echo");
    }
}
