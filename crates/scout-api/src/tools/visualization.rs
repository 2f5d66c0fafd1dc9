use anyhow::{bail, Result};
use async_trait::async_trait;
use scout_graph::{Tool, ToolOutput};
use serde_json::{json, Map, Value};

/// Validates a Plotly-style `{data, layout}` figure and stores it as the
/// thread's chart
pub struct GenerateVisualization;

#[async_trait]
impl Tool for GenerateVisualization {
    fn name(&self) -> &str {
        "generate_visualization"
    }

    fn description(&self) -> &str {
        "Render a chart for the user. Pass a Plotly figure: `data` is a list of traces, \
         `layout` holds titles and axes."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "data": {
                    "type": "array",
                    "items": {"type": "object"},
                    "description": "Plotly traces, e.g. [{\"type\": \"bar\", \"x\": [...], \"y\": [...]}]"
                },
                "layout": {
                    "type": "object",
                    "description": "Plotly layout (title, axis labels)"
                }
            },
            "required": ["data"]
        })
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput> {
        let Some(traces) = arguments.get("data").and_then(Value::as_array) else {
            bail!("'data' must be a list of traces");
        };
        if traces.is_empty() {
            bail!("'data' must contain at least one trace");
        }
        if let Some(position) = traces.iter().position(|trace| !trace.is_object()) {
            bail!("trace {} is not an object", position);
        }

        let layout = match arguments.get("layout") {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(layout @ Value::Object(_)) => layout.clone(),
            Some(_) => bail!("'layout' must be an object"),
        };

        let chart = json!({ "data": traces, "layout": layout });
        let title = layout
            .pointer("/title/text")
            .or_else(|| layout.get("title"))
            .and_then(Value::as_str);

        let summary = match title {
            Some(title) => format!("Chart '{}' generated with {} trace(s).", title, traces.len()),
            None => format!("Chart generated with {} trace(s).", traces.len()),
        };

        Ok(ToolOutput::text(summary).with_chart(chart.to_string()))
    }
}
