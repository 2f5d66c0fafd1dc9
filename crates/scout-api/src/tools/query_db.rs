use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use scout_graph::{Tool, ToolOutput};
use serde_json::{json, Value};
use std::time::Duration;

/// Read-only table queries against a PostgREST endpoint (Supabase and the like)
pub struct QueryDb {
    http_client: reqwest::Client,
    base_url: String,
    max_rows: usize,
}

impl QueryDb {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        max_rows: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            headers.insert(
                "apikey",
                HeaderValue::from_str(&key).context("Invalid data source key format")?,
            );
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", key))
                    .context("Invalid data source key format")?,
            );
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_rows: max_rows.max(1),
        })
    }

    /// Query string for one call; filters use PostgREST operators (`eq.5`, `gt.10`)
    fn query_params(&self, arguments: &Value) -> Result<Vec<(String, String)>> {
        let select = match arguments.get("select") {
            None | Some(Value::Null) => "*",
            Some(Value::String(select)) if !select.trim().is_empty() => select.as_str(),
            Some(_) => bail!("'select' must be a non-empty string of columns"),
        };
        let mut params = vec![("select".to_string(), select.to_string())];

        match arguments.get("filters") {
            None | Some(Value::Null) => {}
            Some(Value::Object(filters)) => {
                for (column, condition) in filters {
                    let Some(condition) = condition.as_str() else {
                        bail!("filter on '{}' must be a string such as \"eq.5\"", column);
                    };
                    params.push((column.clone(), condition.to_string()));
                }
            }
            Some(_) => bail!("'filters' must be an object of column conditions"),
        }

        if let Some(order) = arguments.get("order").and_then(Value::as_str) {
            params.push(("order".to_string(), order.to_string()));
        }

        let limit = match arguments.get("limit") {
            None | Some(Value::Null) => self.max_rows,
            Some(limit) => limit
                .as_u64()
                .context("'limit' must be a positive integer")? as usize,
        };
        params.push(("limit".to_string(), limit.clamp(1, self.max_rows).to_string()));

        Ok(params)
    }
}

fn is_table_name(table: &str) -> bool {
    !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

#[async_trait]
impl Tool for QueryDb {
    fn name(&self) -> &str {
        "query_db"
    }

    fn description(&self) -> &str {
        "Read rows from a database table. Use it to preview data before answering \
         or charting. Filters take PostgREST conditions such as \"eq.active\" or \"gt.10\"."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "table": {"type": "string", "description": "Table or view name"},
                "select": {"type": "string", "description": "Comma-separated columns, default *"},
                "filters": {
                    "type": "object",
                    "additionalProperties": {"type": "string"},
                    "description": "Column to condition, e.g. {\"region\": \"eq.north\"}"
                },
                "order": {"type": "string", "description": "e.g. \"created_at.desc\""},
                "limit": {"type": "integer", "minimum": 1}
            },
            "required": ["table"]
        })
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput> {
        let table = arguments
            .get("table")
            .and_then(Value::as_str)
            .context("'table' must be a string")?;
        if !is_table_name(table) {
            bail!("'{}' is not a valid table name", table);
        }
        let params = self.query_params(&arguments)?;

        tracing::debug!(table = %table, params = ?params, "Querying data source");
        let response = self
            .http_client
            .get(format!("{}/rest/v1/{}", self.base_url, table))
            .query(&params)
            .send()
            .await
            .context("Data source request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Data source returned {}: {}", status.as_u16(), body);
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .context("Data source did not return a list of rows")?;

        Ok(ToolOutput::text(format!(
            "{} row(s) from {}:\n{}",
            rows.len(),
            table,
            Value::Array(rows)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn query_db(url: String) -> QueryDb {
        QueryDb::new(url, Some("anon-key".into()), 5, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_query_passes_filters_and_caps_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/sales")
            .match_header("apikey", "anon-key")
            .match_header("authorization", "Bearer anon-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "region,total".into()),
                Matcher::UrlEncoded("region".into(), "eq.north".into()),
                Matcher::UrlEncoded("limit".into(), "5".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(r#"[{"region":"north","total":10}]"#)
            .create_async()
            .await;

        let output = query_db(server.url())
            .call(json!({
                "table": "sales",
                "select": "region,total",
                "filters": {"region": "eq.north"},
                "limit": 500,
            }))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(output.content.starts_with("1 row(s) from sales:\n"));
        assert!(output.content.contains(r#""total":10"#));
        assert!(output.chart_json.is_none());
    }

    #[tokio::test]
    async fn test_error_status_becomes_tool_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/missing")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"message":"relation does not exist"}"#)
            .create_async()
            .await;

        let error = query_db(server.url())
            .call(json!({"table": "missing"}))
            .await
            .unwrap_err();
        assert!(error.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_rejects_bad_arguments() {
        let tool = query_db("http://127.0.0.1:9".into());
        for arguments in [
            json!({"table": "sales; drop table x"}),
            json!({"table": "sales", "filters": {"region": 1}}),
            json!({"table": "sales", "limit": -1}),
            json!({"table": 3}),
        ] {
            assert!(tool.call(arguments).await.is_err());
        }
    }

    #[test]
    fn test_defaults() {
        let params = query_db("http://localhost".into())
            .query_params(&json!({"table": "sales"}))
            .unwrap();
        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }
}
