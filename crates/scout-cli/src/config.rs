use config::{Config as ConfigLoader, ConfigError, Environment, Map};
use scout_client::{ArgumentMode, ClientConfig, DEFAULT_SERVER_URL};
use scout_types::DEFAULT_ASSISTANT_ID;
use serde::Deserialize;
use std::time::Duration;

/// Server URL variable shared with other LangGraph-style clients
pub const LEGACY_SERVER_URL_VAR: &str = "LANGGRAPH_SERVER_URL";

/// CLI settings, read from `SCOUT_*` environment variables
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CliConfig {
    pub server_url: String,
    pub assistant_id: String,
    pub user_id: String,
    pub create_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub stream_timeout_secs: u64,
    pub argument_mode: ArgumentMode,
    pub log_level: String,
}

impl CliConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let vars: Map<String, String> = std::env::vars().collect();
        Self::from_vars(vars)
    }

    /// `SCOUT_SERVER_URL` wins over `LANGGRAPH_SERVER_URL`, which wins over the default
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, ConfigError> {
        let server_url = vars
            .get(LEGACY_SERVER_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        ConfigLoader::builder()
            .set_default("server_url", server_url)?
            .set_default("assistant_id", DEFAULT_ASSISTANT_ID)?
            .set_default("user_id", "scout-cli")?
            .set_default("create_timeout_secs", 120)?
            .set_default("request_timeout_secs", 30)?
            .set_default("stream_timeout_secs", 60)?
            .set_default("argument_mode", "accumulate")?
            .set_default("log_level", "warn")?
            .add_source(
                Environment::with_prefix("SCOUT")
                    .try_parsing(true)
                    .source(Some(vars)),
            )
            .build()?
            .try_deserialize()
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            assistant_id: self.assistant_id.clone(),
            create_timeout: Duration::from_secs(self.create_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            stream_timeout: Duration::from_secs(self.stream_timeout_secs),
            ..ClientConfig::new(self.server_url.clone())
        }
    }
}
