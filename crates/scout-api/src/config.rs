use config::{builder::DefaultState, Config as ConfigLoader, ConfigBuilder, ConfigError, File};
use scout_graph::{GraphConfig, LLMConfig, DEFAULT_MODEL};
use serde::Deserialize;
use std::time::Duration;

/// Environment variable prefixes and the section each one overrides
const ENV_SECTIONS: &[(&str, &str)] = &[
    ("SERVER_", "server"),
    ("LLM_", "llm"),
    ("GRAPH_", "graph"),
    ("LOG_", "logging"),
    ("PERSIST_", "persist"),
    ("DATA_", "data"),
];

/// Provider-style names still honoured for the model settings
const ENV_ALIASES: &[(&str, &str)] = &[
    ("GROQ_MODEL", "llm.model"),
    ("GROQ_TEMPERATURE", "llm.temperature"),
    ("SUPABASE_URL", "data.url"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub persist: PersistConfig,
    #[serde(default)]
    pub data: DataConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub groq_api_key: String,
    #[serde(default)]
    pub mongodb_uri: Option<String>,
    #[serde(default)]
    pub supabase_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on producing response headers; streams are not cut
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    300
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    /// Overrides the provider endpoint (Groq by default)
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            base_url: None,
            timeout_secs: 30,
            max_tokens: None,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl From<&LlmConfig> for LLMConfig {
    fn from(config: &LlmConfig) -> Self {
        let llm = LLMConfig::new(config.model.clone()).with_temperature(config.temperature);
        match config.max_tokens {
            Some(tokens) => llm.with_max_tokens(tokens),
            None => llm,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistConfig {
    pub database: String,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            database: scout_persist::DEFAULT_DATABASE.to_string(),
        }
    }
}

/// Source behind the `query_db` tool; the tool is off without a URL
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub url: Option<String>,
    pub max_rows: usize,
    pub timeout_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_rows: 50,
            timeout_secs: 30,
        }
    }
}

impl DataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (SERVER_, LLM_, GRAPH_, LOG_, PERSIST_, DATA_ prefixes)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));
        let builder = apply_env_overrides(builder, std::env::vars())?;

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets from ENV (not in TOML)
        cfg.groq_api_key = std::env::var("GROQ_API_KEY").map_err(|_| {
            ConfigError::Message(
                "GROQ_API_KEY is not set. Please set the GROQ_API_KEY environment variable."
                    .to_string(),
            )
        })?;
        cfg.mongodb_uri = std::env::var("MONGODB_URI")
            .ok()
            .filter(|uri| !uri.trim().is_empty());
        cfg.supabase_key = std::env::var("SUPABASE_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        cfg.data.url = cfg.data.url.filter(|url| !url.trim().is_empty());

        Ok(cfg)
    }
}

/// Map `LLM_MAX_TOKENS=512` onto `llm.max_tokens`, and so on per prefix
fn apply_env_overrides(
    mut builder: ConfigBuilder<DefaultState>,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (key, value) in vars {
        if let Some((_, path)) = ENV_ALIASES.iter().find(|(alias, _)| *alias == key) {
            builder = builder.set_override(*path, value)?;
            continue;
        }
        for (prefix, section) in ENV_SECTIONS {
            if let Some(field) = key.strip_prefix(prefix).filter(|f| !f.is_empty()) {
                let path = format!("{}.{}", section, field.to_lowercase());
                builder = builder.set_override(path, value.clone())?;
            }
        }
    }
    Ok(builder)
}
