use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";
pub const DEFAULT_MAX_HOPS: usize = 25;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Maximum CHATBOT -> TOOLS -> CHATBOT round trips per run
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
    #[serde(default)]
    pub system_prompt: String,
    /// Run the calls of one TOOLS step concurrently
    #[serde(default = "default_parallel_tools")]
    pub parallel_tools: bool,
}

fn default_max_hops() -> usize {
    DEFAULT_MAX_HOPS
}

fn default_parallel_tools() -> bool {
    true
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            system_prompt: String::new(),
            parallel_tools: true,
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_hops(mut self, max: usize) -> Self {
        self.max_hops = max;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_parallel_tools(mut self, enabled: bool) -> Self {
        self.parallel_tools = enabled;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LLMConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: Some(0.0),
            max_tokens: None,
        }
    }
}
