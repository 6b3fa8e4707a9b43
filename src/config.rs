use crate::error::{AppError, Result};
use crate::llm::{self, ModelInfo, Provider};
use std::collections::BTreeMap;

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_MAX_TOKENS: u32 = 150;

const SETTING_KEYS: &[&str] = &[
    "LLM_PROVIDER",
    "GROQ_API_KEY",
    "GROQ_BASE_URL",
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "CLAUDE_API_KEY",
    "CLAUDE_BASE_URL",
    "OLLAMA_HOST",
    "SUMMARY_MODEL",
    "SUMMARY_MAX_TOKENS",
];

/// Process-wide settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: Provider,
    pub model: String,
    pub max_tokens: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require_key = |key: &str| {
            get(key).ok_or_else(|| {
                AppError::Configuration(format!("{} is not set (check your .env file)", key))
            })
        };

        let provider_name = get("LLM_PROVIDER").unwrap_or_else(|| "groq".to_string());
        let provider = match provider_name.to_lowercase().as_str() {
            "groq" => Provider::Groq(llm::openai::OpenAiConfig {
                api_key: require_key("GROQ_API_KEY")?,
                base_url: get("GROQ_BASE_URL").unwrap_or_else(|| llm::GROQ_BASE_URL.to_string()),
            }),
            "openai" => Provider::OpenAi(llm::openai::OpenAiConfig {
                api_key: require_key("OPENAI_API_KEY")?,
                base_url: get("OPENAI_BASE_URL")
                    .unwrap_or_else(|| llm::OPENAI_BASE_URL.to_string()),
            }),
            "claude" => Provider::Claude(llm::claude::ClaudeConfig {
                api_key: require_key("CLAUDE_API_KEY")?,
                base_url: get("CLAUDE_BASE_URL")
                    .unwrap_or_else(|| llm::CLAUDE_BASE_URL.to_string()),
            }),
            "ollama" => {
                Provider::ollama(get("OLLAMA_HOST").unwrap_or_else(|| llm::OLLAMA_HOST.to_string()))
            }
            other => {
                return Err(AppError::Configuration(format!(
                    "unknown LLM_PROVIDER '{}' (expected groq, openai, claude or ollama)",
                    other
                )))
            }
        };

        let model = get("SUMMARY_MODEL").unwrap_or_else(|| default_model(&provider).to_string());
        let max_tokens = match get("SUMMARY_MAX_TOKENS") {
            Some(raw) => raw.parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| {
                AppError::Configuration(format!(
                    "SUMMARY_MAX_TOKENS must be a positive integer, got '{}'",
                    raw
                ))
            })?,
            None => DEFAULT_MAX_TOKENS,
        };

        Ok(Self {
            provider,
            model,
            max_tokens,
        })
    }

    pub fn api_key(&self) -> Option<&str> {
        match &self.provider {
            Provider::Groq(c) | Provider::OpenAi(c) => Some(&c.api_key),
            Provider::Claude(c) => Some(&c.api_key),
            Provider::Ollama(_) => None,
        }
    }

    /// Settings as displayable key/value pairs with the credential masked.
    pub fn display_map(&self) -> BTreeMap<&'static str, String> {
        let mut map = BTreeMap::new();
        map.insert("provider", self.provider.name().to_string());
        map.insert("base_url", self.provider.base_url().to_string());
        map.insert("model", self.model.clone());
        map.insert("max_tokens", self.max_tokens.to_string());
        if let Some(key) = self.api_key() {
            map.insert("api_key", mask_api_key(key));
        }
        map
    }
}

/// The environment keys this crate reads.
pub fn setting_keys() -> &'static [&'static str] {
    SETTING_KEYS
}

pub fn mask_api_key(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "********".to_string()
    }
}

/// Model used when `SUMMARY_MODEL` is unset: the first listed for the provider.
pub fn default_model(provider: &Provider) -> &'static str {
    match provider {
        Provider::Groq(_) => DEFAULT_MODEL,
        Provider::OpenAi(_) => "gpt-4o",
        Provider::Claude(_) => "claude-sonnet-4-20250514",
        Provider::Ollama(_) => "llama3",
    }
}

pub fn available_models(settings: &Settings) -> Vec<ModelInfo> {
    let model = |id: &str, name: &str, provider: &str| ModelInfo {
        id: id.into(),
        name: name.into(),
        provider: provider.into(),
    };

    match settings.provider {
        Provider::Groq(_) => vec![
            model(DEFAULT_MODEL, "Llama 3.3 70B Versatile", "Groq"),
            model("llama-3.1-8b-instant", "Llama 3.1 8B Instant", "Groq"),
            model("gemma2-9b-it", "Gemma 2 9B", "Groq"),
        ],
        Provider::OpenAi(_) => vec![
            model("gpt-4o", "GPT-4o", "OpenAI"),
            model("gpt-4o-mini", "GPT-4o Mini", "OpenAI"),
            model("gpt-4.1", "GPT-4.1", "OpenAI"),
        ],
        Provider::Claude(_) => vec![
            model("claude-sonnet-4-20250514", "Claude Sonnet 4", "Anthropic"),
            model("claude-3-5-haiku-20241022", "Claude Haiku 3.5", "Anthropic"),
        ],
        Provider::Ollama(_) => vec![
            model("llama3", "Llama 3", "Ollama"),
            model("qwen2.5", "Qwen 2.5", "Ollama"),
        ],
    }
}
