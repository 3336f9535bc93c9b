//! Configuration module - provider selection, endpoint and model

use anyhow::{anyhow, Result};
use std::sync::Arc;

/// Environment variable selecting the generation provider
pub const ENV_PROVIDER: &str = "POSTCRAFT_PROVIDER";

/// Environment variable for a custom API base URL
pub const ENV_BASE_URL: &str = "POSTCRAFT_BASE_URL";

/// Environment variable for the model identifier
pub const ENV_MODEL: &str = "POSTCRAFT_MODEL";

/// Default models per provider
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-haiku-latest";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Default base URLs per provider
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_CLAUDE_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// HTTP client timeout applied by the transports
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Generation service provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    /// OpenAI chat completions (default)
    #[default]
    OpenAI,
    /// Anthropic messages API
    Claude,
    /// Google Gemini generateContent
    Gemini,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Claude => write!(f, "claude"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

impl Provider {
    /// Parse from environment variable string, unknown values fall back to OpenAI
    pub fn from_env_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "claude" | "anthropic" => Self::Claude,
            "gemini" | "google" => Self::Gemini,
            _ => Self::OpenAI,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAI => DEFAULT_OPENAI_MODEL,
            Self::Claude => DEFAULT_CLAUDE_MODEL,
            Self::Gemini => DEFAULT_GEMINI_MODEL,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAI => DEFAULT_OPENAI_BASE_URL,
            Self::Claude => DEFAULT_CLAUDE_BASE_URL,
            Self::Gemini => DEFAULT_GEMINI_BASE_URL,
        }
    }
}

/// Optional configuration parameters for Config::new()
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    pub provider: Option<Provider>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ConfigOptions {
    /// Read options from the environment; unset or blank variables stay `None`
    pub fn from_env() -> Self {
        Self {
            provider: env_value(ENV_PROVIDER).map(|v| Provider::from_env_str(&v)),
            base_url: env_value(ENV_BASE_URL),
            model: env_value(ENV_MODEL),
            timeout_secs: None,
        }
    }

    /// Fill every field that is `None` here from `fallback`
    pub fn or(self, fallback: ConfigOptions) -> Self {
        Self {
            provider: self.provider.or(fallback.provider),
            base_url: self.base_url.or(fallback.base_url),
            model: self.model.or(fallback.model),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
        }
    }
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Create a new Config, filling unset options with per-provider defaults
    pub fn new(options: ConfigOptions) -> Result<Arc<Self>> {
        let provider = options.provider.unwrap_or_default();

        let base_url = match options.base_url {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => provider.default_base_url().to_string(),
        };

        // Remove trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(anyhow!(
                "base_url must start with http:// or https://, got '{}'",
                base_url
            ));
        }

        let model = match options.model {
            Some(model) if !model.trim().is_empty() => model.trim().to_string(),
            _ => provider.default_model().to_string(),
        };

        let timeout_secs = options.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be greater than zero"));
        }

        Ok(Arc::new(Self {
            provider,
            base_url,
            model,
            timeout_secs,
        }))
    }

    /// Create a Config from environment variables only
    pub fn from_env() -> Result<Arc<Self>> {
        Self::new(ConfigOptions::from_env())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
