use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Runtime configuration, read once at startup. Any parse failure here is
/// fatal; the process must not serve traffic with a broken configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub llm: LlmSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    /// Backend base URL. Required; the factory rejects a provider without one.
    pub base_url: Option<String>,
    /// Model name. Required by the Ollama provider only.
    pub model: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    LlamaCpp,
    Ollama,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::LlamaCpp => "llamacpp",
            LlmProvider::Ollama => "ollama",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "llamacpp" => Ok(LlmProvider::LlamaCpp),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(SettingsError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("unknown LLM provider: {0}. Expected: llamacpp or ollama")]
    UnknownProvider(String),
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Ok(Self {
            server: ServerSettings {
                host: env_or("SERVER_HOST", "0.0.0.0"),
                port: parse_env("SERVER_PORT", 3000)?,
            },
            database: DatabaseSettings {
                url: env_or("DATABASE_URL", "sqlite:parley.db?mode=rwc"),
            },
            llm: LlmSettings {
                provider: env_or("LLM_PROVIDER", "llamacpp").parse()?,
                base_url: std::env::var("LLM_BASE_URL").ok().filter(|v| !v.is_empty()),
                model: std::env::var("LLM_MODEL").ok().filter(|v| !v.is_empty()),
                timeout: Duration::from_millis(parse_env("LLM_TIMEOUT_MS", 12_000)?),
                max_retries: parse_env("LLM_MAX_RETRIES", 2)?,
                retry_base_delay: Duration::from_millis(parse_env(
                    "LLM_RETRY_BASE_DELAY_MS",
                    1_000,
                )?),
            },
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(name: &'static str, default: T) -> Result<T, SettingsError> {
    match std::env::var(name) {
        Ok(value) => value.parse().map_err(|_| SettingsError::InvalidValue {
            name,
            value: value.clone(),
        }),
        Err(_) => Ok(default),
    }
}
