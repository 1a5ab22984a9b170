use std::env;
use std::net::IpAddr;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_SUMMARY_MODEL: &str = "llama3";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// `init_config` was called after the global configuration was already installed.
    #[error("Configuration already initialized")]
    AlreadyInitialized,
}

/// Runtime configuration for the student API server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP listener binds to.
    pub server_host: IpAddr,
    /// Port the HTTP listener binds to.
    pub server_port: u16,
    /// Base URL of the Ollama-compatible generation service.
    pub ollama_url: String,
    /// Model identifier forwarded with every summary request.
    pub summary_model: String,
    /// Optional upper bound on a single summary request; `None` keeps the transport default.
    pub summary_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: IpAddr::from([0, 0, 0, 0]),
            server_port: DEFAULT_SERVER_PORT,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
            summary_timeout: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults for unset keys.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let load = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();
        Ok(Self {
            server_host: parse_optional(&load, "SERVER_HOST")?.unwrap_or(defaults.server_host),
            server_port: parse_optional(&load, "SERVER_PORT")?.unwrap_or(defaults.server_port),
            ollama_url: load("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            summary_model: load("SUMMARY_MODEL").unwrap_or(defaults.summary_model),
            summary_timeout: parse_optional::<u64>(&load, "SUMMARY_TIMEOUT_SECS")?
                .map(Duration::from_secs),
        })
    }
}

fn parse_optional<T: std::str::FromStr>(
    load: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    load(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, falling back to defaults when `init_config` never ran.
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

/// Load configuration from the environment and install it in the global cache.
///
/// Callers that rely on a `.env` file load it with `dotenvy` first. The `adjust` hook lets the
/// binary layer apply command-line overrides before the value is frozen.
pub fn init_config(adjust: impl FnOnce(&mut Config)) -> Result<&'static Config, ConfigError> {
    let mut config = Config::from_env()?;
    adjust(&mut config);
    tracing::debug!(
        server_host = %config.server_host,
        server_port = config.server_port,
        ollama_url = %config.ollama_url,
        summary_model = %config.summary_model,
        summary_timeout = ?config.summary_timeout,
        "Loaded configuration"
    );
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    Ok(get_config())
}
