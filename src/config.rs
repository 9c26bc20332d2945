use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the gateway.
#[derive(Debug)]
pub struct Config {
    /// Directory where uploaded files are written.
    pub upload_dir: String,
    /// Base URL of the external AI service.
    pub ai_service_url: String,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: u64,
    /// Maximum number of documents processed concurrently in the background.
    pub processing_concurrency: usize,
    /// Optional request timeout for AI service calls, in seconds.
    ///
    /// The upstream contract defines no timeout; leaving this unset preserves
    /// that behavior. Setting it bounds how long a document can sit in
    /// `processing` when the AI service hangs.
    pub ai_service_timeout_secs: Option<u64>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of concurrent background processing attempts.
pub const DEFAULT_PROCESSING_CONCURRENCY: usize = 4;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            upload_dir: load_env("UPLOAD_DIR")?,
            ai_service_url: load_env("AI_SERVICE_URL")?,
            max_upload_bytes: load_env_optional("MAX_UPLOAD_BYTES")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("MAX_UPLOAD_BYTES".to_string()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            processing_concurrency: load_env_optional("PROCESSING_CONCURRENCY")
                .map(|value| {
                    value.parse().ok().filter(|n| *n > 0).ok_or_else(|| {
                        ConfigError::InvalidValue("PROCESSING_CONCURRENCY".to_string())
                    })
                })
                .transpose()?
                .unwrap_or(DEFAULT_PROCESSING_CONCURRENCY),
            ai_service_timeout_secs: load_env_optional("AI_SERVICE_TIMEOUT_SECS")
                .map(|value| {
                    value.parse().map_err(|_| {
                        ConfigError::InvalidValue("AI_SERVICE_TIMEOUT_SECS".to_string())
                    })
                })
                .transpose()?,
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        upload_dir = %config.upload_dir,
        ai_service_url = %config.ai_service_url,
        max_upload_bytes = config.max_upload_bytes,
        processing_concurrency = config.processing_concurrency,
        ai_service_timeout_secs = ?config.ai_service_timeout_secs,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
