//! Server configuration: TOML file, then environment, then CLI flags.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Environment variable overriding [`ServerConfig::bind`].
pub const ENV_BIND: &str = "SQUARES_BIND";

/// Environment variable overriding [`ServerConfig::queue_capacity`].
pub const ENV_QUEUE_CAPACITY: &str = "SQUARES_QUEUE_CAPACITY";

/// Settings for one server process.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    bind: String,

    /// Depth of the shared inbound queue feeding the arbiter.
    #[serde(default = "default_queue_capacity")]
    queue_capacity: usize,

    /// Depth of each peer's outbound queue.
    #[serde(default = "default_outbox_capacity")]
    outbox_capacity: usize,

    /// Fixed RNG seed for client identifiers; random when absent.
    #[serde(default)]
    seed: Option<u64>,
}

fn default_bind() -> String {
    "127.0.0.1:7878".to_string()
}

fn default_queue_capacity() -> usize {
    256
}

fn default_outbox_capacity() -> usize {
    64
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            queue_capacity: default_queue_capacity(),
            outbox_capacity: default_outbox_capacity(),
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(bind = %config.bind, "Config loaded");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()
    }

    /// Applies [`ENV_BIND`] and [`ENV_QUEUE_CAPACITY`] when set.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(
            std::env::var(ENV_BIND).ok(),
            std::env::var(ENV_QUEUE_CAPACITY).ok(),
        )
    }

    fn with_overrides(
        mut self,
        bind: Option<String>,
        queue_capacity: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(bind) = bind {
            debug!(bind = %bind, "Bind address from environment");
            self.bind = bind;
        }
        if let Some(raw) = queue_capacity {
            self.queue_capacity = raw.trim().parse().map_err(|e| {
                ConfigError::new(format!(
                    "{} must be a positive integer: {}",
                    ENV_QUEUE_CAPACITY, e
                ))
            })?;
        }
        self.validate()
    }

    /// Replaces the bind address.
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    /// Replaces the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::new("queue_capacity must be at least 1".to_string()));
        }
        if self.outbox_capacity == 0 {
            return Err(ConfigError::new("outbox_capacity must be at least 1".to_string()));
        }
        Ok(self)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a configuration error at the caller's location.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
