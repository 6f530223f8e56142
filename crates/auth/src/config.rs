//! Authorization instance configuration.

use serde::Deserialize;
use std::path::Path;

/// Default Argon2 time cost.
pub const DEFAULT_COST: u32 = 8;

/// Options for one authorization instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Password hashing work factor (Argon2 time cost).
    pub cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl AuthConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cost == 0 {
            return Err(ConfigError::Invalid("cost must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
