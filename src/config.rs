//! Runtime settings for a [`ShopSystem`](crate::lifecycle::ShopSystem).
//!
//! Every field has a default, so an empty TOML document is a valid configuration:
//!
//! ```toml
//! actor_buffer = 32
//! order_cache_ttl_secs = 600
//! cart_ttl_secs = 86400
//! token_ttl_secs = 600
//! cache_sweep_secs = 60
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.message().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Mailbox capacity of each actor.
    pub actor_buffer: usize,
    /// Lifetime of an `order:<id>` snapshot.
    pub order_cache_ttl_secs: u64,
    /// Idle lifetime of a cart, refreshed on every write.
    pub cart_ttl_secs: u64,
    /// Lifetime of a token issued at login.
    pub token_ttl_secs: u64,
    /// Period of the background sweep that drops expired cache entries.
    pub cache_sweep_secs: u64,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            actor_buffer: 32,
            order_cache_ttl_secs: 600,
            cart_ttl_secs: 24 * 60 * 60,
            token_ttl_secs: 10 * 60,
            cache_sweep_secs: 60,
        }
    }
}

impl ShopConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: ShopConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.actor_buffer == 0 {
            return Err(ConfigError::Validation(
                "actor_buffer must be at least 1".into(),
            ));
        }
        if self.order_cache_ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "order_cache_ttl_secs must be positive".into(),
            ));
        }
        if self.cart_ttl_secs == 0 {
            return Err(ConfigError::Validation("cart_ttl_secs must be positive".into()));
        }
        if self.token_ttl_secs == 0 {
            return Err(ConfigError::Validation("token_ttl_secs must be positive".into()));
        }
        if self.cache_sweep_secs == 0 {
            return Err(ConfigError::Validation(
                "cache_sweep_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn order_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.order_cache_ttl_secs)
    }

    pub fn cart_ttl(&self) -> Duration {
        Duration::from_secs(self.cart_ttl_secs)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        i64::try_from(self.token_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_secs)
    }
}
