use std::env;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sdk::DEFAULT_NOTARY_URL;
use crate::signing::SEED_HEX_LEN;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Settings a caller needs to build a [`crate::MinerSdk`]. The SDK never reads
/// the environment on its own; `from_env` is a convenience for binaries.
#[derive(Clone, Serialize, Deserialize)]
pub struct SdkConfig {
    pub signing_key_hex: String,
    pub notary_url: String,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            signing_key_hex: String::new(),
            notary_url: DEFAULT_NOTARY_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkConfig")
            .field("signing_key_hex", &"<redacted>")
            .field("notary_url", &self.notary_url)
            .finish()
    }
}

impl SdkConfig {
    pub fn new(signing_key_hex: &str, notary_url: &str) -> Self {
        Self {
            signing_key_hex: signing_key_hex.to_string(),
            notary_url: notary_url.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = SdkConfig::default();

        // Required configuration
        config.signing_key_hex = lookup("MINER_SK_HEX")
            .ok_or_else(|| ConfigError::MissingEnvVar("MINER_SK_HEX".to_string()))?;

        if let Some(val) = lookup("NOTARY_URL") {
            if val.trim().is_empty() {
                return Err(ConfigError::InvalidEnvVar("NOTARY_URL".to_string(), val));
            }
            config.notary_url = val;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing_key_hex.is_empty() {
            return Err(ConfigError::ValidationError("MINER_SK_HEX is required".to_string()));
        }

        if self.signing_key_hex.len() != SEED_HEX_LEN {
            return Err(ConfigError::ValidationError(format!(
                "MINER_SK_HEX must be {} characters",
                SEED_HEX_LEN
            )));
        }

        if !self.signing_key_hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::ValidationError("MINER_SK_HEX must be hex".to_string()));
        }

        if !(self.notary_url.starts_with("http://") || self.notary_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError("NOTARY_URL must be a valid HTTP URL".to_string()));
        }

        Ok(())
    }
}
