//! Storage and transfer configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Hard cap on a single upload (5 MiB), checked before any bytes are sent.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Default validity of a pre-signed download link (1 hour).
pub const DEFAULT_DOWNLOAD_TTL_SECS: u64 = 3600;

pub const DEFAULT_PROGRESS_STAGES: u32 = 5;
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub account_id: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "auto".to_string()
}

impl StorageConfig {
    /// Read the configuration from `R2_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse a JSON document, e.g. the contents of a config file.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: StorageConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        Ok(StorageConfig {
            account_id: required("R2_ACCOUNT_ID")?,
            bucket: required("R2_BUCKET_NAME")?,
            access_key_id: required("R2_ACCESS_KEY_ID")?,
            secret_access_key: required("R2_SECRET_ACCESS_KEY")?,
            endpoint_url: lookup("R2_ENDPOINT").filter(|v| !v.is_empty()),
            region: lookup("R2_REGION")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(default_region),
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.is_empty() {
            return Err(ConfigError::Missing("bucket"));
        }
        if self.access_key_id.is_empty() {
            return Err(ConfigError::Missing("access_key_id"));
        }
        if self.secret_access_key.is_empty() {
            return Err(ConfigError::Missing("secret_access_key"));
        }
        if self.account_id.is_empty() && self.endpoint_url.is_none() {
            return Err(ConfigError::Missing("account_id"));
        }
        Ok(())
    }

    /// Explicit endpoint if set, otherwise the account's R2 endpoint.
    pub fn endpoint(&self) -> String {
        match &self.endpoint_url {
            Some(url) => url.clone(),
            None => format!("https://{}.r2.cloudflarestorage.com", self.account_id),
        }
    }
}

/// Client-side limits and the cadence of the simulated progress display.
#[derive(Debug, Clone)]
pub struct TransferLimits {
    pub max_upload_bytes: u64,
    pub download_ttl_secs: u64,
    pub progress_stages: u32,
    pub progress_interval: Duration,
}

impl Default for TransferLimits {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_BYTES,
            download_ttl_secs: DEFAULT_DOWNLOAD_TTL_SECS,
            progress_stages: DEFAULT_PROGRESS_STAGES,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}
