//! Provider configuration

use std::time::Duration;

use bcc_common::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::schema::{Arguments, FieldSchema};
use crate::state::{get_optional_string_attr, DynamicValue};

pub const ENDPOINT_ENV: &str = "BASIS_API_ENDPOINT";
pub const TOKEN_ENV: &str = "BASIS_TOKEN";

/// Connection settings for the BCC management API
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the management API
    pub api_endpoint: String,

    /// Bearer token
    pub token: String,

    /// Per-request timeout
    pub request_timeout_secs: u64,

    /// Interval between lock polls
    pub lock_poll_interval_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_endpoint: String::new(),
            token: String::new(),
            request_timeout_secs: 30,
            lock_poll_interval_ms: 1000,
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_endpoint", &self.api_endpoint)
            .field("token", &"<redacted>")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("lock_poll_interval_ms", &self.lock_poll_interval_ms)
            .finish()
    }
}

impl ProviderConfig {
    /// Build from the provider configuration block, falling back to the environment
    pub fn from_value(value: &DynamicValue) -> Result<Self> {
        let lookup = |key: &str, env: &str| {
            get_optional_string_attr(value, key).or_else(|| std::env::var(env).ok().filter(|v| !v.is_empty()))
        };

        let mut config = Self {
            api_endpoint: lookup("api_endpoint", ENDPOINT_ENV).unwrap_or_default(),
            token: lookup("token", TOKEN_ENV).unwrap_or_default(),
            ..Self::default()
        };
        if let Some(secs) = value.get("request_timeout_secs").and_then(|v| v.as_i64()) {
            config.request_timeout_secs = secs.max(1) as u64;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_endpoint.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "api_endpoint must be set in the provider block or {}",
                ENDPOINT_ENV
            )));
        }
        if self.token.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "token must be set in the provider block or {}",
                TOKEN_ENV
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn lock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lock_poll_interval_ms)
    }
}

/// Schema of the provider configuration block
pub fn provider_schema() -> Arguments {
    Arguments::new()
        .with(
            "api_endpoint",
            FieldSchema::string()
                .optional()
                .description(format!("URL of the management API. Defaults to ${}", ENDPOINT_ENV)),
        )
        .with(
            "token",
            FieldSchema::string()
                .optional()
                .sensitive()
                .description(format!("API token. Defaults to ${}", TOKEN_ENV)),
        )
        .with(
            "request_timeout_secs",
            FieldSchema::int()
                .optional()
                .default_value(30)
                .description("timeout of a single API request"),
        )
}
