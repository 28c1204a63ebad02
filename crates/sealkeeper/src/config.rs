//! Configuration loading and validation for the sealkeeper binary.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::keys::identity;

/// Validated sealkeeper configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// MongoDB connection string. **Required.**
    pub mongodb_uri: String,

    /// Database name. Falls back to the URI's default database.
    #[serde(default)]
    pub mongodb_database: Option<String>,

    /// Collection holding the seed record.
    #[serde(default = "default_keys_collection")]
    pub keys_collection: String,

    /// Collection holding sealed account secrets.
    #[serde(default = "default_accounts_collection")]
    pub accounts_collection: String,

    /// Stable per-deployment identifier mixed into the HMAC key. **Required.**
    pub deployment_id: String,

    /// Machine identifier to use instead of the host MAC address.
    #[serde(default)]
    pub machine_id: Option<String>,

    /// User whose sealed secret is checked at startup.
    #[serde(default)]
    pub account_user: Option<String>,

    /// Secret to seal for `account_user` if none is stored yet.
    #[serde(default)]
    pub account_secret: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_keys_collection() -> String {
    "cryptokeys".into()
}
fn default_accounts_collection() -> String {
    "accounts".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The URI may carry credentials and the account secret is plaintext.
        f.debug_struct("Config")
            .field("mongodb_uri", &"[REDACTED]")
            .field("mongodb_database", &self.mongodb_database)
            .field("keys_collection", &self.keys_collection)
            .field("accounts_collection", &self.accounts_collection)
            .field("deployment_id", &self.deployment_id)
            .field("machine_id", &self.machine_id)
            .field("account_user", &self.account_user)
            .field("account_secret", &self.account_secret.as_ref().map(|_| "[REDACTED]"))
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.mongodb_uri, "MONGODB_URI")?;
        ensure_non_empty(&self.deployment_id, "DEPLOYMENT_ID")?;
        ensure_non_empty(&self.keys_collection, "KEYS_COLLECTION")?;
        ensure_non_empty(&self.accounts_collection, "ACCOUNTS_COLLECTION")?;

        if let Some(id) = &self.machine_id {
            if identity::normalize(id).is_empty() {
                anyhow::bail!("MACHINE_ID must not be empty when set");
            }
        }
        if self.account_secret.is_some() && self.account_user.is_none() {
            anyhow::bail!("ACCOUNT_SECRET requires ACCOUNT_USER");
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
