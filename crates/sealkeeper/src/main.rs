//! `sealkeeper` — binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Connect to MongoDB.
//! 4. Provision the seed and derive the cipher keys. Any failure aborts.
//! 5. Verify or seal the configured account secret. A tampered secret aborts.

use anyhow::{Context, Result};
use tracing::info;

use sealkeeper::accounts::{self, AccountVault};
use sealkeeper::config::Config;
use sealkeeper::keys::{self, FixedIdentity, HostMac, IdentitySource};
use sealkeeper::store::mongo::{self, MongoAccountStore, MongoSeedStore};
use sealkeeper::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Logging is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(version = env!("CARGO_PKG_VERSION"), "sealkeeper starting");

    // -----------------------------------------------------------------------
    // 3. Persistence
    // -----------------------------------------------------------------------
    let db = mongo::connect(&cfg.mongodb_uri, cfg.mongodb_database.as_deref())
        .await
        .context("failed to connect to MongoDB")?;
    info!(database = %db.name(), "database connection ready");

    // -----------------------------------------------------------------------
    // 4. Key provisioning
    // -----------------------------------------------------------------------
    let identity: Box<dyn IdentitySource> = match &cfg.machine_id {
        Some(id) => Box::new(FixedIdentity::new(id)?),
        None => Box::new(HostMac),
    };
    let seeds = MongoSeedStore::new(&db, &cfg.keys_collection);
    let cipher = keys::provision(&seeds, identity.as_ref(), &cfg.deployment_id)
        .await
        .context("key provisioning failed")?;

    // -----------------------------------------------------------------------
    // 5. Account secret
    // -----------------------------------------------------------------------
    let Some(user) = cfg.account_user.as_deref() else {
        info!("ACCOUNT_USER not set; nothing to verify");
        return Ok(());
    };
    let vault = AccountVault::new(cipher, MongoAccountStore::new(&db, &cfg.accounts_collection));
    let status = accounts::sync_account(&vault, user, cfg.account_secret.as_deref())
        .await
        .context("account secret check failed")?;
    info!(?status, "startup complete");

    Ok(())
}
