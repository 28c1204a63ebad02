//! Seed provisioning and key derivation.
//!
//! # Lifecycle
//!
//! 1. At startup, [`provision`] calls [`ensure_seed`], which returns the
//!    persisted seed pair or creates one through the store's atomic
//!    insert-if-absent.
//! 2. The machine identifier is read from an [`IdentitySource`] and combined
//!    with the seed and deployment identifier in [`derive_keys`].
//! 3. The derived keys are moved into a single [`AuthenticatedCipher`] that the
//!    rest of the process clones.
//!
//! # Security invariants
//!
//! - Seeds and derived keys are **never** logged or included in error messages.
//! - A seed is never regenerated while a record exists; a malformed record is a
//!   startup error, not a reason to start over.
//! - The cipher key is bound to the host's machine identifier. Moving the data
//!   to another host requires keeping that identifier stable (see
//!   [`FixedIdentity`]).

pub mod derive;
pub mod identity;
pub mod seed;

pub use derive::{derive_keys, DerivedKeys};
pub use identity::{FixedIdentity, HostMac, IdentitySource};

use common::{SeedRecord, VaultError};
use thiserror::Error;
use tracing::{info, warn};

use crate::crypto::AuthenticatedCipher;
use crate::store::{SeedStore, StoreError};

/// The seed pair from which operational keys are derived.
pub type KeySeed = SeedRecord;

/// Errors produced while provisioning keys. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The machine identifier could not be read.
    #[error("machine identity unavailable: {0}")]
    IdentityUnavailable(String),

    /// The seed store could not be read or written.
    #[error("seed persistence failed: {0}")]
    Persistence(#[from] StoreError),

    /// The stored seed record does not contain 32 bytes of hex in a field.
    #[error("stored seed field {0} is not 64 hex characters")]
    InvalidSeed(&'static str),
}

impl From<KeyError> for VaultError {
    fn from(e: KeyError) -> Self {
        match e {
            KeyError::IdentityUnavailable(msg) => VaultError::IdentityUnavailable(msg),
            KeyError::Persistence(e) => VaultError::PersistenceFailure(e.to_string()),
            KeyError::InvalidSeed(field) => {
                VaultError::PersistenceFailure(format!("stored seed field {field} is malformed"))
            }
        }
    }
}

/// Return the persisted seed, creating it on first run.
///
/// Existing records are returned unchanged. When none exist a new seed is
/// generated and handed to [`SeedStore::insert_if_absent`]; whichever record
/// the store kept is returned, so concurrent first runs agree on one seed.
///
/// # Errors
///
/// Returns [`KeyError::Persistence`] if the store fails, or
/// [`KeyError::InvalidSeed`] if the stored record is malformed.
pub async fn ensure_seed(store: &dyn SeedStore) -> Result<KeySeed, KeyError> {
    let mut existing = store.find_all().await?;
    if existing.len() > 1 {
        warn!(count = existing.len(), "multiple seed records found; using the first");
    }

    let seed = if existing.is_empty() {
        let stored = store.insert_if_absent(seed::generate()).await?;
        info!("seed material created");
        stored
    } else {
        info!("existing seed material reused");
        existing.swap_remove(0)
    };

    seed::validate(&seed)?;
    Ok(seed)
}

/// Run the full provisioning flow and return the process's cipher.
///
/// # Errors
///
/// Any error here must abort startup: there is no partially keyed cipher.
pub async fn provision(
    store: &dyn SeedStore,
    identity: &dyn IdentitySource,
    deployment_id: &str,
) -> Result<AuthenticatedCipher, KeyError> {
    let seed = ensure_seed(store).await?;
    let machine_id = identity.machine_id()?;
    let keys = derive_keys(&seed, &machine_id, deployment_id);
    info!("cipher keys derived");
    Ok(AuthenticatedCipher::new(keys))
}
