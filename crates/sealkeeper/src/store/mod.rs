//! Persistence seams for seed material and sealed account secrets.
//!
//! Two implementations ship with the crate:
//! - [`memory`]: process-local maps, used by tests and embedders without a database.
//! - [`mongo`]: MongoDB collections, used by the `sealkeeper` binary.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use common::{AccountRecord, SeedRecord, VaultError};
use thiserror::Error;

/// Errors from a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database rejected or failed the operation.
    #[error("database error: {0}")]
    Database(String),

    /// A stored document could not be decoded into the expected record.
    #[error("stored record could not be decoded: {0}")]
    Decode(String),
}

impl From<StoreError> for VaultError {
    fn from(e: StoreError) -> Self {
        VaultError::PersistenceFailure(e.to_string())
    }
}

/// Storage for the single seed record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeedStore: Send + Sync {
    /// Return every stored seed record (normally zero or one).
    async fn find_all(&self) -> Result<Vec<SeedRecord>, StoreError>;

    /// Store `seed` unless a seed already exists, atomically.
    ///
    /// Returns the record that is stored after the call: `seed` if it was
    /// inserted, otherwise the record that was already there.
    async fn insert_if_absent(&self, seed: SeedRecord) -> Result<SeedRecord, StoreError>;
}

/// Storage for sealed account secrets, keyed by user digest.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up the account whose `user` field equals `user_digest`.
    async fn find_by_user(&self, user_digest: &str) -> Result<Option<AccountRecord>, StoreError>;

    /// Insert `account`, replacing any record for the same user.
    async fn save(&self, account: AccountRecord) -> Result<(), StoreError>;
}
