//! In-memory stores.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use common::{AccountRecord, SeedRecord};
use tokio::sync::{Mutex, RwLock};

use super::{AccountStore, SeedStore, StoreError};

/// Seed store backed by a mutex-guarded slot.
///
/// The lock is held across the check and the insert, which makes
/// [`SeedStore::insert_if_absent`] atomic for every clone of the store.
#[derive(Clone, Debug, Default)]
pub struct MemorySeedStore {
    inner: Arc<Mutex<Option<SeedRecord>>>,
}

impl MemorySeedStore {
    /// Create a new, empty [`MemorySeedStore`].
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeedStore for MemorySeedStore {
    async fn find_all(&self) -> Result<Vec<SeedRecord>, StoreError> {
        Ok(self.inner.lock().await.iter().cloned().collect())
    }

    async fn insert_if_absent(&self, seed: SeedRecord) -> Result<SeedRecord, StoreError> {
        let mut slot = self.inner.lock().await;
        Ok(slot.get_or_insert(seed).clone())
    }
}

/// Account store backed by a `HashMap` keyed on user digest.
#[derive(Clone, Debug, Default)]
pub struct MemoryAccountStore {
    inner: Arc<RwLock<HashMap<String, AccountRecord>>>,
}

impl MemoryAccountStore {
    /// Create a new, empty [`MemoryAccountStore`].
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_user(&self, user_digest: &str) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self.inner.read().await.get(user_digest).cloned())
    }

    async fn save(&self, account: AccountRecord) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .insert(account.user.clone(), account);
        Ok(())
    }
}
