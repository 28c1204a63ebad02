//! The protected account secret.
//!
//! Accounts are keyed by the uppercase SHA-512 digest of the user name, so the
//! store never sees the name itself; the secret is kept as an
//! [`common::EncryptedBlob`].

use common::{AccountRecord, VaultError};
use tracing::info;

use crate::crypto::{digest, AuthenticatedCipher};
use crate::store::AccountStore;

/// Seals and reveals account secrets with the process's cipher.
#[derive(Clone, Debug)]
pub struct AccountVault<S> {
    cipher: AuthenticatedCipher,
    store: S,
}

impl<S: AccountStore> AccountVault<S> {
    /// Create a vault over `store` using `cipher`.
    pub fn new(cipher: AuthenticatedCipher, store: S) -> Self {
        Self { cipher, store }
    }

    /// Encrypt `secret` and store it for `user`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::PersistenceFailure`] if the store write fails.
    pub async fn seal(&self, user: &str, secret: &str) -> Result<(), VaultError> {
        let account = AccountRecord {
            user: digest(user),
            secret: self.cipher.encrypt(secret)?,
        };
        self.store.save(account).await?;
        Ok(())
    }

    /// Decrypt the stored secret for `user`, or `None` if there is no account.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::TamperDetected`] if the stored blob fails its
    /// integrity check, and [`VaultError::PersistenceFailure`] if the read fails.
    pub async fn reveal(&self, user: &str) -> Result<Option<String>, VaultError> {
        let Some(account) = self.store.find_by_user(&digest(user)).await? else {
            return Ok(None);
        };
        Ok(Some(self.cipher.decrypt(&account.secret)?))
    }
}

/// Outcome of [`sync_account`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    /// An existing secret was found and passed its integrity check.
    Verified,
    /// No secret existed; the configured one was sealed and stored.
    Sealed,
    /// No secret existed and none was configured.
    Missing,
}

/// Startup check for the configured account.
///
/// Verifies the stored secret if there is one, otherwise seals `initial_secret`
/// when provided. The secret itself is never logged.
///
/// A stored secret that fails its integrity check is returned as
/// [`VaultError::TamperDetected`] and is neither resealed nor overwritten. The
/// `sealkeeper` binary treats that as fatal and exits non-zero, so a tampered
/// record stops the deployment until an operator inspects it.
///
/// # Errors
///
/// Propagates [`AccountVault::reveal`] and [`AccountVault::seal`] errors.
pub async fn sync_account<S: AccountStore>(
    vault: &AccountVault<S>,
    user: &str,
    initial_secret: Option<&str>,
) -> Result<AccountStatus, VaultError> {
    if let Some(secret) = vault.reveal(user).await? {
        info!(secret_len = secret.len(), "account secret verified");
        return Ok(AccountStatus::Verified);
    }
    match initial_secret {
        Some(secret) => {
            vault.seal(user, secret).await?;
            info!("account secret sealed");
            Ok(AccountStatus::Sealed)
        }
        None => {
            info!("no account secret stored");
            Ok(AccountStatus::Missing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KEY_LEN;
    use crate::keys::DerivedKeys;
    use crate::store::{memory::MemoryAccountStore, MockAccountStore, StoreError};

    fn cipher() -> AuthenticatedCipher {
        AuthenticatedCipher::new(DerivedKeys::from_raw([0x42; KEY_LEN], [0x24; KEY_LEN]))
    }

    #[tokio::test]
    async fn seal_then_reveal() {
        let vault = AccountVault::new(cipher(), MemoryAccountStore::new());
        vault.seal("test@gmail.com", "FOO").await.unwrap();
        assert_eq!(
            vault.reveal("test@gmail.com").await.unwrap().as_deref(),
            Some("FOO")
        );
    }

    #[tokio::test]
    async fn stored_record_is_keyed_by_digest() {
        let store = MemoryAccountStore::new();
        let vault = AccountVault::new(cipher(), store.clone());
        vault.seal("test@gmail.com", "FOO").await.unwrap();
        let record = store
            .find_by_user(&digest("test@gmail.com"))
            .await
            .unwrap()
            .unwrap();
        assert_ne!(record.secret.cipher_text, hex::encode("FOO"));
        assert!(store.find_by_user("test@gmail.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_user_reveals_none() {
        let vault = AccountVault::new(cipher(), MemoryAccountStore::new());
        assert_eq!(vault.reveal("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn tampered_record_is_an_error_not_empty() {
        let store = MemoryAccountStore::new();
        let vault = AccountVault::new(cipher(), store.clone());
        vault.seal("user", "secret").await.unwrap();

        let mut record = store.find_by_user(&digest("user")).await.unwrap().unwrap();
        record.secret.tag = "0".repeat(record.secret.tag.len());
        store.save(record).await.unwrap();

        assert!(matches!(
            vault.reveal("user").await,
            Err(VaultError::TamperDetected)
        ));
    }

    #[tokio::test]
    async fn store_failure_is_persistence_error() {
        let mut store = MockAccountStore::new();
        store
            .expect_find_by_user()
            .returning(|_| Err(StoreError::Database("timeout".into())));
        let vault = AccountVault::new(cipher(), store);
        assert!(matches!(
            vault.reveal("user").await,
            Err(VaultError::PersistenceFailure(_))
        ));
    }

    #[tokio::test]
    async fn sync_seals_when_missing_then_verifies() {
        let vault = AccountVault::new(cipher(), MemoryAccountStore::new());
        assert_eq!(
            sync_account(&vault, "user", Some("FOO")).await.unwrap(),
            AccountStatus::Sealed
        );
        assert_eq!(
            sync_account(&vault, "user", Some("BAR")).await.unwrap(),
            AccountStatus::Verified
        );
        assert_eq!(vault.reveal("user").await.unwrap().as_deref(), Some("FOO"));
    }

    #[tokio::test]
    async fn sync_without_secret_reports_missing() {
        let vault = AccountVault::new(cipher(), MemoryAccountStore::new());
        assert_eq!(
            sync_account(&vault, "user", None).await.unwrap(),
            AccountStatus::Missing
        );
    }

    #[tokio::test]
    async fn sync_with_tampered_secret_is_fatal() {
        let store = MemoryAccountStore::new();
        let vault = AccountVault::new(cipher(), store.clone());
        vault.seal("user", "FOO").await.unwrap();

        let mut record = store.find_by_user(&digest("user")).await.unwrap().unwrap();
        let flipped = if record.secret.cipher_text.starts_with('0') { "1" } else { "0" };
        record.secret.cipher_text.replace_range(..1, flipped);
        store.save(record.clone()).await.unwrap();

        let err = sync_account(&vault, "user", Some("BAR")).await.unwrap_err();
        assert!(matches!(err, VaultError::TamperDetected));
        // The tampered record is left in place, not resealed.
        assert_eq!(
            store.find_by_user(&digest("user")).await.unwrap(),
            Some(record)
        );
    }
}
