//! Document shapes persisted by the seed and account stores.
//!
//! Field names match the documents written by earlier deployments of this
//! service (`KEY` / `HMAC_KEY`, `user` / `secret`) so existing collections stay
//! readable.

use serde::{Deserialize, Serialize};

use crate::blob::EncryptedBlob;

// ---------------------------------------------------------------------------
// Key seed
// ---------------------------------------------------------------------------

/// The persisted seed pair from which operational keys are derived.
///
/// Both fields are 32 random bytes, lowercase hex.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRecord {
    /// Seed for the cipher key.
    #[serde(rename = "KEY")]
    pub cipher_seed: String,
    /// Seed for the HMAC key.
    #[serde(rename = "HMAC_KEY")]
    pub hmac_seed: String,
}

impl std::fmt::Debug for SeedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SeedRecord([REDACTED])")
    }
}

// ---------------------------------------------------------------------------
// Protected account secret
// ---------------------------------------------------------------------------

/// An account whose secret is stored encrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Uppercase SHA-512 hex digest of the account's user name.
    pub user: String,
    /// The account secret, sealed by the authenticated cipher.
    pub secret: EncryptedBlob,
}
