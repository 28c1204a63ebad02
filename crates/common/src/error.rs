//! Common error types shared across crates.

use thiserror::Error;

/// Top-level error kinds surfaced by the sealkeeper subsystem.
///
/// Variants split into two groups:
/// - startup-fatal: [`VaultError::IdentityUnavailable`], [`VaultError::PersistenceFailure`]
/// - per-call: [`VaultError::MalformedBlob`], [`VaultError::TamperDetected`]
///
/// Messages never carry key material or plaintext.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The machine identifier could not be obtained, so keys cannot be derived.
    #[error("machine identity unavailable: {0}")]
    IdentityUnavailable(String),

    /// Seed or account records could not be read or written.
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    /// The encrypted blob does not have the `<ct>$<iv>$<tag>` structure.
    #[error("malformed encrypted blob: {0}")]
    MalformedBlob(String),

    /// The integrity tag did not match; the blob was not decrypted.
    #[error("integrity tag mismatch: encrypted blob has been tampered with")]
    TamperDetected,

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VaultError {
    /// Short machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            VaultError::IdentityUnavailable(_) => "identity_unavailable",
            VaultError::PersistenceFailure(_) => "persistence_failure",
            VaultError::MalformedBlob(_) => "malformed_blob",
            VaultError::TamperDetected => "tamper_detected",
            VaultError::Internal(_) => "internal_error",
        }
    }

    /// Returns `true` if this error must abort process startup.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            VaultError::IdentityUnavailable(_) | VaultError::PersistenceFailure(_)
        )
    }
}
