//! Encrypt-then-MAC sealing of text values.
//!
//! **Algorithm:** AES-256 in CTR mode (128-bit big-endian counter over the
//! whole IV) for confidentiality, HMAC-SHA512 over the hex cipher text and hex
//! IV for integrity. A fresh random IV is drawn from the OS CSPRNG on every
//! call; callers cannot supply one.
//!
//! **CTR under a repeated IV leaks the XOR of the plaintexts.** Never add an
//! API that accepts a caller-provided or counter-derived IV.

use std::sync::Arc;

use aes::Aes256;
use common::blob::{BlobFormatError, EncryptedBlob};
use common::VaultError;
use ctr::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha512;
use thiserror::Error;
use tracing::warn;

use super::compare::constant_time_eq;
use crate::keys::DerivedKeys;

/// Byte length of an AES-256 key and of the HMAC key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of the CTR initialisation vector (16 bytes = one AES block).
pub const IV_LEN: usize = 16;

type Aes256Ctr = ctr::Ctr128BE<Aes256>;
type HmacSha512 = Hmac<Sha512>;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// Key or IV material had the wrong length.
    #[error("invalid key length: expected {KEY_LEN} bytes")]
    InvalidKeyLength,

    /// The blob does not have the expected structure or encoding.
    #[error("malformed encrypted blob: {0}")]
    MalformedBlob(String),

    /// The integrity tag did not verify. Nothing was decrypted.
    #[error("integrity tag mismatch")]
    TamperDetected,
}

impl From<BlobFormatError> for CipherError {
    fn from(e: BlobFormatError) -> Self {
        CipherError::MalformedBlob(e.to_string())
    }
}

impl From<CipherError> for VaultError {
    fn from(e: CipherError) -> Self {
        match e {
            CipherError::TamperDetected => VaultError::TamperDetected,
            CipherError::MalformedBlob(msg) => VaultError::MalformedBlob(msg),
            other @ CipherError::InvalidKeyLength => VaultError::Internal(other.to_string()),
        }
    }
}

/// Authenticated cipher keyed once with the process's [`DerivedKeys`].
///
/// Cloning is cheap (the keys sit behind an `Arc`) and every clone shares the
/// same immutable keys, so concurrent calls need no locking.
#[derive(Clone, Debug)]
pub struct AuthenticatedCipher {
    keys: Arc<DerivedKeys>,
}

impl AuthenticatedCipher {
    /// Build a cipher that owns `keys` for the rest of its lifetime.
    pub fn new(keys: DerivedKeys) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }

    /// Encrypt `plaintext` under a fresh random IV.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] only if the key material is
    /// corrupt, which cannot happen for keys built by [`crate::keys`].
    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedBlob, CipherError> {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);
        self.seal_with_iv(plaintext, &iv)
    }

    /// Verify and decrypt a blob.
    ///
    /// The tag is recomputed over the stored cipher-text and IV fields and
    /// checked with [`constant_time_eq`] before anything is decoded.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::TamperDetected`] if the tag does not match.
    /// Returns [`CipherError::MalformedBlob`] if a verified blob still fails
    /// to decode (bad hex, wrong IV length, or non-UTF-8 plaintext).
    pub fn decrypt(&self, blob: &EncryptedBlob) -> Result<String, CipherError> {
        let expected = self.tag(&blob.cipher_text, &blob.iv)?;
        if !constant_time_eq(&expected, &blob.tag) {
            warn!("encrypted blob has been tampered with; refusing to decrypt");
            return Err(CipherError::TamperDetected);
        }

        let mut iv = [0u8; IV_LEN];
        hex::decode_to_slice(&blob.iv, &mut iv)
            .map_err(|e| CipherError::MalformedBlob(format!("iv: {e}")))?;
        let mut buf = hex::decode(&blob.cipher_text)
            .map_err(|e| CipherError::MalformedBlob(format!("cipher text: {e}")))?;

        self.apply_keystream(&iv, &mut buf)?;
        String::from_utf8(buf)
            .map_err(|_| CipherError::MalformedBlob("plaintext is not valid UTF-8".into()))
    }

    /// Parse a `<ct>$<iv>$<tag>` string and decrypt it.
    ///
    /// # Errors
    ///
    /// As [`AuthenticatedCipher::decrypt`], plus [`CipherError::MalformedBlob`]
    /// when the string does not split into exactly three fields.
    pub fn decrypt_str(&self, blob: &str) -> Result<String, CipherError> {
        let blob: EncryptedBlob = blob.parse()?;
        self.decrypt(&blob)
    }

    fn seal_with_iv(&self, plaintext: &str, iv: &[u8; IV_LEN]) -> Result<EncryptedBlob, CipherError> {
        let mut buf = plaintext.as_bytes().to_vec();
        self.apply_keystream(iv, &mut buf)?;

        let cipher_text = hex::encode(&buf);
        let iv = hex::encode(iv);
        let tag = self.tag(&cipher_text, &iv)?;

        Ok(EncryptedBlob {
            cipher_text,
            iv,
            tag,
        })
    }

    fn apply_keystream(&self, iv: &[u8; IV_LEN], buf: &mut [u8]) -> Result<(), CipherError> {
        let mut stream = Aes256Ctr::new_from_slices(self.keys.cipher_key(), iv)
            .map_err(|_| CipherError::InvalidKeyLength)?;
        stream.apply_keystream(buf);
        Ok(())
    }

    fn tag(&self, cipher_text_hex: &str, iv_hex: &str) -> Result<String, CipherError> {
        let mut mac = <HmacSha512 as Mac>::new_from_slice(self.keys.hmac_key())
            .map_err(|_| CipherError::InvalidKeyLength)?;
        mac.update(cipher_text_hex.as_bytes());
        mac.update(iv_hex.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}
