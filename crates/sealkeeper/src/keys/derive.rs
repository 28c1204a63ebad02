//! Deterministic derivation of the operational keys from a seed.

use common::SeedRecord;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::{digest::digest_bytes, KEY_LEN};

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// The memory is zeroized on drop.
pub struct KeyBytes(Box<[u8; KEY_LEN]>);

impl KeyBytes {
    fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(Box::new(bytes))
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Zeroize for KeyBytes {
    fn zeroize(&mut self) {
        (*self.0).zeroize();
    }
}

impl Drop for KeyBytes {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for KeyBytes {}

impl std::fmt::Debug for KeyBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("KeyBytes([REDACTED])")
    }
}

/// The cipher key and HMAC key for this process.
///
/// Derived fresh on every start and never persisted.
#[derive(Debug)]
pub struct DerivedKeys {
    cipher_key: KeyBytes,
    hmac_key: KeyBytes,
}

impl DerivedKeys {
    /// Wrap already-derived key bytes.
    pub fn from_raw(cipher_key: [u8; KEY_LEN], hmac_key: [u8; KEY_LEN]) -> Self {
        Self {
            cipher_key: KeyBytes::new(cipher_key),
            hmac_key: KeyBytes::new(hmac_key),
        }
    }

    /// The AES-256 key.
    pub fn cipher_key(&self) -> &[u8; KEY_LEN] {
        self.cipher_key.as_bytes()
    }

    /// The HMAC-SHA512 key.
    pub fn hmac_key(&self) -> &[u8; KEY_LEN] {
        self.hmac_key.as_bytes()
    }
}

/// Derive both keys from `seed` and the host/deployment identifiers.
///
/// ```text
/// cipher_key = first 32 bytes of SHA-512(machine_id || cipher_seed)
/// hmac_key   = first 32 bytes of SHA-512(hmac_seed  || deployment_id)
/// ```
///
/// Taking the first 32 bytes is the same as hex-decoding the first 64
/// characters of [`crate::crypto::digest`]. The cipher key is bound to the
/// host: the same seed on a machine with a different identifier yields a
/// different key and cannot decrypt existing blobs.
pub fn derive_keys(seed: &SeedRecord, machine_id: &str, deployment_id: &str) -> DerivedKeys {
    let cipher_input = Zeroizing::new(format!("{machine_id}{}", seed.cipher_seed));
    let hmac_input = Zeroizing::new(format!("{}{deployment_id}", seed.hmac_seed));
    DerivedKeys {
        cipher_key: leading_key(&cipher_input),
        hmac_key: leading_key(&hmac_input),
    }
}

fn leading_key(input: &str) -> KeyBytes {
    let digest = Zeroizing::new(digest_bytes(input));
    let mut key = Box::new([0u8; KEY_LEN]);
    key.copy_from_slice(&digest[..KEY_LEN]);
    KeyBytes(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::digest;

    fn fixture_seed() -> SeedRecord {
        SeedRecord {
            cipher_seed: "aa".repeat(32),
            hmac_seed: "bb".repeat(32),
        }
    }

    #[test]
    fn reference_keys() {
        let keys = derive_keys(&fixture_seed(), "0011deadbeef", "app123");
        assert_eq!(
            hex::encode(keys.cipher_key()),
            "f1c73256b3124bee966e5530dfad771bd47886b23372d5be05073e6a824b3596"
        );
        assert_eq!(
            hex::encode(keys.hmac_key()),
            "dc9b94cae2a9a2a119729128cbe0ecef3fa4a66507c7003b2b3a3e47f796411c"
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_keys(&fixture_seed(), "0011deadbeef", "app123");
        let b = derive_keys(&fixture_seed(), "0011deadbeef", "app123");
        assert_eq!(a.cipher_key(), b.cipher_key());
        assert_eq!(a.hmac_key(), b.hmac_key());
    }

    #[test]
    fn matches_hex_digest_prefix() {
        let seed = fixture_seed();
        let keys = derive_keys(&seed, "0011deadbeef", "app123");
        let expected = digest(&format!("0011deadbeef{}", seed.cipher_seed));
        assert_eq!(hex::encode_upper(keys.cipher_key()), expected[..64]);
    }

    #[test]
    fn machine_id_only_affects_cipher_key() {
        let a = derive_keys(&fixture_seed(), "0011deadbeef", "app123");
        let b = derive_keys(&fixture_seed(), "665544332211", "app123");
        assert_ne!(a.cipher_key(), b.cipher_key());
        assert_eq!(a.hmac_key(), b.hmac_key());
    }

    #[test]
    fn deployment_id_only_affects_hmac_key() {
        let a = derive_keys(&fixture_seed(), "0011deadbeef", "app123");
        let b = derive_keys(&fixture_seed(), "0011deadbeef", "app456");
        assert_eq!(a.cipher_key(), b.cipher_key());
        assert_ne!(a.hmac_key(), b.hmac_key());
    }

    #[test]
    fn key_bytes_zeroize_clears_buffer() {
        let mut key = KeyBytes::new([0xAB; KEY_LEN]);
        key.zeroize();
        assert_eq!(key.as_bytes(), &[0u8; KEY_LEN]);
    }

    #[test]
    fn key_bytes_wipe_on_drop() {
        fn assert_zeroize_on_drop<T: ZeroizeOnDrop>() {}
        assert_zeroize_on_drop::<KeyBytes>();
        assert_zeroize_on_drop::<Zeroizing<[u8; KEY_LEN]>>();
    }

    #[test]
    fn debug_output_is_redacted() {
        let keys = DerivedKeys::from_raw([0xAB; KEY_LEN], [0xCD; KEY_LEN]);
        let printed = format!("{keys:?}");
        assert!(printed.contains("REDACTED"));
        assert!(!printed.to_lowercase().contains("abab"));
    }
}
