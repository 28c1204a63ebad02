//! Generation and validation of the persisted seed pair.

use common::SeedRecord;
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use super::KeyError;

/// Random bytes per seed field (hex-encoded to twice this many characters).
pub const SEED_LEN: usize = 32;

/// Generate a fresh seed pair from the OS CSPRNG.
pub fn generate() -> SeedRecord {
    SeedRecord {
        cipher_seed: random_hex(),
        hmac_seed: random_hex(),
    }
}

/// Check that a stored seed has the shape [`generate`] produces.
///
/// A bad record is reported rather than replaced: regenerating would make
/// every previously sealed blob undecryptable.
///
/// # Errors
///
/// Returns [`KeyError::InvalidSeed`] naming the offending field.
pub fn validate(seed: &SeedRecord) -> Result<(), KeyError> {
    if !is_seed_hex(&seed.cipher_seed) {
        return Err(KeyError::InvalidSeed("KEY"));
    }
    if !is_seed_hex(&seed.hmac_seed) {
        return Err(KeyError::InvalidSeed("HMAC_KEY"));
    }
    Ok(())
}

fn is_seed_hex(value: &str) -> bool {
    value.len() == SEED_LEN * 2 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

fn random_hex() -> String {
    let mut bytes = Zeroizing::new([0u8; SEED_LEN]);
    OsRng.fill_bytes(&mut *bytes);
    hex::encode(&*bytes)
}
