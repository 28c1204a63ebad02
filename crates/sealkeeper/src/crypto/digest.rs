//! SHA-512 digest helpers.

use sha2::{Digest, Sha512};

/// Byte length of a SHA-512 digest.
pub const DIGEST_LEN: usize = 64;

/// SHA-512 of the UTF-8 bytes of `input`, as uppercase hex.
///
/// Used both to key account records by user name and as the key derivation
/// step in [`crate::keys::derive_keys`].
pub fn digest(input: &str) -> String {
    hex::encode_upper(digest_bytes(input))
}

/// Raw SHA-512 of the UTF-8 bytes of `input`.
pub fn digest_bytes(input: &str) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&Sha512::digest(input.as_bytes()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        assert_eq!(
            digest("abc"),
            "DDAF35A193617ABACC417349AE20413112E6FA4E89A97EA20A9EEEE64B55D39A\
             2192992A274FC1A836BA3C23A3FEEBBD454D4423643CE80E2A9AC94FA54CA49F"
        );
    }

    #[test]
    fn output_is_uppercase_hex_of_fixed_length() {
        let d = digest("test@gmail.com");
        assert_eq!(d.len(), DIGEST_LEN * 2);
        assert!(d.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn hex_and_raw_forms_agree() {
        assert_eq!(digest("héllo"), hex::encode_upper(digest_bytes("héllo")));
    }
}
