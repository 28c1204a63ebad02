//! AES-256-CTR + HMAC-SHA512 sealing primitives.
//!
//! This module is intentionally free of persistence and identity lookups.
//! It provides the digest, the tag comparator, and the authenticated cipher
//! used once keys have been provisioned.
//!
//! # Ciphertext format
//!
//! ```text
//! <hex(cipher text)>$<hex(iv)>$<hex(hmac-sha512(ct_hex || iv_hex))>
//! ```
//!
//! The tag covers the hex text of the cipher text and IV exactly as stored,
//! and is checked before any decryption takes place.

pub mod cipher;
pub mod compare;
pub mod digest;

pub use cipher::{AuthenticatedCipher, CipherError, IV_LEN, KEY_LEN};
pub use compare::constant_time_eq;
pub use digest::digest;
