//! The at-rest encoding of an encrypted value.
//!
//! ```text
//! <cipher-text hex>$<iv hex>$<hmac tag hex>
//! ```
//!
//! The delimiter can never occur inside a field because every field is hex.
//! Parsing only checks the field count; the fields are left as text so the
//! integrity tag can be verified over exactly what was stored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between the three blob fields.
pub const DELIMITER: char = '$';

/// Number of fields in a well-formed blob.
pub const FIELD_COUNT: usize = 3;

/// A parsed `<ct>$<iv>$<tag>` value. Treated as opaque outside the cipher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EncryptedBlob {
    /// Hex-encoded cipher text.
    pub cipher_text: String,
    /// Hex-encoded initialisation vector.
    pub iv: String,
    /// Hex-encoded HMAC over `cipher_text || iv`.
    pub tag: String,
}

/// The blob string did not split into exactly [`FIELD_COUNT`] fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {FIELD_COUNT} '{DELIMITER}'-separated fields, found {0}")]
pub struct BlobFormatError(pub usize);

impl fmt::Display for EncryptedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{DELIMITER}{}{DELIMITER}{}",
            self.cipher_text, self.iv, self.tag
        )
    }
}

impl FromStr for EncryptedBlob {
    type Err = BlobFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(DELIMITER).collect();
        match parts.as_slice() {
            [cipher_text, iv, tag] => Ok(Self {
                cipher_text: (*cipher_text).to_owned(),
                iv: (*iv).to_owned(),
                tag: (*tag).to_owned(),
            }),
            _ => Err(BlobFormatError(parts.len())),
        }
    }
}

impl TryFrom<String> for EncryptedBlob {
    type Error = BlobFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EncryptedBlob> for String {
    fn from(blob: EncryptedBlob) -> Self {
        blob.to_string()
    }
}
