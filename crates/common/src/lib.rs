//! Common types, record formats, and errors shared across `sealkeeper` crates.

pub mod blob;
pub mod error;
pub mod protocol;

pub use blob::EncryptedBlob;
pub use error::VaultError;
pub use protocol::{AccountRecord, SeedRecord};
