//! Host-bound sealing of a stored secret.
//!
//! A random seed pair is provisioned once in a [`store::SeedStore`]. On every
//! start the seed is combined with the host's machine identifier and a
//! deployment identifier to derive an AES-256 key and an HMAC-SHA512 key, which
//! key a single [`crypto::AuthenticatedCipher`] for the life of the process.
//!
//! ```no_run
//! # async fn run() -> Result<(), sealkeeper::keys::KeyError> {
//! use sealkeeper::keys::{self, HostMac};
//! use sealkeeper::store::memory::MemorySeedStore;
//!
//! let cipher = keys::provision(&MemorySeedStore::new(), &HostMac, "app123").await?;
//! let blob = cipher.encrypt("FOO").expect("fresh keys");
//! assert_eq!(cipher.decrypt(&blob).expect("untampered"), "FOO");
//! # Ok(())
//! # }
//! ```

pub mod accounts;
pub mod config;
pub mod crypto;
pub mod keys;
pub mod store;
pub mod telemetry;

pub use common::{EncryptedBlob, VaultError};
pub use crypto::AuthenticatedCipher;
