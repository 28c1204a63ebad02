//! Sources for the machine identifier that binds the cipher key to a host.

use super::KeyError;

/// Provides the stable machine identifier used in key derivation.
#[cfg_attr(test, mockall::automock)]
pub trait IdentitySource: Send + Sync {
    /// Return the normalised machine identifier.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::IdentityUnavailable`] if no identifier can be read.
    fn machine_id(&self) -> Result<String, KeyError>;
}

/// The MAC address of the host's first non-loopback interface.
///
/// Rendered as lowercase hex with separators stripped, e.g.
/// `00:11:DE:AD:BE:EF` becomes `0011deadbeef`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostMac;

impl IdentitySource for HostMac {
    fn machine_id(&self) -> Result<String, KeyError> {
        let mac = mac_address::get_mac_address()
            .map_err(|e| KeyError::IdentityUnavailable(e.to_string()))?
            .ok_or_else(|| {
                KeyError::IdentityUnavailable("no network interface with a MAC address".into())
            })?;

        let bytes = mac.bytes();
        if bytes.iter().all(|b| *b == 0) {
            return Err(KeyError::IdentityUnavailable(
                "first interface reports an all-zero MAC address".into(),
            ));
        }
        Ok(hex::encode(bytes))
    }
}

/// A machine identifier supplied by configuration instead of the host.
#[derive(Debug, Clone)]
pub struct FixedIdentity(String);

impl FixedIdentity {
    /// Normalise `raw` the same way as [`HostMac`] output.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::IdentityUnavailable`] if nothing is left after
    /// normalisation.
    pub fn new(raw: &str) -> Result<Self, KeyError> {
        let id = normalize(raw);
        if id.is_empty() {
            return Err(KeyError::IdentityUnavailable(
                "configured machine identifier is empty".into(),
            ));
        }
        Ok(Self(id))
    }
}

impl IdentitySource for FixedIdentity {
    fn machine_id(&self) -> Result<String, KeyError> {
        Ok(self.0.clone())
    }
}

/// Strip `:` / `-` separators and surrounding whitespace, then lowercase.
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| *c != ':' && *c != '-')
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_colons_and_lowercases() {
        assert_eq!(normalize("00:11:DE:AD:BE:EF"), "0011deadbeef");
    }

    #[test]
    fn normalize_strips_dashes_and_whitespace() {
        assert_eq!(normalize("  00-11-de-ad-be-ef\n"), "0011deadbeef");
    }

    #[test]
    fn fixed_identity_is_normalised() {
        let id = FixedIdentity::new("00:11:DE:AD:BE:EF").unwrap();
        assert_eq!(id.machine_id().unwrap(), "0011deadbeef");
    }

    #[test]
    fn fixed_identity_rejects_blank() {
        assert!(matches!(
            FixedIdentity::new(" :: "),
            Err(KeyError::IdentityUnavailable(_))
        ));
    }

    #[test]
    fn host_mac_is_normalised_when_present() {
        // Build sandboxes may have no interfaces at all; only check the shape
        // when a MAC is available.
        if let Ok(id) = HostMac.machine_id() {
            assert_eq!(id.len(), 12);
            assert_eq!(id, normalize(&id));
        }
    }
}
