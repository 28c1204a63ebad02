//! Structured JSON logging for one startup run.
//!
//! `sealkeeper` provisions keys, checks the account secret and exits, so there
//! are no spans worth exporting: logs go to stdout only and there is no OTLP
//! exporter or shutdown flush. No key material, seed, or plaintext may appear
//! in any log field.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber.
///
/// Outputs structured JSON logs to stdout. `RUST_LOG` takes precedence over
/// `log_level` when set.
///
/// # Errors
///
/// Returns an error if the subscriber has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_rejected() {
        let _ = init("info");
        assert!(init("debug").is_err());
    }
}
