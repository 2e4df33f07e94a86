//! Logging setup for the CLI
//!
//! The library logs through the `log` facade; the subscriber installed here
//! picks those records up through its `log` bridge.

use tracing_subscriber::EnvFilter;

/// Initialize logging. `RUST_LOG` wins over `default_filter`.
///
/// Returns `false` when a subscriber was already installed; the existing one is kept.
pub fn init_logging(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
    {
        Ok(()) => true,
        Err(e) => {
            log::debug!("Keeping existing logger: {e}");
            false
        }
    }
}
