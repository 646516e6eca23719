pub use tracing::{debug, error, info, trace, warn};

use crate::errors::LogError;

/// Install [`color_eyre`] and a [`tracing-subscriber`] fmt subscriber for the backend.
///
/// `RUST_LIB_BACKTRACE` defaults to `1` and `RUST_LOG` to
/// `info,tower_http=debug,mergington_backend=debug` when unset.
///
/// # Errors
///
/// Fails if either hook is already installed, which happens when `setup` runs twice.
pub fn setup() -> Result<(), LogError> {
    use tracing_subscriber::EnvFilter;

    // Get / set backtrace
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        unsafe { std::env::set_var("RUST_LIB_BACKTRACE", "1") }
    }
    // Install color_eyre
    color_eyre::install().map_err(|e: color_eyre::Report| LogError::ColorEyre(e))?;

    // Get/set the log level
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var(
                "RUST_LOG",
                "info,tower_http=debug,mergington_backend=debug",
            )
        }
    }
    // Setup tracing and tracing-subscriber
    tracing_subscriber::fmt::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .map_err(LogError::TracingSubscriber)?;

    Ok(())
}
