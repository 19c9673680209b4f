//! Public SDK surface for respec-rs.
//!
//! Re-exports the config crate and provides a small logging helper so
//! binaries embedding the loader set up output the same way.

/// Re-export for convenience.
pub use respec_rs_config as config;
pub use respec_rs_config::{ConfigError, SpecConfig, ValidationError};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::builder()
            .format_timestamp_millis()
            .parse_default_env()
            .try_init();
    }
}
