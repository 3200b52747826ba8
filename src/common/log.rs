//! Logging helpers
//!
//! The library only emits `log` records; binaries decide how to print them.

/// Initialize the global logger
///
/// `RUST_LOG` takes precedence over `level` when it is set.
///
/// # Parameters
///
/// * `level` - Log level used when `RUST_LOG` is absent
pub fn init_logger(level: &str) {
    let env = env_logger::Env::default()
        .filter_or("RUST_LOG", level);

    // A second call (e.g. from tests) keeps the first logger.
    let _ = env_logger::Builder::from_env(env)
        .format_target(false)
        .try_init();
}
