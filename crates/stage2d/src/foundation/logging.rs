//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG`
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let _ = env_logger::Builder::from_default_env().try_init();
}

/// Initialize logging with a default filter (e.g. `"info"` or
/// `"stage2d=debug,warn"`). `RUST_LOG` still overrides it when set.
pub fn init_with_level(filters: &str) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(filters);
    if let Ok(env_filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&env_filters);
    }
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized; keeping the existing configuration");
    }
}
