//! Subscriber setup for binaries and tests
//!
//! Libraries only emit `tracing` events; installing a subscriber is left
//! to whoever owns `main`.

use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, falling back to `default` (e.g. `"info"`)
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install a stderr formatter filtered by `RUST_LOG` (default `info`).
///
/// Returns `false` when a global subscriber was already set.
pub fn init_logging() -> bool {
    init_logging_with("info")
}

pub fn init_logging_with(default: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        init_logging_with("warn");
        assert!(!init_logging_with("debug"));
    }
}
