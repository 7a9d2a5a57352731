//! Console logging for applications built on the SDK
//!
//! The library itself only emits `log` records; installing a logger is left
//! to the binary. This helper installs an `env_logger` writing to stdout.

use log::LevelFilter;

/// Installs a stdout logger at `level`
///
/// `RUST_LOG`, when set, refines the level per module. Calling this more
/// than once is harmless; only the first call installs a logger.
///
/// # Returns
///
/// `true` if this call installed the logger
pub fn setup_logger(level: LevelFilter) -> bool {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .format_timestamp_secs()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logger_twice() {
        setup_logger(LevelFilter::Debug);
        assert!(!setup_logger(LevelFilter::Info));
    }
}
