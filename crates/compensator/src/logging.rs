//! Log filter setup.
//!
//! `--verbose` levels: 0 = silent, 1 = errors only, 2 = all actions.
//! `RUST_LOG`, when set, takes precedence.

use tracing_subscriber::EnvFilter;

/// Default filter directive for a `--verbose` level.
pub fn directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "off",
        1 => "error",
        _ => "info",
    }
}

/// Install the global subscriber, writing to stderr.
pub fn init(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| directive(verbose).into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_levels() {
        assert_eq!(directive(0), "off");
        assert_eq!(directive(1), "error");
        assert_eq!(directive(2), "info");
        assert_eq!(directive(9), "info");
    }

    #[test]
    fn test_directives_parse() {
        for level in 0..=2 {
            assert!(EnvFilter::try_new(directive(level)).is_ok());
        }
    }
}
