//! Logging setup
//!
//! `RUST_LOG` takes precedence over the level chosen on the command line.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log level configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Level from `--log-level`, falling back to `--verbose`
    pub fn from_args(log_level: Option<&str>, verbose: bool) -> Self {
        log_level
            .and_then(Self::from_str)
            .unwrap_or_else(|| Self::from_verbose(verbose))
    }

    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        }
    }

    /// Default filter directive for this crate
    pub fn directive(self) -> String {
        format!("airtest_fleet={}", self.to_tracing_level())
    }
}

/// Initialize the global subscriber
pub fn init_logger(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_verbose() {
        assert_eq!(LogLevel::from_verbose(true), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbose(false), LogLevel::Info);
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!(LogLevel::from_str("trace"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_str("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("error"), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_str("loud"), None);
    }

    #[test]
    fn test_from_args() {
        assert_eq!(LogLevel::from_args(Some("error"), true), LogLevel::Error);
        assert_eq!(LogLevel::from_args(None, true), LogLevel::Debug);
        assert_eq!(LogLevel::from_args(None, false), LogLevel::Info);
    }

    #[test]
    fn test_directive() {
        assert_eq!(LogLevel::Warn.directive(), "airtest_fleet=WARN");
    }
}
