#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Logging setup for the apigen tools.
//!
//! Library crates log through `tracing` macros; binaries call [`init`] once
//! to install a subscriber that writes to stderr.

use thiserror::Error;
use tracing_subscriber::filter::{EnvFilter, ParseError};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Level used when neither `RUST_LOG` nor the configuration names one.
pub const DEFAULT_LEVEL: &str = "info";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive does not parse.
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    /// A global subscriber is already installed.
    #[error(transparent)]
    Init(#[from] TryInitError),
}

/// Picks the filter directive: `RUST_LOG` if set, otherwise `configured`
/// raised by one level per `verbose` step.
pub fn filter_directive(configured: &str, verbose: u8) -> String {
    if let Ok(filter) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !filter.trim().is_empty() {
            return filter;
        }
    }
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Installs a stderr subscriber filtered by `directive`.
pub fn init(directive: &str) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_new(directive)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr).compact())
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_directive() {
        assert!(matches!(init("apigen=notalevel"), Err(LoggingError::Filter(_))));
    }

    #[test]
    fn test_verbosity_raises_level() {
        if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
            return;
        }
        assert_eq!(filter_directive("warn", 0), "warn");
        assert_eq!(filter_directive("warn", 1), "debug");
        assert_eq!(filter_directive("warn", 3), "trace");
    }
}
