//! Logging setup for evaluation runs.
//!
//! The engine emits its lifecycle events (see `obs`) through `tracing`;
//! this module builds the global subscriber those events land in. Binaries
//! pick a [`LogFormat`] and verbosity once at startup; `RUST_LOG` overrides
//! the verbosity for fine-grained filtering.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines for interactive runs.
    #[default]
    Text,

    /// Newline-delimited JSON, one object per lifecycle event, for piping
    /// screening runs into log aggregation.
    Json,
}

/// Subscriber configuration for one process.
#[derive(Debug, Clone, Copy)]
pub struct LogOptions {
    pub format: LogFormat,

    /// Debug-level logging of stage and gate internals. Info-level run
    /// events are always emitted.
    pub verbose: bool,
}

impl LogOptions {
    pub fn new(format: LogFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Default filter directive used when `RUST_LOG` is unset.
    fn directive(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Install the global subscriber.
    ///
    /// Returns `false` when a subscriber is already installed for this
    /// process; the existing one keeps receiving events and this call
    /// changes nothing.
    pub fn install(self) -> bool {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.directive()));
        let registry = tracing_subscriber::registry().with(filter);

        match self.format {
            LogFormat::Json => registry
                .with(fmt::layer().with_target(false).json())
                .try_init()
                .is_ok(),
            LogFormat::Text => registry
                .with(fmt::layer().with_target(false))
                .try_init()
                .is_ok(),
        }
    }
}

impl Default for LogOptions {
    fn default() -> Self {
        Self::new(LogFormat::Text, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_flag_selects_debug_directive() {
        assert_eq!(LogOptions::new(LogFormat::Text, false).directive(), "info");
        assert_eq!(LogOptions::new(LogFormat::Text, true).directive(), "debug");
    }

    #[test]
    fn text_format_is_the_default() {
        let options = LogOptions::default();
        assert_eq!(options.format, LogFormat::Text);
        assert!(!options.verbose);
    }
}
