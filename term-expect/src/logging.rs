//! Logging utilities and configuration for the expectations engine.
//!
//! The engine emits `tracing` events throughout: `debug!` per dispatch,
//! `warn!` for captured faults, and spans on the dispatcher and strategies.
//! [`LogConfig`] gates the noisier per-expectation and per-suite events a
//! [`Dataset`](crate::dataset::Dataset) emits, and [`setup`] installs a
//! subscriber for applications that do not bring their own.

use tracing::Level;

/// Logging configuration for a dataset.
///
/// Controls which optional events are emitted so that production use pays
/// nothing for detail it does not want.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Base log level for engine components
    pub base_level: Level,
    /// Whether to log each expectation call with its arguments
    pub log_expectation_details: bool,
    /// Whether to log suite mutations (records, default changes, replays)
    pub log_suite_operations: bool,
    /// Maximum length for logged field values (to prevent huge logs)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_expectation_details: false,
            log_suite_operations: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_expectation_details: true,
            log_suite_operations: true,
            max_field_length: 1024,
        }
    }

    /// Creates a minimal configuration for production with lowest overhead.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_expectation_details: false,
            log_suite_operations: false,
            max_field_length: 128,
        }
    }

    /// Creates a balanced configuration suitable for most use cases.
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Truncates `value` to this configuration's field limit.
    pub fn truncate(&self, value: &str) -> String {
        truncate_field(value, self.max_field_length)
    }
}

/// Macro for conditional per-expectation logging.
///
/// Arguments are only evaluated when `log_expectation_details` is set.
#[macro_export]
macro_rules! log_expectation {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_expectation_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Macro for conditional suite operation logging.
#[macro_export]
macro_rules! log_suite_op {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_suite_operations {
            tracing::info!($($arg)*);
        }
    };
}

/// Truncates a string to at most `max_length` bytes, on a character boundary.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Utilities for setting up structured logging.
pub mod setup {
    use crate::error::{Result, TermError};
    use tracing::Level;

    /// Configuration for installing a global subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for the application
        pub level: Level,
        /// Log level for `term_expect` specifically
        pub term_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                term_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// Creates a configuration for production use.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                term_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        /// Creates a configuration for development use.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                term_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_term_level(mut self, level: Level) -> Self {
            self.term_level = level;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Sets a custom environment filter.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            match &self.env_filter {
                Some(filter) => filter.clone(),
                None => format!(
                    "{},term_expect={}",
                    self.level.as_str().to_lowercase(),
                    self.term_level.as_str().to_lowercase()
                ),
            }
        }
    }

    /// Installs a global `tracing` subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured filter.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use term_expect::logging::setup::{LoggingConfig, init_logging};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Configuration`] if a global subscriber is
    /// already installed.
    pub fn init_logging(config: LoggingConfig) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TermError::Configuration(format!("failed to install subscriber: {e}")))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_env_filter() {
            assert_eq!(LoggingConfig::default().env_filter(), "info,term_expect=debug");
            assert_eq!(LoggingConfig::production().env_filter(), "warn,term_expect=info");
            assert_eq!(
                LoggingConfig::default().with_env_filter("trace").env_filter(),
                "trace"
            );
        }
    }
}
