//! Report formatting for suite replays.
//!
//! This module renders a [`ValidationReport`] as JSON for programmatic
//! consumption or as human-readable text for terminals and logs.
//!
//! # Examples
//!
//! ```rust
//! use term_expect::formatters::{ResultFormatter, HumanFormatter, FormatterConfig};
//! use term_expect::core::ValidationReport;
//!
//! let report = ValidationReport::new(Vec::new());
//! let output = HumanFormatter::with_config(FormatterConfig::minimal())
//!     .format(&report)
//!     .unwrap();
//! assert!(output.contains("Validation PASSED"));
//! ```

use crate::core::{ExpectationResult, ResultObj, ValidationReport};
use crate::prelude::*;
use serde_json::Value;
use std::fmt::{self, Write};

/// Configuration options for formatting reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterConfig {
    /// Include the statistics block
    pub include_statistics: bool,
    /// Include per-expectation results
    pub include_results: bool,
    /// Only list results that did not hold
    pub only_failures: bool,
    /// Maximum number of results to list, `None` for all
    pub max_results: Option<usize>,
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
    /// Whether to include the report timestamp
    pub include_timestamps: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_statistics: true,
            include_results: true,
            only_failures: false,
            max_results: None,
            use_colors: true,
            include_timestamps: true,
        }
    }
}

impl FormatterConfig {
    /// Creates a minimal configuration showing only the summary.
    pub fn minimal() -> Self {
        Self {
            include_statistics: true,
            include_results: false,
            only_failures: false,
            max_results: Some(0),
            use_colors: false,
            include_timestamps: false,
        }
    }

    /// Creates a configuration suitable for CI/CD environments.
    pub fn ci() -> Self {
        Self {
            include_statistics: true,
            include_results: true,
            only_failures: true,
            max_results: Some(50),
            use_colors: false,
            include_timestamps: true,
        }
    }

    pub fn with_statistics(mut self, include: bool) -> Self {
        self.include_statistics = include;
        self
    }

    pub fn with_results(mut self, include: bool) -> Self {
        self.include_results = include;
        self
    }

    pub fn with_only_failures(mut self, only_failures: bool) -> Self {
        self.only_failures = only_failures;
        self
    }

    /// Sets the maximum number of results to list.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Returns the results this configuration lists, plus how many were left out.
    fn select<'a>(&self, report: &'a ValidationReport) -> (Vec<&'a ExpectationResult>, usize) {
        if !self.include_results {
            return (Vec::new(), 0);
        }
        let candidates: Vec<&ExpectationResult> = report
            .results
            .iter()
            .filter(|result| !self.only_failures || !result.success)
            .collect();
        let shown = self.max_results.unwrap_or(candidates.len()).min(candidates.len());
        let hidden = candidates.len() - shown;
        (candidates.into_iter().take(shown).collect(), hidden)
    }
}

/// Trait for rendering a report into an output format.
///
/// # Examples
///
/// ```rust
/// use term_expect::formatters::ResultFormatter;
/// use term_expect::core::ValidationReport;
///
/// struct OneLine;
///
/// impl ResultFormatter for OneLine {
///     fn format(&self, report: &ValidationReport) -> term_expect::prelude::Result<String> {
///         Ok(format!("success={}", report.success))
///     }
/// }
/// ```
pub trait ResultFormatter {
    /// Formats a report.
    fn format(&self, report: &ValidationReport) -> Result<String>;

    /// Formats a report with a one-off configuration.
    fn format_with_config(&self, report: &ValidationReport, _config: &FormatterConfig) -> Result<String> {
        self.format(report)
    }
}

/// Formats reports as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a compact JSON formatter that keeps every field.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: false,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: false,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFormatter for JsonFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(&self, report: &ValidationReport, config: &FormatterConfig) -> Result<String> {
        let mut value = serde_json::to_value(report)?;
        if let Value::Object(fields) = &mut value {
            if !config.include_statistics {
                fields.remove("statistics");
            }
            if !config.include_timestamps {
                fields.remove("timestamp");
            }
            let (selected, _) = config.select(report);
            if config.include_results {
                fields.insert("results".to_string(), serde_json::to_value(selected)?);
            } else {
                fields.remove("results");
            }
        }

        let json = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(json)
    }
}

/// Formats reports for console output.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn render(report: &ValidationReport, config: &FormatterConfig, output: &mut String) -> fmt::Result {
        let paint = |text: &str, color: &str| {
            if config.use_colors {
                format!("\x1b[{color}m{text}\x1b[0m")
            } else {
                text.to_string()
            }
        };

        writeln!(output)?;
        if report.success {
            writeln!(output, "✅ {}", paint("Validation PASSED", "32"))?;
        } else {
            writeln!(output, "❌ {}", paint("Validation FAILED", "31"))?;
        }

        if config.include_timestamps {
            writeln!(output, "Timestamp: {}", report.timestamp)?;
        }

        if config.include_statistics {
            let stats = &report.statistics;
            writeln!(output)?;
            writeln!(output, "📊 Summary Statistics:")?;
            writeln!(output, "   Evaluated: {}", stats.evaluated_expectations)?;
            writeln!(
                output,
                "   ✅ Successful: {}",
                paint(&stats.successful_expectations.to_string(), "32")
            )?;
            writeln!(
                output,
                "   ❌ Unsuccessful: {}",
                paint(&stats.unsuccessful_expectations.to_string(), "31")
            )?;
            match stats.success_percent {
                Some(percent) => writeln!(output, "   Success Rate: {percent:.1}%")?,
                None => writeln!(output, "   Success Rate: n/a")?,
            }
        }

        let (selected, hidden) = config.select(report);
        if !selected.is_empty() {
            writeln!(output)?;
            writeln!(output, "🔍 Results:")?;
            for (i, result) in selected.iter().enumerate() {
                let mark = if result.success { "✅" } else { "❌" };
                writeln!(output, "   {mark} #{}: {}", i + 1, describe(result))?;
                if let Some(detail) = detail(result) {
                    writeln!(output, "      {detail}")?;
                }
                if let Some(message) = result
                    .exception_info
                    .as_ref()
                    .and_then(|info| info.exception_message.as_deref())
                {
                    writeln!(output, "      Exception: {message}")?;
                }
            }
        }
        if hidden > 0 {
            writeln!(output)?;
            writeln!(output, "   ... and {hidden} more results")?;
        }

        writeln!(output)
    }
}

impl ResultFormatter for HumanFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(&self, report: &ValidationReport, config: &FormatterConfig) -> Result<String> {
        let mut output = String::new();
        Self::render(report, config, &mut output)
            .map_err(|e| TermError::Internal(format!("Failed to format report: {e}")))?;
        Ok(output)
    }
}

fn describe(result: &ExpectationResult) -> String {
    match &result.expectation_config {
        Some(config) => match config.kwargs.get("column").and_then(Value::as_str) {
            Some(column) => format!("{} ({column})", config.expectation_type),
            None => config.expectation_type.clone(),
        },
        None => "<unrecorded expectation>".to_string(),
    }
}

fn detail(result: &ExpectationResult) -> Option<String> {
    match result.result_obj.as_ref()? {
        ResultObj::ColumnMap(obj) => obj.basic.as_ref().map(|basic| {
            format!(
                "Unexpected: {} of {} ({} missing)",
                basic.unexpected_count, obj.element_count, obj.missing_count
            )
        }),
        ResultObj::ColumnAggregate(obj) => obj
            .observed_value()
            .map(|value| format!("Observed: {value}")),
        ResultObj::Custom(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ExceptionInfo, ExpectationConfig, Kwargs};
    use serde_json::json;

    fn report() -> ValidationReport {
        let mut kwargs = Kwargs::new();
        kwargs.insert("column".to_string(), json!("age"));
        let mut failed = ExpectationResult::new(false);
        failed.expectation_config = Some(ExpectationConfig::new("expect_column_values_to_be_between", kwargs));
        failed.exception_info = Some(ExceptionInfo {
            raised_exception: true,
            exception_message: Some("boom".to_string()),
            exception_traceback: None,
        });
        ValidationReport::new(vec![ExpectationResult::new(true), failed])
    }

    #[test]
    fn test_json_formatter_filters_fields() {
        let report = report();
        let full: Value = serde_json::from_str(&JsonFormatter::new().format(&report).unwrap()).unwrap();
        assert_eq!(full["statistics"]["evaluated_expectations"], json!(2));
        assert_eq!(full["results"].as_array().unwrap().len(), 2);

        let ci: Value = serde_json::from_str(
            &JsonFormatter::with_config(FormatterConfig::ci()).format(&report).unwrap(),
        )
        .unwrap();
        assert_eq!(ci["results"].as_array().unwrap().len(), 1);

        let minimal: Value = serde_json::from_str(
            &JsonFormatter::with_config(FormatterConfig::minimal()).format(&report).unwrap(),
        )
        .unwrap();
        assert!(minimal.get("results").is_none());
        assert!(minimal.get("timestamp").is_none());
    }

    #[test]
    fn test_human_formatter() {
        let output = HumanFormatter::with_config(FormatterConfig::default().with_colors(false))
            .format(&report())
            .unwrap();
        assert!(output.contains("❌ Validation FAILED"));
        assert!(output.contains("Success Rate: 50.0%"));
        assert!(output.contains("expect_column_values_to_be_between (age)"));
        assert!(output.contains("Exception: boom"));
    }

    #[test]
    fn test_human_formatter_truncates() {
        let config = FormatterConfig::default().with_colors(false).with_max_results(1);
        let output = HumanFormatter::with_config(config).format(&report()).unwrap();
        assert!(output.contains("... and 1 more results"));
    }
}
