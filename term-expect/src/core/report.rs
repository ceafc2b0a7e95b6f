//! Suite replay reports.

use super::result::ExpectationResult;
use serde::{Deserialize, Serialize};

/// Counts collected while replaying a suite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationStatistics {
    /// Number of expectations evaluated
    pub evaluated_expectations: usize,
    /// Number of expectations that held
    pub successful_expectations: usize,
    /// Number of expectations that failed or faulted
    pub unsuccessful_expectations: usize,
    /// Successful share in percent, null when nothing was evaluated
    pub success_percent: Option<f64>,
}

impl ValidationStatistics {
    /// Computes statistics over a list of results.
    pub fn from_results(results: &[ExpectationResult]) -> Self {
        let evaluated_expectations = results.len();
        let successful_expectations = results.iter().filter(|result| result.success).count();
        let success_percent = (evaluated_expectations > 0)
            .then(|| successful_expectations as f64 / evaluated_expectations as f64 * 100.0);

        Self {
            evaluated_expectations,
            successful_expectations,
            unsuccessful_expectations: evaluated_expectations - successful_expectations,
            success_percent,
        }
    }
}

/// The outcome of replaying an expectation suite against a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// True when every expectation held
    pub success: bool,
    /// When the replay ran (RFC 3339)
    pub timestamp: String,
    pub statistics: ValidationStatistics,
    /// Per-expectation results, in suite order
    pub results: Vec<ExpectationResult>,
}

impl ValidationReport {
    /// Builds a report stamped with the current time.
    pub fn new(results: Vec<ExpectationResult>) -> Self {
        let statistics = ValidationStatistics::from_results(&results);
        Self {
            success: statistics.unsuccessful_expectations == 0,
            timestamp: chrono::Utc::now().to_rfc3339(),
            statistics,
            results,
        }
    }

    /// Returns the results that did not hold.
    pub fn failures(&self) -> impl Iterator<Item = &ExpectationResult> {
        self.results.iter().filter(|result| !result.success)
    }

    /// Formats the report as JSON.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use term_expect::core::ValidationReport;
    ///
    /// let report = ValidationReport::new(Vec::new());
    /// let json = report.to_json().unwrap();
    /// assert!(json.contains("\"success\":true"));
    /// ```
    pub fn to_json(&self) -> crate::prelude::Result<String> {
        use crate::formatters::{JsonFormatter, ResultFormatter};
        JsonFormatter::new().format(self)
    }

    /// Formats the report as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> crate::prelude::Result<String> {
        use crate::formatters::{JsonFormatter, ResultFormatter};
        JsonFormatter::new().with_pretty(true).format(self)
    }

    /// Formats the report for terminal output.
    pub fn to_human(&self) -> crate::prelude::Result<String> {
        use crate::formatters::{HumanFormatter, ResultFormatter};
        HumanFormatter::new().format(self)
    }
}
