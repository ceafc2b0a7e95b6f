//! Expectation result types.
//!
//! These types serialize to the JSON shape callers consume: optional parts
//! that are absent at the requested tier are omitted entirely, while numeric
//! statistics that are undefined (a zero denominator) serialize as `null`.

use super::capture::Fault;
use super::suite::ExpectationConfig;
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The externally visible outcome of one expectation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectationResult {
    /// Whether the expectation held
    pub success: bool,
    /// Statistics shaped to the requested tier; absent at `BOOLEAN_ONLY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_obj: Option<ResultObj>,
    /// The invocation record, present when `include_config` was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expectation_config: Option<ExpectationConfig>,
    /// Fault details, present only when a fault was captured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_info: Option<ExceptionInfo>,
}

impl ExpectationResult {
    /// Creates a result carrying only the success flag.
    pub fn new(success: bool) -> Self {
        Self {
            success,
            result_obj: None,
            expectation_config: None,
            exception_info: None,
        }
    }

    /// Creates a failed result describing a captured fault.
    pub fn from_fault(fault: Fault) -> Self {
        Self {
            success: false,
            result_obj: None,
            expectation_config: None,
            exception_info: Some(fault.into_exception_info()),
        }
    }

    /// Sets the shaped statistics.
    pub fn with_result_obj(mut self, result_obj: Option<ResultObj>) -> Self {
        self.result_obj = result_obj;
        self
    }

    /// Returns true if a fault was captured during evaluation.
    pub fn raised_exception(&self) -> bool {
        self.exception_info
            .as_ref()
            .is_some_and(|info| info.raised_exception)
    }

    /// Returns the column map statistics, if this result carries them.
    pub fn column_map(&self) -> Option<&ColumnMapResultObj> {
        match &self.result_obj {
            Some(ResultObj::ColumnMap(obj)) => Some(obj),
            _ => None,
        }
    }

    /// Returns the column aggregate statistics, if this result carries them.
    pub fn column_aggregate(&self) -> Option<&ColumnAggregateResultObj> {
        match &self.result_obj {
            Some(ResultObj::ColumnAggregate(obj)) => Some(obj),
            _ => None,
        }
    }

    /// Converts the result into a JSON value.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Formats the result as compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Formats the result as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Statistics attached to a result, shaped by strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultObj {
    /// Per-element statistics from the column map strategy
    ColumnMap(ColumnMapResultObj),
    /// Whole-column statistics from the column aggregate strategy
    ColumnAggregate(ColumnAggregateResultObj),
    /// Free-form statistics returned by a generic expectation
    Custom(Map<String, Value>),
}

/// Column map statistics.
///
/// The base counts are always present; each tier adds one flattened block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMapResultObj {
    /// Total number of elements, missing included
    pub element_count: usize,
    /// Number of missing elements
    pub missing_count: usize,
    /// `missing_count / element_count`, null for an empty column
    pub missing_percent: Option<f64>,
    /// Present at `BASIC` and above
    #[serde(flatten)]
    pub basic: Option<BasicDetail>,
    /// Present at `SUMMARY` and above
    #[serde(flatten)]
    pub summary: Option<SummaryDetail>,
    /// Present at `COMPLETE`
    #[serde(flatten)]
    pub complete: Option<CompleteDetail>,
}

/// Unexpected counts and percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicDetail {
    pub unexpected_count: usize,
    /// `unexpected_count / element_count`, null for an empty column
    pub unexpected_percent: Option<f64>,
    /// `unexpected_count / (element_count - missing_count)`, null when nothing is present
    pub unexpected_percent_nonmissing: Option<f64>,
    /// The first unexpected values, in row order
    pub partial_unexpected_list: Vec<Value>,
}

/// Row indices and value frequencies for the partial list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryDetail {
    pub partial_unexpected_index_list: Vec<usize>,
    pub partial_unexpected_counts: Vec<UnexpectedCount>,
}

/// Every unexpected value and row index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteDetail {
    pub unexpected_list: Vec<Value>,
    pub unexpected_index_list: Vec<usize>,
}

/// One entry of a partial unexpected frequency table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnexpectedCount {
    pub value: Value,
    pub count: usize,
}

/// Column aggregate statistics.
///
/// The caller's own fields (usually `observed_value`) are flattened in next
/// to the element and missing counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnAggregateResultObj {
    /// Fields returned by the aggregate computation
    #[serde(flatten)]
    pub observed: Map<String, Value>,
    pub element_count: usize,
    pub missing_count: usize,
    pub missing_percent: Option<f64>,
}

impl ColumnAggregateResultObj {
    /// Returns the `observed_value` field, if the computation reported one.
    pub fn observed_value(&self) -> Option<&Value> {
        self.observed.get("observed_value")
    }
}

/// Details of a captured fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    pub raised_exception: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_message: Option<String>,
    /// Formatted trace; first line is `Traceback (most recent call last):`
    /// and the last non-empty line is `<Kind>: <message>`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_traceback: Option<String>,
}
