//! Execution strategies.
//!
//! A strategy decides how an expectation's body is driven over the data and
//! how its raw outcome is shaped:
//!
//! - [`Strategy::Generic`]: the body sees the whole provider and reports
//!   success plus optional free-form statistics.
//! - [`Strategy::ColumnMap`]: the body is a per-element predicate; the
//!   strategy tracks missing and unexpected elements and applies `mostly`.
//! - [`Strategy::ColumnAggregate`]: the body computes whole-column
//!   statistics; the strategy adds element and missing counts.

pub mod column_aggregate;
pub mod column_map;

pub use column_aggregate::ColumnAggregatePlan;
pub use column_map::{meets_threshold, parse_mostly, ColumnMapPlan};

use crate::core::Kwargs;
use crate::prelude::*;
use crate::provider::TabularProvider;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// How a registered expectation is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Generic,
    ColumnMap,
    ColumnAggregate,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Generic => "generic",
            Strategy::ColumnMap => "column_map",
            Strategy::ColumnAggregate => "column_aggregate",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a generic expectation body returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericOutcome {
    pub success: bool,
    pub result_obj: Option<Map<String, Value>>,
}

impl GenericOutcome {
    /// Creates an outcome without statistics.
    pub fn new(success: bool) -> Self {
        Self {
            success,
            result_obj: None,
        }
    }

    /// Adds one statistic to the result object.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.result_obj
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

/// What a column aggregate body returns.
///
/// # Examples
///
/// ```rust
/// use term_expect::strategies::AggregateObservation;
///
/// let observation = AggregateObservation::new(false).with_observed_value(6.0);
/// assert_eq!(observation.result_obj["observed_value"], serde_json::json!(6.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateObservation {
    pub success: bool,
    pub result_obj: Map<String, Value>,
}

impl AggregateObservation {
    pub fn new(success: bool) -> Self {
        Self {
            success,
            result_obj: Map::new(),
        }
    }

    /// Sets `observed_value`.
    pub fn with_observed_value(self, value: impl Into<Value>) -> Self {
        self.with_field("observed_value", value)
    }

    /// Adds one statistic to the result object.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.result_obj.insert(key.into(), value.into());
        self
    }
}

/// Body of a generic expectation.
pub type GenericFn = dyn Fn(&dyn TabularProvider, &Kwargs) -> Result<GenericOutcome> + Send + Sync;

/// Per-element predicate of a column map expectation.
pub type ColumnMapFn = dyn Fn(&Value, &Kwargs) -> Result<bool> + Send + Sync;

/// Body of a column aggregate expectation.
pub type ColumnAggregateFn = dyn Fn(&crate::provider::ColumnView<'_>, &Kwargs) -> Result<AggregateObservation>
    + Send
    + Sync;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::ColumnMap.to_string(), "column_map");
        assert_eq!(
            serde_json::to_string(&Strategy::ColumnAggregate).unwrap(),
            "\"column_aggregate\""
        );
    }

    #[test]
    fn test_generic_outcome_builder() {
        let outcome = GenericOutcome::new(true).with_field("rows", 3);
        assert!(outcome.success);
        assert_eq!(outcome.result_obj.unwrap()["rows"], json!(3));
        assert!(GenericOutcome::new(false).result_obj.is_none());
    }
}
