//! Built-in expectation catalog.
//!
//! These are registered on every [`Dataset`](crate::dataset::Dataset) unless
//! [`DatasetConfig::with_builtins`](crate::dataset::DatasetConfig::with_builtins)
//! turns them off. They double as reference implementations of the two
//! column strategies.
//!
//! | Name | Strategy | Parameters |
//! |------|----------|------------|
//! | `expect_column_values_to_be_between` | column map | `min_value`, `max_value` |
//! | `expect_column_values_to_be_in_set` | column map | `value_set` |
//! | `expect_column_values_to_match_regex` | column map | `regex` |
//! | `expect_column_median_to_be_between` | column aggregate | `min_value`, `max_value` |
//! | `expect_column_mean_to_be_between` | column aggregate | `min_value`, `max_value` |
//!
//! Either bound of a range may be null or absent for a one-sided check.

use crate::core::{ExpectationRegistry, Kwargs};
use crate::prelude::*;
use crate::provider::{element_as_f64, float_element, json_type_name, ColumnView};
use crate::strategies::AggregateObservation;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

pub const EXPECT_VALUES_BETWEEN: &str = "expect_column_values_to_be_between";
pub const EXPECT_VALUES_IN_SET: &str = "expect_column_values_to_be_in_set";
pub const EXPECT_VALUES_MATCH_REGEX: &str = "expect_column_values_to_match_regex";
pub const EXPECT_MEDIAN_BETWEEN: &str = "expect_column_median_to_be_between";
pub const EXPECT_MEAN_BETWEEN: &str = "expect_column_mean_to_be_between";

/// Upper bound on cached regex patterns; the cache is cleared when full.
const MAX_CACHED_PATTERNS: usize = 256;

/// Cache for compiled regex patterns to avoid recompiling per element
static REGEX_CACHE: Lazy<RwLock<HashMap<String, Regex>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Registers the built-in catalog.
pub fn register_builtins(registry: &mut ExpectationRegistry) -> Result<()> {
    registry.register_column_map_expectation(
        EXPECT_VALUES_BETWEEN,
        &["min_value", "max_value"],
        &[],
        |value, kwargs| {
            let bounds = Bounds::from_kwargs(EXPECT_VALUES_BETWEEN, kwargs)?;
            Ok(bounds.contains(numeric(value)?))
        },
    )?;

    registry.register_column_map_expectation(
        EXPECT_VALUES_IN_SET,
        &["value_set"],
        &["value_set"],
        |value, kwargs| {
            let value_set = value_set(kwargs)?;
            Ok(value_set.iter().any(|candidate| same_value(candidate, value)))
        },
    )?;

    registry.register_column_map_expectation(
        EXPECT_VALUES_MATCH_REGEX,
        &["regex"],
        &["regex"],
        |value, kwargs| {
            let text = value.as_str().ok_or_else(|| TermError::TypeMismatch {
                expected: "string".to_string(),
                found: json_type_name(value).to_string(),
            })?;
            regex_is_match(pattern(kwargs)?, text)
        },
    )?;

    registry.register_column_aggregate_expectation(
        EXPECT_MEDIAN_BETWEEN,
        &["min_value", "max_value"],
        &[],
        |column, kwargs| {
            let bounds = Bounds::from_kwargs(EXPECT_MEDIAN_BETWEEN, kwargs)?;
            observe(column.median()?, bounds)
        },
    )?;

    registry.register_column_aggregate_expectation(
        EXPECT_MEAN_BETWEEN,
        &["min_value", "max_value"],
        &[],
        |column: &ColumnView<'_>, kwargs: &Kwargs| {
            let bounds = Bounds::from_kwargs(EXPECT_MEAN_BETWEEN, kwargs)?;
            observe(column.mean()?, bounds)
        },
    )?;

    debug!(count = 5, "Registered built-in expectations");
    Ok(())
}

/// An inclusive, possibly one-sided numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    /// Reads `min_value` and `max_value`.
    ///
    /// # Errors
    ///
    /// Returns a caller fault if a bound is not numeric, both bounds are
    /// missing, or `min_value > max_value`.
    pub fn from_kwargs(expectation: &str, kwargs: &Kwargs) -> Result<Self> {
        let min = bound(expectation, kwargs, "min_value")?;
        let max = bound(expectation, kwargs, "max_value")?;
        match (min, max) {
            (None, None) => Err(TermError::invalid_argument(
                expectation,
                "min_value and max_value cannot both be null",
            )),
            (Some(min), Some(max)) if min > max => Err(TermError::invalid_argument(
                expectation,
                format!("min_value {min} is greater than max_value {max}"),
            )),
            _ => Ok(Self { min, max }),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

fn bound(expectation: &str, kwargs: &Kwargs, name: &str) -> Result<Option<f64>> {
    match kwargs.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or_else(|| {
            TermError::invalid_argument(expectation, format!("{name} must be a number, found {value}"))
        }),
    }
}

fn numeric(value: &Value) -> Result<f64> {
    element_as_f64(value).ok_or_else(|| TermError::TypeMismatch {
        expected: "number".to_string(),
        found: json_type_name(value).to_string(),
    })
}

fn value_set(kwargs: &Kwargs) -> Result<&Vec<Value>> {
    match kwargs.get("value_set") {
        Some(Value::Array(values)) => Ok(values),
        Some(other) => Err(TermError::invalid_argument(
            EXPECT_VALUES_IN_SET,
            format!("value_set must be a list, found {other}"),
        )),
        None => Err(TermError::missing_argument(EXPECT_VALUES_IN_SET, "value_set")),
    }
}

/// Compares numbers by value so that `2` matches `2.0`.
fn same_value(left: &Value, right: &Value) -> bool {
    match (element_as_f64(left), element_as_f64(right)) {
        (Some(left), Some(right)) => left == right,
        _ => left == right,
    }
}

fn pattern(kwargs: &Kwargs) -> Result<&str> {
    match kwargs.get("regex") {
        Some(Value::String(pattern)) => Ok(pattern),
        Some(other) => Err(TermError::invalid_argument(
            EXPECT_VALUES_MATCH_REGEX,
            format!("regex must be a string, found {other}"),
        )),
        None => Err(TermError::missing_argument(EXPECT_VALUES_MATCH_REGEX, "regex")),
    }
}

fn regex_is_match(pattern: &str, text: &str) -> Result<bool> {
    cached_is_match(&REGEX_CACHE, pattern, text)
}

fn cached_is_match(cache: &RwLock<HashMap<String, Regex>>, pattern: &str, text: &str) -> Result<bool> {
    {
        let cache = cache.read().map_err(|_| {
            TermError::Internal("Failed to acquire read lock on regex cache".to_string())
        })?;
        if let Some(regex) = cache.get(pattern) {
            return Ok(regex.is_match(text));
        }
    }

    let regex = Regex::new(pattern).map_err(|e| {
        TermError::invalid_argument(EXPECT_VALUES_MATCH_REGEX, format!("invalid regex: {e}"))
    })?;
    let is_match = regex.is_match(text);
    let mut cache = cache.write().map_err(|_| {
        TermError::Internal("Failed to acquire write lock on regex cache".to_string())
    })?;
    if cache.len() >= MAX_CACHED_PATTERNS {
        debug!(patterns = cache.len(), "Regex cache full, clearing");
        cache.clear();
    }
    cache.insert(pattern.to_string(), regex);
    Ok(is_match)
}

fn observe(statistic: Option<f64>, bounds: Bounds) -> Result<AggregateObservation> {
    let success = statistic.is_some_and(|value| bounds.contains(value));
    Ok(AggregateObservation::new(success).with_observed_value(statistic.map(float_element)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kwargs(value: Value) -> Kwargs {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_bounds() {
        let bounds = Bounds::from_kwargs("x", &kwargs(json!({"min_value": 1, "max_value": 3}))).unwrap();
        assert!(bounds.contains(1.0));
        assert!(bounds.contains(3.0));
        assert!(!bounds.contains(3.5));

        let lower_only = Bounds::from_kwargs("x", &kwargs(json!({"min_value": 1, "max_value": null}))).unwrap();
        assert!(lower_only.contains(1e9));
        assert!(!lower_only.contains(0.0));
    }

    #[test]
    fn test_bounds_errors_are_caller_faults() {
        for args in [
            json!({}),
            json!({"min_value": "one"}),
            json!({"min_value": 5, "max_value": 1}),
        ] {
            let err = Bounds::from_kwargs("x", &kwargs(args)).unwrap_err();
            assert!(err.is_caller_fault(), "{err}");
        }
    }

    #[test]
    fn test_same_value_is_numeric_aware() {
        assert!(same_value(&json!(2), &json!(2.0)));
        assert!(same_value(&json!("a"), &json!("a")));
        assert!(!same_value(&json!("2"), &json!(2)));
    }

    #[test]
    fn test_regex_cache() {
        assert!(regex_is_match(r"^\d+$", "123").unwrap());
        assert!(!regex_is_match(r"^\d+$", "12a").unwrap());
        assert!(REGEX_CACHE.read().unwrap().contains_key(r"^\d+$"));

        let err = regex_is_match("(", "x").unwrap_err();
        assert!(err.is_caller_fault());
    }

    #[test]
    fn test_regex_cache_is_bounded() {
        let cache = RwLock::new(HashMap::new());
        for n in 0..MAX_CACHED_PATTERNS + 10 {
            assert!(cached_is_match(&cache, &format!("^p{n}$"), &format!("p{n}")).unwrap());
            assert!(cache.read().unwrap().len() <= MAX_CACHED_PATTERNS);
        }
        // the most recent pattern survives a clear
        let cache = cache.read().unwrap();
        assert_eq!(cache.len(), 10);
        assert!(cache.contains_key(&format!("^p{}$", MAX_CACHED_PATTERNS + 9)));
    }

    #[test]
    fn test_infinite_elements_are_numeric() {
        let bounds = Bounds { min: Some(0.0), max: None };
        assert!(bounds.contains(numeric(&json!("Infinity")).unwrap()));
        assert!(!bounds.contains(numeric(&json!("-Infinity")).unwrap()));
        assert!(numeric(&json!("inf")).is_err());
        assert!(same_value(&json!("Infinity"), &json!("Infinity")));
    }

    #[test]
    fn test_observe_infinite_statistic() {
        let bounds = Bounds { min: Some(0.0), max: None };
        let observation = observe(Some(f64::INFINITY), bounds).unwrap();
        assert!(observation.success);
        assert_eq!(observation.result_obj["observed_value"], json!("Infinity"));

        let observation = observe(Some(f64::NAN), bounds).unwrap();
        assert!(!observation.success);
        assert_eq!(observation.result_obj["observed_value"], Value::Null);
    }

    #[test]
    fn test_observe_missing_statistic_fails() {
        let bounds = Bounds { min: Some(0.0), max: None };
        let observation = observe(None, bounds).unwrap();
        assert!(!observation.success);
        assert_eq!(observation.result_obj["observed_value"], Value::Null);
    }

    #[test]
    fn test_register_builtins() {
        let mut registry = ExpectationRegistry::new();
        register_builtins(&mut registry).unwrap();
        assert_eq!(registry.len(), 5);
        assert_eq!(
            registry.get(EXPECT_VALUES_IN_SET).unwrap().params(),
            ["column", "value_set", "mostly"]
        );
    }
}
