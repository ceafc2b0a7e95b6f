//! Expectation suite: the per-dataset record of expectation calls.

use super::arguments::{Kwargs, ReservedKey};
use super::result_format::{ResultFormat, DEFAULT_PARTIAL_UNEXPECTED_COUNT};
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A recorded expectation invocation.
///
/// # Examples
///
/// ```rust
/// use term_expect::core::ExpectationConfig;
/// use serde_json::json;
///
/// let config: ExpectationConfig = serde_json::from_value(json!({
///     "expectation_type": "expect_column_values_to_be_between",
///     "kwargs": {"column": "age", "min_value": 0, "max_value": 120}
/// }))
/// .unwrap();
///
/// assert_eq!(config.kwargs["column"], json!("age"));
/// assert!(config.meta.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationConfig {
    /// Registered name of the expectation
    pub expectation_type: String,
    /// Domain arguments the call was evaluated with
    pub kwargs: Kwargs,
    /// Opaque caller metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ExpectationConfig {
    /// Creates a record without metadata.
    pub fn new(expectation_type: impl Into<String>, kwargs: Kwargs) -> Self {
        Self {
            expectation_type: expectation_type.into(),
            kwargs,
            meta: None,
        }
    }
}

/// The ordered list of recorded invocations of one dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectationSuiteConfig {
    pub expectations: Vec<ExpectationConfig>,
}

impl ExpectationSuiteConfig {
    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }

    /// Serializes the suite as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a suite from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Mutable suite state owned by a dataset.
///
/// Holds the append-only invocation log and the default expectation
/// arguments consulted on every call. Both are only changed through `&mut`
/// methods, so sharing a dataset across threads requires external locking.
#[derive(Debug, Clone)]
pub struct ExpectationSuite {
    expectations: Vec<ExpectationConfig>,
    default_expectation_args: Kwargs,
}

impl ExpectationSuite {
    /// Creates an empty suite with the standard defaults and `result_format` set to `format`.
    pub fn new(format: ResultFormat) -> Self {
        let mut default_expectation_args = Kwargs::new();
        default_expectation_args.insert(
            ReservedKey::IncludeConfig.as_str().to_string(),
            Value::Bool(false),
        );
        default_expectation_args.insert(
            ReservedKey::CatchExceptions.as_str().to_string(),
            Value::Bool(false),
        );
        let format_value = if format.partial_unexpected_count == DEFAULT_PARTIAL_UNEXPECTED_COUNT {
            Value::from(format.tier)
        } else {
            Value::from(format)
        };
        default_expectation_args.insert(
            ReservedKey::ResultFormat.as_str().to_string(),
            format_value,
        );

        Self {
            expectations: Vec::new(),
            default_expectation_args,
        }
    }

    /// Appends an invocation record.
    pub fn record(&mut self, config: ExpectationConfig) {
        self.expectations.push(config);
    }

    /// Returns the recorded invocations in call order.
    pub fn expectations(&self) -> &[ExpectationConfig] {
        &self.expectations
    }

    /// Returns a snapshot of the suite.
    pub fn to_config(&self) -> ExpectationSuiteConfig {
        ExpectationSuiteConfig {
            expectations: self.expectations.clone(),
        }
    }

    /// Returns the default expectation arguments.
    pub fn default_expectation_args(&self) -> &Kwargs {
        &self.default_expectation_args
    }

    /// Sets one default expectation argument.
    ///
    /// Values for reserved controls are validated here, so a bad default
    /// fails at the setter rather than on every later call. Setting a
    /// control to `null` removes the default.
    pub fn set_default_expectation_argument(&mut self, name: &str, value: Value) -> Result<()> {
        match ReservedKey::from_name(name) {
            Some(ReservedKey::ResultFormat) if !value.is_null() => {
                ResultFormat::from_value(&value, DEFAULT_PARTIAL_UNEXPECTED_COUNT)?;
            }
            Some(ReservedKey::IncludeConfig | ReservedKey::CatchExceptions)
                if !value.is_null() && !value.is_boolean() =>
            {
                return Err(TermError::Configuration(format!(
                    "default for '{name}' must be a boolean, found {value}"
                )));
            }
            _ => {}
        }

        if value.is_null() && ReservedKey::is_reserved(name) {
            self.default_expectation_args.remove(name);
        } else {
            self.default_expectation_args.insert(name.to_string(), value);
        }
        Ok(())
    }
}

impl Default for ExpectationSuite {
    fn default() -> Self {
        Self::new(ResultFormat::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ResultFormatTier;
    use serde_json::json;

    #[test]
    fn test_initial_defaults() {
        let suite = ExpectationSuite::default();
        assert_eq!(
            Value::Object(suite.default_expectation_args().clone()),
            json!({"include_config": false, "catch_exceptions": false, "result_format": "BASIC"})
        );
        assert!(suite.expectations().is_empty());
    }

    #[test]
    fn test_initial_defaults_with_custom_partial_limit() {
        let suite = ExpectationSuite::new(
            ResultFormat::new(ResultFormatTier::Summary).with_partial_unexpected_count(5),
        );
        assert_eq!(
            suite.default_expectation_args()["result_format"],
            json!({"result_obj_format": "SUMMARY", "partial_unexpected_count": 5})
        );
    }

    #[test]
    fn test_record_preserves_order() {
        let mut suite = ExpectationSuite::default();
        suite.record(ExpectationConfig::new("first", Kwargs::new()));
        suite.record(ExpectationConfig::new("second", Kwargs::new()));

        let names: Vec<&str> = suite
            .expectations()
            .iter()
            .map(|config| config.expectation_type.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(suite.to_config().len(), 2);
    }

    #[test]
    fn test_setter_validates_controls() {
        let mut suite = ExpectationSuite::default();
        suite
            .set_default_expectation_argument("result_format", json!("COMPLETE"))
            .unwrap();
        assert_eq!(suite.default_expectation_args()["result_format"], json!("COMPLETE"));

        let err = suite
            .set_default_expectation_argument("result_format", json!("LOUD"))
            .unwrap_err();
        assert!(matches!(err, TermError::UnknownResultFormat(_)));
        assert_eq!(suite.default_expectation_args()["result_format"], json!("COMPLETE"));

        assert!(suite
            .set_default_expectation_argument("catch_exceptions", json!("yes"))
            .is_err());

        suite
            .set_default_expectation_argument("mostly", json!(0.9))
            .unwrap();
        assert_eq!(suite.default_expectation_args()["mostly"], json!(0.9));
    }

    #[test]
    fn test_null_clears_control_default() {
        let mut suite = ExpectationSuite::default();
        suite
            .set_default_expectation_argument("result_format", Value::Null)
            .unwrap();
        assert!(!suite.default_expectation_args().contains_key("result_format"));
    }

    #[test]
    fn test_suite_config_json() {
        let mut kwargs = Kwargs::new();
        kwargs.insert("column".to_string(), json!("a"));
        let config = ExpectationSuiteConfig {
            expectations: vec![ExpectationConfig::new("expect_column_values_to_be_odd", kwargs)],
        };

        let json = config.to_json_pretty().unwrap();
        let parsed = ExpectationSuiteConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
        assert!(!json.contains("meta"));
    }
}
