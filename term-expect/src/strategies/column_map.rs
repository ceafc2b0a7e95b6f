//! Column map strategy: per-element predicates.

use super::ColumnMapFn;
use crate::core::shaping::MapOutcome;
use crate::core::{Kwargs, ResolvedArgs};
use crate::prelude::*;
use crate::provider::TabularProvider;
use serde_json::Value;
use tracing::{debug, instrument};

/// A column map call with its column and `mostly` threshold validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapPlan {
    column: String,
    mostly: Option<f64>,
}

impl ColumnMapPlan {
    /// Extracts and validates `column` and `mostly` from resolved arguments.
    ///
    /// # Errors
    ///
    /// Returns a caller fault if `column` is not a string or `mostly` is not
    /// a number in `[0, 1]`.
    pub fn bind(expectation: &str, args: &ResolvedArgs) -> Result<Self> {
        let column = column_argument(expectation, args)?;
        let mostly = parse_mostly(args.get("mostly"))?;
        Ok(Self { column, mostly })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn mostly(&self) -> Option<f64> {
        self.mostly
    }

    /// Runs `predicate` over every non-missing element of the column.
    #[instrument(skip(self, provider, predicate, kwargs), fields(
        strategy = "column_map",
        column = %self.column,
        mostly = ?self.mostly
    ))]
    pub fn evaluate(
        &self,
        provider: &dyn TabularProvider,
        predicate: &ColumnMapFn,
        kwargs: &Kwargs,
    ) -> Result<MapOutcome> {
        if !provider.has_column(&self.column) {
            return Err(TermError::ColumnNotFound {
                column: self.column.clone(),
            });
        }

        let mut unexpected_index_list = Vec::new();
        let mut unexpected_value_list = Vec::new();
        let mapped = provider.map_elements(&self.column, &mut |index, value| {
            let passed = predicate(value, kwargs)?;
            if !passed {
                unexpected_index_list.push(index);
                unexpected_value_list.push(value.clone());
            }
            Ok(passed)
        })?;

        let element_count = mapped.len();
        let missing_count = mapped.iter().filter(|outcome| outcome.is_none()).count();
        let expected_count = mapped.iter().filter(|outcome| **outcome == Some(true)).count();
        let success = meets_threshold(expected_count, element_count - missing_count, self.mostly);

        debug!(
            data.elements = element_count,
            data.missing = missing_count,
            data.unexpected = unexpected_value_list.len(),
            success,
            "Evaluated column map predicate"
        );

        Ok(MapOutcome {
            element_count,
            missing_count,
            unexpected_index_list,
            unexpected_value_list,
            success,
        })
    }
}

pub(crate) fn column_argument(expectation: &str, args: &ResolvedArgs) -> Result<String> {
    match args.get("column") {
        Some(Value::String(column)) => Ok(column.clone()),
        Some(other) => Err(TermError::invalid_argument(
            expectation,
            format!("column must be a string, found {other}"),
        )),
        None => Err(TermError::missing_argument(expectation, "column")),
    }
}

/// Parses a `mostly` argument.
///
/// Absent or `null` means every non-missing element must pass.
///
/// ```rust
/// use term_expect::strategies::parse_mostly;
/// use serde_json::json;
///
/// assert_eq!(parse_mostly(Some(&json!(0.6))).unwrap(), Some(0.6));
/// assert_eq!(parse_mostly(None).unwrap(), None);
/// assert!(parse_mostly(Some(&json!(1.5))).is_err());
/// ```
pub fn parse_mostly(value: Option<&Value>) -> Result<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let mostly = value
                .as_f64()
                .ok_or_else(|| TermError::InvalidMostly(value.to_string()))?;
            if (0.0..=1.0).contains(&mostly) {
                Ok(Some(mostly))
            } else {
                Err(TermError::InvalidMostly(value.to_string()))
            }
        }
    }
}

/// Decides success from the expected and non-missing counts.
///
/// With no non-missing elements the expectation holds vacuously.
pub fn meets_threshold(expected_count: usize, nonmissing_count: usize, mostly: Option<f64>) -> bool {
    if nonmissing_count == 0 {
        return true;
    }
    match mostly {
        Some(mostly) => expected_count as f64 / nonmissing_count as f64 >= mostly,
        None => expected_count == nonmissing_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{resolve_arguments, ExpectationArgs, ResultFormat};
    use crate::test_fixtures::odd_values_table;
    use serde_json::json;

    fn is_odd(value: &Value, _: &Kwargs) -> Result<bool> {
        Ok(value.as_f64().unwrap_or_default() % 2.0 != 0.0)
    }

    fn plan(args: ExpectationArgs) -> Result<ColumnMapPlan> {
        let resolved = resolve_arguments(
            "expect_column_values_to_be_odd",
            &["column".to_string(), "mostly".to_string()],
            &["column".to_string()],
            &args,
            &Kwargs::new(),
            ResultFormat::default(),
        )?;
        ColumnMapPlan::bind("expect_column_values_to_be_odd", &resolved)
    }

    #[test]
    fn test_threshold() {
        assert!(meets_threshold(0, 0, None));
        assert!(meets_threshold(0, 0, Some(1.0)));
        assert!(meets_threshold(10, 10, None));
        assert!(!meets_threshold(8, 10, None));
        assert!(meets_threshold(8, 10, Some(0.6)));
        assert!(meets_threshold(8, 10, Some(0.8)));
        assert!(!meets_threshold(8, 10, Some(0.81)));
    }

    #[test]
    fn test_mostly_validation() {
        assert!(matches!(
            parse_mostly(Some(&json!(-0.1))),
            Err(TermError::InvalidMostly(_))
        ));
        assert!(matches!(
            parse_mostly(Some(&json!("most"))),
            Err(TermError::InvalidMostly(_))
        ));
        assert_eq!(parse_mostly(Some(&json!(0))).unwrap(), Some(0.0));
        assert_eq!(parse_mostly(Some(&Value::Null)).unwrap(), None);
    }

    #[test]
    fn test_bind_rejects_non_string_column() {
        let err = plan(ExpectationArgs::new().positional(7)).unwrap_err();
        assert!(err.is_caller_fault());
    }

    #[test]
    fn test_mixed_missing_outcome() {
        let table = odd_values_table();
        let plan = plan(ExpectationArgs::new().positional("mixed_missing")).unwrap();
        let outcome = plan.evaluate(&table, &is_odd, &Kwargs::new()).unwrap();

        assert_eq!(outcome.element_count, 10);
        assert_eq!(outcome.missing_count, 3);
        assert_eq!(outcome.unexpected_index_list, vec![5, 6]);
        assert_eq!(outcome.unexpected_value_list, vec![json!(2.0), json!(4.0)]);
        assert!(!outcome.success);
        // missing + unexpected + expected partition the column
        assert_eq!(outcome.missing_count + outcome.unexpected_count() + 5, 10);
    }

    #[test]
    fn test_mostly_relaxes_success() {
        let table = odd_values_table();
        let plan = plan(ExpectationArgs::new().positional("mostly_odd").arg("mostly", 0.6)).unwrap();
        let outcome = plan.evaluate(&table, &is_odd, &Kwargs::new()).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.unexpected_count(), 2);
    }

    #[test]
    fn test_all_missing_succeeds_vacuously() {
        let table = odd_values_table();
        let plan = plan(ExpectationArgs::new().positional("all_missing")).unwrap();
        let outcome = plan.evaluate(&table, &is_odd, &Kwargs::new()).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.missing_count, 10);
        assert_eq!(outcome.unexpected_count(), 0);
    }

    #[test]
    fn test_unknown_column() {
        let table = odd_values_table();
        let plan = plan(ExpectationArgs::new().positional("nope")).unwrap();
        let err = plan.evaluate(&table, &is_odd, &Kwargs::new()).unwrap_err();
        assert!(matches!(err, TermError::ColumnNotFound { .. }));
        assert!(!err.is_caller_fault());
    }

    #[test]
    fn test_predicate_error_aborts() {
        let table = odd_values_table();
        let plan = plan(ExpectationArgs::new().positional("all_even")).unwrap();
        let failing = |value: &Value, _: &Kwargs| -> Result<bool> {
            if value.as_i64() == Some(6) {
                Err(TermError::computation("ZeroDivisionError", "division by zero"))
            } else {
                Ok(true)
            }
        };
        let err = plan.evaluate(&table, &failing, &Kwargs::new()).unwrap_err();
        assert_eq!(err.kind(), "ZeroDivisionError");
    }
}
