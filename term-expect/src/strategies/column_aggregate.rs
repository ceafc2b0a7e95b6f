//! Column aggregate strategy: whole-column statistics.

use super::column_map::column_argument;
use super::ColumnAggregateFn;
use crate::core::shaping::AggregateOutcome;
use crate::core::{Kwargs, ResolvedArgs};
use crate::prelude::*;
use crate::provider::{ColumnView, TabularProvider};
use tracing::{debug, instrument};

/// A column aggregate call with its column validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnAggregatePlan {
    column: String,
}

impl ColumnAggregatePlan {
    /// Extracts `column` from resolved arguments.
    pub fn bind(expectation: &str, args: &ResolvedArgs) -> Result<Self> {
        Ok(Self {
            column: column_argument(expectation, args)?,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Runs the aggregate body and adds element and missing counts.
    #[instrument(skip(self, provider, aggregate, kwargs), fields(
        strategy = "column_aggregate",
        column = %self.column
    ))]
    pub fn evaluate(
        &self,
        provider: &dyn TabularProvider,
        aggregate: &ColumnAggregateFn,
        kwargs: &Kwargs,
    ) -> Result<AggregateOutcome> {
        let view = ColumnView::new(provider, &self.column)?;
        let observation = aggregate(&view, kwargs)?;
        let missing_count = view.missing_count()?;

        debug!(
            data.elements = view.element_count(),
            data.missing = missing_count,
            success = observation.success,
            "Evaluated column aggregate"
        );

        Ok(AggregateOutcome {
            success: observation.success,
            observed: observation.result_obj,
            element_count: view.element_count(),
            missing_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{resolve_arguments, ExpectationArgs, ResultFormat};
    use crate::strategies::AggregateObservation;
    use crate::test_fixtures::median_table;
    use serde_json::json;

    fn median_is_odd(column: &ColumnView<'_>, _: &Kwargs) -> Result<AggregateObservation> {
        let median = column.median()?;
        let success = median.is_some_and(|median| median % 2.0 != 0.0);
        Ok(AggregateObservation::new(success).with_observed_value(median))
    }

    fn plan(column: &str) -> ColumnAggregatePlan {
        let resolved = resolve_arguments(
            "expect_column_median_to_be_odd",
            &["column".to_string()],
            &["column".to_string()],
            &ExpectationArgs::new().positional(column),
            &Kwargs::new(),
            ResultFormat::default(),
        )
        .unwrap();
        ColumnAggregatePlan::bind("expect_column_median_to_be_odd", &resolved).unwrap()
    }

    #[test]
    fn test_all_even_median() {
        let table = median_table();
        let outcome = plan("all_even")
            .evaluate(&table, &median_is_odd, &Kwargs::new())
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.observed["observed_value"], json!(6.0));
        assert_eq!(outcome.element_count, 5);
        assert_eq!(outcome.missing_count, 0);
    }

    #[test]
    fn test_missing_values_are_excluded_from_statistic() {
        let table = median_table();
        let outcome = plan("odd_missing")
            .evaluate(&table, &median_is_odd, &Kwargs::new())
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.observed["observed_value"], json!(3.0));
        assert_eq!(outcome.missing_count, 2);
    }

    #[test]
    fn test_all_missing_reports_null_observation() {
        let table = median_table();
        let outcome = plan("all_missing")
            .evaluate(&table, &median_is_odd, &Kwargs::new())
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.observed["observed_value"], serde_json::Value::Null);
        assert_eq!(outcome.missing_count, 5);
    }

    #[test]
    fn test_unknown_column() {
        let table = median_table();
        let err = plan("nope")
            .evaluate(&table, &median_is_odd, &Kwargs::new())
            .unwrap_err();
        assert!(matches!(err, TermError::ColumnNotFound { .. }));
    }
}
