//! Result shaping.
//!
//! Pure functions that turn raw strategy outcomes into result objects
//! truncated to a [`ResultFormat`]. Nothing here touches the provider or
//! can fail: degenerate inputs (empty columns, all-missing columns) produce
//! `None` percentages instead of errors.

use super::result::{
    BasicDetail, ColumnAggregateResultObj, ColumnMapResultObj, CompleteDetail, ResultObj,
    SummaryDetail, UnexpectedCount,
};
use super::result_format::{ResultFormat, ResultFormatTier};
use serde_json::{Map, Value};

/// The un-shaped product of the column map strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOutcome {
    pub element_count: usize,
    pub missing_count: usize,
    /// Row indices of non-missing elements that failed the predicate
    pub unexpected_index_list: Vec<usize>,
    /// Values of those elements, aligned with `unexpected_index_list`
    pub unexpected_value_list: Vec<Value>,
    pub success: bool,
}

impl MapOutcome {
    pub fn unexpected_count(&self) -> usize {
        self.unexpected_value_list.len()
    }

    /// Number of non-missing elements.
    pub fn nonmissing_count(&self) -> usize {
        self.element_count - self.missing_count
    }
}

/// The un-shaped product of the column aggregate strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOutcome {
    pub success: bool,
    pub observed: Map<String, Value>,
    pub element_count: usize,
    pub missing_count: usize,
}

/// Divides two counts, returning `None` for a zero denominator.
pub fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

/// Builds a frequency table over `values`, ordered by first occurrence.
pub fn partial_unexpected_counts(values: &[Value]) -> Vec<UnexpectedCount> {
    let mut counts: Vec<UnexpectedCount> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|entry| &entry.value == value) {
            Some(entry) => entry.count += 1,
            None => counts.push(UnexpectedCount {
                value: value.clone(),
                count: 1,
            }),
        }
    }
    counts
}

/// Shapes a column map outcome.
///
/// Returns `None` at `BOOLEAN_ONLY`.
pub fn shape_column_map(outcome: &MapOutcome, format: &ResultFormat) -> Option<ResultObj> {
    let tier = format.tier;
    if tier == ResultFormatTier::BooleanOnly {
        return None;
    }

    let limit = format
        .partial_unexpected_count
        .min(outcome.unexpected_count());
    let partial_values = &outcome.unexpected_value_list[..limit];
    let partial_indices = &outcome.unexpected_index_list[..limit];

    let basic = BasicDetail {
        unexpected_count: outcome.unexpected_count(),
        unexpected_percent: ratio(outcome.unexpected_count(), outcome.element_count),
        unexpected_percent_nonmissing: ratio(
            outcome.unexpected_count(),
            outcome.nonmissing_count(),
        ),
        partial_unexpected_list: partial_values.to_vec(),
    };

    let summary = tier
        .is_at_least(ResultFormatTier::Summary)
        .then(|| SummaryDetail {
            partial_unexpected_index_list: partial_indices.to_vec(),
            partial_unexpected_counts: partial_unexpected_counts(partial_values),
        });

    let complete = tier
        .is_at_least(ResultFormatTier::Complete)
        .then(|| CompleteDetail {
            unexpected_list: outcome.unexpected_value_list.clone(),
            unexpected_index_list: outcome.unexpected_index_list.clone(),
        });

    Some(ResultObj::ColumnMap(ColumnMapResultObj {
        element_count: outcome.element_count,
        missing_count: outcome.missing_count,
        missing_percent: ratio(outcome.missing_count, outcome.element_count),
        basic: Some(basic),
        summary,
        complete,
    }))
}

/// Shapes a column aggregate outcome.
///
/// The computation's own fields are kept verbatim, except that the counts
/// added here replace any fields of the same name. Returns `None` at
/// `BOOLEAN_ONLY`.
pub fn shape_column_aggregate(outcome: AggregateOutcome, format: &ResultFormat) -> Option<ResultObj> {
    if format.tier == ResultFormatTier::BooleanOnly {
        return None;
    }

    let mut observed = outcome.observed;
    for key in ["element_count", "missing_count", "missing_percent"] {
        observed.remove(key);
    }

    Some(ResultObj::ColumnAggregate(ColumnAggregateResultObj {
        observed,
        element_count: outcome.element_count,
        missing_count: outcome.missing_count,
        missing_percent: ratio(outcome.missing_count, outcome.element_count),
    }))
}

/// Shapes the free-form statistics of a generic expectation.
pub fn shape_custom(result_obj: Option<Map<String, Value>>, format: &ResultFormat) -> Option<ResultObj> {
    if format.tier == ResultFormatTier::BooleanOnly {
        return None;
    }
    result_obj.map(ResultObj::Custom)
}
