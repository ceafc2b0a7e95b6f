//! Common test fixtures for expectation scenarios.
//!
//! These tables mirror the columns used throughout the unit tests: a set of
//! ten-row columns with different odd/even/missing patterns for map
//! expectations, five-row columns for median checks, and a small table with
//! one column per supported Arrow type.

use crate::provider::ArrowTable;
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use std::sync::Arc;

fn floats(values: &[Option<f64>]) -> ArrayRef {
    Arc::new(Float64Array::from(values.to_vec()))
}

fn ints(values: &[i64]) -> ArrayRef {
    Arc::new(Int64Array::from(values.to_vec()))
}

/// Ten-row columns for column map expectations.
///
/// Columns with missing values are `Float64`, so their non-missing elements
/// surface as floats (`2.0`, not `2`).
pub fn odd_values_table() -> ArrowTable {
    let none: Option<f64> = None;
    ArrowTable::try_from_columns(vec![
        ("all_odd", ints(&[1, 3, 5, 5, 5, 7, 9, 9, 9, 11])),
        ("mostly_odd", ints(&[1, 3, 5, 7, 9, 2, 4, 1, 3, 5])),
        ("all_even", ints(&[2, 4, 4, 6, 6, 6, 8, 8, 8, 8])),
        (
            "odd_missing",
            floats(&[
                Some(1.0),
                Some(3.0),
                Some(5.0),
                none,
                none,
                none,
                none,
                Some(1.0),
                Some(3.0),
                none,
            ]),
        ),
        (
            "mixed_missing",
            floats(&[
                Some(1.0),
                Some(3.0),
                Some(5.0),
                none,
                none,
                Some(2.0),
                Some(4.0),
                Some(1.0),
                Some(3.0),
                none,
            ]),
        ),
        ("all_missing", floats(&[none; 10])),
    ])
    .expect("odd values fixture is well formed")
}

/// Five-row columns for column aggregate expectations.
pub fn median_table() -> ArrowTable {
    let none: Option<f64> = None;
    ArrowTable::try_from_columns(vec![
        ("all_odd", ints(&[1, 3, 5, 7, 9])),
        ("all_even", ints(&[2, 4, 6, 8, 10])),
        (
            "odd_missing",
            floats(&[Some(1.0), Some(3.0), Some(5.0), none, none]),
        ),
        (
            "mixed_missing",
            floats(&[Some(1.0), Some(2.0), none, none, Some(6.0)]),
        ),
        ("all_missing", floats(&[none; 5])),
    ])
    .expect("median fixture is well formed")
}

/// Four rows with one column per commonly used Arrow type.
///
/// `floats` holds a null at row 1 and a `NaN` at row 2; both are missing.
pub fn mixed_types_table() -> ArrowTable {
    ArrowTable::try_from_columns(vec![
        ("floats", floats(&[Some(1.5), None, Some(f64::NAN), Some(4.5)])),
        (
            "names",
            Arc::new(StringArray::from(vec![Some("a"), Some("b"), None, Some("d")])) as ArrayRef,
        ),
        ("ints", ints(&[1, 2, 3, 4])),
        (
            "flags",
            Arc::new(BooleanArray::from(vec![Some(true), Some(false), None, Some(true)]))
                as ArrayRef,
        ),
    ])
    .expect("mixed types fixture is well formed")
}

/// A table with a single, empty column.
pub fn empty_table() -> ArrowTable {
    ArrowTable::try_from_columns(vec![("a", ints(&[]))]).expect("empty fixture is well formed")
}
