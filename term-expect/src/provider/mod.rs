//! Tabular computation providers.
//!
//! The expectation engine never touches storage directly. Everything it needs
//! from the data (element counts, missing-value detection, element-wise
//! mapping and aggregate statistics) goes through the [`TabularProvider`]
//! trait, and the provider's null semantics are treated as ground truth.
//!
//! [`ArrowTable`] is the bundled implementation over an Arrow `RecordBatch`.
//!
//! ## Infinite values
//!
//! JSON has no spelling for infinity, so infinite floats surface as the
//! strings [`POSITIVE_INFINITY`] and [`NEGATIVE_INFINITY`] wherever an element
//! is handed out as a [`Value`]. [`element_as_f64`] reads them back, and
//! numeric statistics never go through the JSON form at all.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Float64Array};
//! use term_expect::provider::{ArrowTable, TabularProvider};
//!
//! let table = ArrowTable::try_from_columns(vec![(
//!     "score",
//!     Arc::new(Float64Array::from(vec![Some(1.0), None, Some(3.0)])) as ArrayRef,
//! )])
//! .unwrap();
//!
//! assert_eq!(table.element_count(), 3);
//! assert_eq!(table.missing_mask("score").unwrap(), vec![false, true, false]);
//! assert_eq!(table.median("score").unwrap(), Some(2.0));
//! ```

mod arrow_table;

pub use arrow_table::ArrowTable;

use crate::prelude::*;
use serde_json::Value;
use std::fmt::Debug;

/// Element representation of `f64::INFINITY`.
pub const POSITIVE_INFINITY: &str = "Infinity";

/// Element representation of `f64::NEG_INFINITY`.
pub const NEGATIVE_INFINITY: &str = "-Infinity";

/// A source of column data and column-level computations.
///
/// Implementations must be consistent: `missing_mask`, `values` and
/// `map_elements` agree on which elements are missing, and every column has
/// exactly `element_count()` elements.
pub trait TabularProvider: Debug + Send + Sync {
    /// Returns the number of rows in the table.
    fn element_count(&self) -> usize;

    /// Returns the names of all columns, in schema order.
    fn column_names(&self) -> Vec<String>;

    /// Returns true if the table has a column with the given name.
    fn has_column(&self, column: &str) -> bool {
        self.column_names().iter().any(|name| name == column)
    }

    /// Returns one flag per element, `true` where the element is missing.
    fn missing_mask(&self, column: &str) -> Result<Vec<bool>>;

    /// Returns every element of the column, `None` where it is missing.
    fn values(&self, column: &str) -> Result<Vec<Option<Value>>>;

    /// Applies `f` to every non-missing element of the column.
    ///
    /// The closure receives the element's row index and value. Missing
    /// elements are not visited and map to `None` in the output. The first
    /// error returned by `f` aborts the mapping.
    fn map_elements(
        &self,
        column: &str,
        f: &mut dyn FnMut(usize, &Value) -> Result<bool>,
    ) -> Result<Vec<Option<bool>>> {
        self.values(column)?
            .iter()
            .enumerate()
            .map(|(index, value)| match value {
                Some(value) => f(index, value).map(Some),
                None => Ok(None),
            })
            .collect()
    }

    /// Returns the non-missing elements as `f64`, in row order.
    ///
    /// Fails with [`TermError::TypeMismatch`] on non-numeric data. The default
    /// reads `values`; providers with typed storage should read it directly.
    fn numeric_values(&self, column: &str) -> Result<Vec<f64>> {
        self.values(column)?
            .iter()
            .flatten()
            .map(|value| {
                element_as_f64(value).ok_or_else(|| TermError::TypeMismatch {
                    expected: "numeric".to_string(),
                    found: json_type_name(value).to_string(),
                })
            })
            .collect()
    }

    /// Computes the median of the non-missing elements.
    ///
    /// Returns `None` when the column has no non-missing elements.
    fn median(&self, column: &str) -> Result<Option<f64>> {
        Ok(median_of(self.numeric_values(column)?))
    }
}

/// A borrowed handle on one column of a provider.
///
/// Aggregate expectations receive a `ColumnView` rather than the raw
/// provider, so they can only see the column they were invoked on.
#[derive(Debug, Clone, Copy)]
pub struct ColumnView<'a> {
    provider: &'a dyn TabularProvider,
    name: &'a str,
}

impl<'a> ColumnView<'a> {
    /// Creates a view, failing if the provider has no such column.
    pub fn new(provider: &'a dyn TabularProvider, name: &'a str) -> Result<Self> {
        if !provider.has_column(name) {
            return Err(TermError::ColumnNotFound {
                column: name.to_string(),
            });
        }
        Ok(Self { provider, name })
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Returns the total number of elements, missing ones included.
    pub fn element_count(&self) -> usize {
        self.provider.element_count()
    }

    /// Returns the number of missing elements.
    pub fn missing_count(&self) -> Result<usize> {
        Ok(self
            .provider
            .missing_mask(self.name)?
            .into_iter()
            .filter(|missing| *missing)
            .count())
    }

    /// Returns every element, `None` where missing.
    pub fn values(&self) -> Result<Vec<Option<Value>>> {
        self.provider.values(self.name)
    }

    /// Returns the non-missing elements in row order.
    pub fn non_missing_values(&self) -> Result<Vec<Value>> {
        Ok(self.values()?.into_iter().flatten().collect())
    }

    /// Returns the non-missing elements as `f64`, failing on non-numeric data.
    pub fn numeric_values(&self) -> Result<Vec<f64>> {
        self.provider.numeric_values(self.name)
    }

    /// Returns the median of the non-missing elements.
    pub fn median(&self) -> Result<Option<f64>> {
        self.provider.median(self.name)
    }

    /// Returns the arithmetic mean of the non-missing elements.
    pub fn mean(&self) -> Result<Option<f64>> {
        let values = self.numeric_values()?;
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }
}

/// Converts a float to its element representation.
///
/// Infinities become [`POSITIVE_INFINITY`] or [`NEGATIVE_INFINITY`]; `NaN`
/// becomes `Value::Null`.
pub fn float_element(value: f64) -> Value {
    if value == f64::INFINITY {
        Value::String(POSITIVE_INFINITY.to_string())
    } else if value == f64::NEG_INFINITY {
        Value::String(NEGATIVE_INFINITY.to_string())
    } else {
        Value::from(value)
    }
}

/// Reads an element as `f64`, accepting the infinity spellings.
pub fn element_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::String(text) if text == POSITIVE_INFINITY => Some(f64::INFINITY),
        Value::String(text) if text == NEGATIVE_INFINITY => Some(f64::NEG_INFINITY),
        other => other.as_f64(),
    }
}

fn median_of(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Returns a short name for the JSON type of a value, for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
