//! [`TabularProvider`] over an Arrow `RecordBatch`.

use super::{float_element, TabularProvider};
use crate::prelude::*;
use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int16Array, Int32Array,
    Int64Array, Int8Array, LargeStringArray, PrimitiveArray, StringArray, UInt16Array,
    UInt32Array, UInt64Array, UInt8Array,
};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type,
    Int8Type, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow::record_batch::RecordBatch;
use serde_json::Value;
use tracing::debug;

/// An in-memory table backed by a single Arrow `RecordBatch`.
///
/// Missing values are Arrow nulls, plus `NaN` in floating point columns.
/// Supported column types are boolean, signed and unsigned integers,
/// `Float32`/`Float64`, `Utf8`/`LargeUtf8` and `Null`. Infinite floats are
/// present, and appear in `values` as the strings `"Infinity"` and
/// `"-Infinity"`; `numeric_values` and `median` read the float arrays
/// directly and keep them as `f64`.
#[derive(Debug, Clone)]
pub struct ArrowTable {
    batch: RecordBatch,
}

impl ArrowTable {
    /// Wraps an existing record batch.
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Builds a table from named columns.
    ///
    /// All columns must have the same length.
    pub fn try_from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ArrayRef)>,
        S: AsRef<str>,
    {
        let batch = RecordBatch::try_from_iter(columns)?;
        debug!(
            table.rows = batch.num_rows(),
            table.columns = batch.num_columns(),
            "Built arrow table"
        );
        Ok(Self { batch })
    }

    /// Returns the underlying record batch.
    pub fn record_batch(&self) -> &RecordBatch {
        &self.batch
    }

    fn column(&self, name: &str) -> Result<&ArrayRef> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| TermError::ColumnNotFound {
                column: name.to_string(),
            })
    }
}

impl From<RecordBatch> for ArrowTable {
    fn from(batch: RecordBatch) -> Self {
        Self::new(batch)
    }
}

impl TabularProvider for ArrowTable {
    fn element_count(&self) -> usize {
        self.batch.num_rows()
    }

    fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect()
    }

    fn has_column(&self, column: &str) -> bool {
        self.batch.column_by_name(column).is_some()
    }

    fn missing_mask(&self, column: &str) -> Result<Vec<bool>> {
        let array = self.column(column)?;
        (0..array.len())
            .map(|index| is_missing_at(array.as_ref(), index))
            .collect()
    }

    fn values(&self, column: &str) -> Result<Vec<Option<Value>>> {
        let array = self.column(column)?;
        (0..array.len())
            .map(|index| scalar_at(array.as_ref(), index))
            .collect()
    }

    fn numeric_values(&self, column: &str) -> Result<Vec<f64>> {
        let array: &dyn Array = self.column(column)?.as_ref();
        match array.data_type() {
            DataType::Null => Ok(Vec::new()),
            DataType::Int8 => primitive_values::<Int8Type>(array, |v| v as f64),
            DataType::Int16 => primitive_values::<Int16Type>(array, |v| v as f64),
            DataType::Int32 => primitive_values::<Int32Type>(array, |v| v as f64),
            DataType::Int64 => primitive_values::<Int64Type>(array, |v| v as f64),
            DataType::UInt8 => primitive_values::<UInt8Type>(array, |v| v as f64),
            DataType::UInt16 => primitive_values::<UInt16Type>(array, |v| v as f64),
            DataType::UInt32 => primitive_values::<UInt32Type>(array, |v| v as f64),
            DataType::UInt64 => primitive_values::<UInt64Type>(array, |v| v as f64),
            DataType::Float32 => primitive_values::<Float32Type>(array, f64::from),
            DataType::Float64 => primitive_values::<Float64Type>(array, |v| v),
            other => Err(TermError::TypeMismatch {
                expected: "numeric".to_string(),
                found: other.to_string(),
            }),
        }
    }
}

fn downcast<T: 'static>(array: &dyn Array) -> Result<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        TermError::Internal(format!(
            "Failed to downcast {} array",
            array.data_type()
        ))
    })
}

fn is_missing_at(array: &dyn Array, index: usize) -> Result<bool> {
    if matches!(array.data_type(), DataType::Null) || array.is_null(index) {
        return Ok(true);
    }
    let missing = match array.data_type() {
        DataType::Float32 => downcast::<Float32Array>(array)?.value(index).is_nan(),
        DataType::Float64 => downcast::<Float64Array>(array)?.value(index).is_nan(),
        _ => false,
    };
    Ok(missing)
}

/// Non-null, non-`NaN` elements of a primitive array as `f64`.
fn primitive_values<T: ArrowPrimitiveType>(
    array: &dyn Array,
    to_f64: impl Fn(T::Native) -> f64,
) -> Result<Vec<f64>> {
    Ok(downcast::<PrimitiveArray<T>>(array)?
        .iter()
        .flatten()
        .map(to_f64)
        .filter(|value| !value.is_nan())
        .collect())
}

fn float_value(value: f64) -> Option<Value> {
    (!value.is_nan()).then(|| float_element(value))
}

fn scalar_at(array: &dyn Array, index: usize) -> Result<Option<Value>> {
    if matches!(array.data_type(), DataType::Null) || array.is_null(index) {
        return Ok(None);
    }

    let value = match array.data_type() {
        DataType::Boolean => Value::Bool(downcast::<BooleanArray>(array)?.value(index)),
        DataType::Int8 => Value::from(downcast::<Int8Array>(array)?.value(index)),
        DataType::Int16 => Value::from(downcast::<Int16Array>(array)?.value(index)),
        DataType::Int32 => Value::from(downcast::<Int32Array>(array)?.value(index)),
        DataType::Int64 => Value::from(downcast::<Int64Array>(array)?.value(index)),
        DataType::UInt8 => Value::from(downcast::<UInt8Array>(array)?.value(index)),
        DataType::UInt16 => Value::from(downcast::<UInt16Array>(array)?.value(index)),
        DataType::UInt32 => Value::from(downcast::<UInt32Array>(array)?.value(index)),
        DataType::UInt64 => Value::from(downcast::<UInt64Array>(array)?.value(index)),
        DataType::Float32 => {
            return Ok(float_value(f64::from(
                downcast::<Float32Array>(array)?.value(index),
            )))
        }
        DataType::Float64 => return Ok(float_value(downcast::<Float64Array>(array)?.value(index))),
        DataType::Utf8 => Value::String(downcast::<StringArray>(array)?.value(index).to_string()),
        DataType::LargeUtf8 => {
            Value::String(downcast::<LargeStringArray>(array)?.value(index).to_string())
        }
        other => {
            return Err(TermError::TypeMismatch {
                expected: "boolean, integer, float or utf8 column".to_string(),
                found: other.to_string(),
            })
        }
    };
    Ok(Some(value))
}
