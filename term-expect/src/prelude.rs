//! Prelude for commonly used types and traits in term-expect.

pub use crate::core::{
    ExpectationArgs, ExpectationConfig, ExpectationResult, ResultFormat, ResultFormatTier,
    ValidationReport,
};
pub use crate::dataset::{Dataset, DatasetConfig};
pub use crate::error::{Result, TermError};
pub use crate::formatters::{FormatterConfig, ResultFormatter};
pub use crate::logging::LogConfig;
pub use crate::provider::{ArrowTable, ColumnView, TabularProvider};
pub use crate::strategies::{AggregateObservation, GenericOutcome};
