//! # Term Expect - Declarative Data Expectations for Rust
//!
//! Term Expect evaluates named, parameterized assertions ("expectations")
//! about the columns of a tabular dataset and reports the outcome at a
//! caller-chosen level of detail. Every call can be recorded into an
//! expectation suite that is later replayed against new data.
//!
//! ## Quick Start
//!
//! ```rust
//! use term_expect::prelude::*;
//! use arrow::array::{ArrayRef, Float64Array};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<()> {
//! let table = ArrowTable::try_from_columns(vec![(
//!     "score",
//!     Arc::new(Float64Array::from(vec![Some(1.0), Some(3.0), None, Some(4.0)])) as ArrayRef,
//! )])?;
//! let mut dataset = Dataset::new(table)?;
//!
//! // A custom per-element predicate
//! dataset.register_column_map_expectation(
//!     "expect_column_values_to_be_odd",
//!     &[],
//!     &[],
//!     |value, _| Ok(value.as_f64().is_some_and(|v| v % 2.0 != 0.0)),
//! )?;
//!
//! let result = dataset.expect(
//!     "expect_column_values_to_be_odd",
//!     ExpectationArgs::new()
//!         .positional("score")
//!         .result_format(ResultFormatTier::Summary),
//! )?;
//!
//! let stats = result.column_map().unwrap();
//! assert!(!result.success);
//! assert_eq!(stats.missing_count, 1);
//! assert_eq!(stats.basic.as_ref().unwrap().unexpected_count, 1);
//!
//! // Replay everything recorded so far
//! let report = dataset.validate()?;
//! assert_eq!(report.statistics.evaluated_expectations, 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Key Features
//!
//! ### Verbosity Tiers
//!
//! Results are shaped to one of four tiers, each a superset of the last:
//!
//! - `BOOLEAN_ONLY`: `success` only
//! - `BASIC`: counts, percentages and a partial list of unexpected values
//! - `SUMMARY`: adds partial row indices and value frequencies
//! - `COMPLETE`: adds every unexpected value and row index
//!
//! ### Fault Capture
//!
//! With `catch_exceptions`, a failing computation yields a failed result with
//! `exception_info` instead of an error. Caller mistakes such as an
//! out-of-range `mostly` are always returned as errors.
//!
//! ### Execution Strategies
//!
//! Expectations are registered with one of three strategies: generic,
//! column map (per-element predicate with a `mostly` threshold) and column
//! aggregate (whole-column statistics). See the [`strategies`] module.
//!
//! ## Architecture
//!
//! - **`core`**: arguments, dispatch, capture, shaping, results and the suite
//! - **`strategies`**: column map and column aggregate execution
//! - **`provider`**: the tabular computation interface and its arrow implementation
//! - **`builtins`**: the built-in expectation catalog
//! - **`dataset`**: the facade tying a provider to its registry and suite
//! - **`formatters`**: report rendering
//! - **`logging`**: log configuration and subscriber setup

pub mod builtins;
pub mod core;
pub mod dataset;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod provider;
pub mod strategies;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
