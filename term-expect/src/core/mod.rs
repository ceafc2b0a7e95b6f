//! Core expectation types for the Term expectations engine.
//!
//! This module provides the machinery every expectation call runs through:
//! argument resolution, fault capture, dispatch, result shaping and the
//! per-dataset suite.
//!
//! ## Overview
//!
//! - **[`ExpectationRegistry`]**: named expectations and their strategy
//! - **[`Dispatcher`]**: resolves arguments and runs one call
//! - **[`capture`]**: converts computation faults into data when requested
//! - **[`ResultFormat`]**: the verbosity tier and partial list limit
//! - **[`ExpectationResult`]**: the shaped outcome of one call
//! - **[`ExpectationSuite`]**: recorded invocations and default arguments
//!
//! ## Architecture
//!
//! ```text
//! expect(name, args)
//!     ├── ExpectationRegistry::get
//!     ├── resolve_arguments (defaults merged, controls split out)
//!     ├── capture (catch_exceptions)
//!     │   └── Strategy: Generic | ColumnMap | ColumnAggregate
//!     ├── shaping (BOOLEAN_ONLY < BASIC < SUMMARY < COMPLETE)
//!     └── ExpectationSuite::record
//! ```
//!
//! ## Example
//!
//! ```rust
//! use term_expect::core::{Dispatcher, ExpectationArgs, ExpectationRegistry, ExpectationSuite, ResultFormat};
//! use term_expect::provider::ArrowTable;
//! use arrow::array::{ArrayRef, Int64Array};
//! use std::sync::Arc;
//!
//! # fn example() -> term_expect::error::Result<()> {
//! let table = ArrowTable::try_from_columns(vec![(
//!     "x",
//!     Arc::new(Int64Array::from(vec![1, 3, 5, 8])) as ArrayRef,
//! )])?;
//!
//! let mut registry = ExpectationRegistry::new();
//! registry.register_column_map_expectation("expect_column_values_to_be_odd", &[], &[], |value, _| {
//!     Ok(value.as_i64().is_some_and(|v| v % 2 != 0))
//! })?;
//!
//! let suite = ExpectationSuite::default();
//! let dispatcher = Dispatcher::new(&registry, &table, suite.default_expectation_args(), ResultFormat::default());
//! let dispatched = dispatcher.dispatch(
//!     "expect_column_values_to_be_odd",
//!     &ExpectationArgs::new().positional("x").arg("mostly", 0.7),
//! )?;
//!
//! assert!(dispatched.result.success);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod arguments;
pub mod capture;
pub mod dispatch;
pub mod registry;
pub mod report;
pub mod result;
pub mod result_format;
pub mod shaping;
pub mod suite;

pub use arguments::{resolve_arguments, ExpectationArgs, Kwargs, ReservedKey, ResolvedArgs};
pub use capture::{capture, Captured, Fault, PANIC_KIND, TRACEBACK_HEADER};
pub use dispatch::{Dispatched, Dispatcher};
pub use registry::{ExpectationBody, ExpectationRegistry, RegisteredExpectation};
pub use report::{ValidationReport, ValidationStatistics};
pub use result::{
    BasicDetail, ColumnAggregateResultObj, ColumnMapResultObj, CompleteDetail, ExceptionInfo,
    ExpectationResult, ResultObj, SummaryDetail, UnexpectedCount,
};
pub use result_format::{ResultFormat, ResultFormatTier, DEFAULT_PARTIAL_UNEXPECTED_COUNT};
pub use suite::{ExpectationConfig, ExpectationSuite, ExpectationSuiteConfig};
