//! The dataset facade: a provider plus its registry, suite and defaults.

use crate::builtins::register_builtins;
use crate::core::{
    Dispatched, Dispatcher, ExpectationArgs, ExpectationConfig, ExpectationRegistry,
    ExpectationResult, ExpectationSuite, ExpectationSuiteConfig, Kwargs, ResultFormat,
    ResultFormatTier, ValidationReport, DEFAULT_PARTIAL_UNEXPECTED_COUNT,
};
use crate::logging::LogConfig;
use crate::prelude::*;
use crate::provider::{ArrowTable, ColumnView, TabularProvider};
use crate::strategies::{AggregateObservation, GenericOutcome};
use crate::{log_expectation, log_suite_op};
use arrow::record_batch::RecordBatch;
use serde_json::Value;
use tracing::{info, instrument};

/// Configuration for a [`Dataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetConfig {
    /// Tier used when neither the call nor the defaults set `result_format`
    pub result_format: ResultFormatTier,
    /// Partial list limit applied to bare tier names
    pub partial_unexpected_count: usize,
    /// Whether to register the built-in catalog
    pub register_builtins: bool,
    /// Which optional events to log
    pub log_config: LogConfig,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            result_format: ResultFormatTier::Basic,
            partial_unexpected_count: DEFAULT_PARTIAL_UNEXPECTED_COUNT,
            register_builtins: true,
            log_config: LogConfig::default(),
        }
    }
}

impl DatasetConfig {
    /// Sets the default result format tier.
    pub fn with_result_format(mut self, tier: ResultFormatTier) -> Self {
        self.result_format = tier;
        self
    }

    /// Sets the partial list limit.
    pub fn with_partial_unexpected_count(mut self, count: usize) -> Self {
        self.partial_unexpected_count = count;
        self
    }

    /// Sets whether the built-in catalog is registered.
    pub fn with_builtins(mut self, register: bool) -> Self {
        self.register_builtins = register;
        self
    }

    /// Sets which optional events are logged.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Returns the configured default [`ResultFormat`].
    pub fn default_result_format(&self) -> ResultFormat {
        ResultFormat::new(self.result_format).with_partial_unexpected_count(self.partial_unexpected_count)
    }
}

/// A tabular dataset that expectations run against.
///
/// Owns its expectation suite and default arguments exclusively. Calls that
/// record or change defaults take `&mut self`; evaluation-only calls take
/// `&self`.
///
/// # Examples
///
/// ```rust
/// use term_expect::prelude::*;
/// use arrow::array::{ArrayRef, Int64Array};
/// use std::sync::Arc;
///
/// # fn example() -> Result<()> {
/// let table = ArrowTable::try_from_columns(vec![(
///     "age",
///     Arc::new(Int64Array::from(vec![31, 45, 12, 140])) as ArrayRef,
/// )])?;
/// let mut dataset = Dataset::new(table)?;
///
/// let result = dataset.expect(
///     "expect_column_values_to_be_between",
///     ExpectationArgs::new()
///         .positional("age")
///         .arg("min_value", 0)
///         .arg("max_value", 120)
///         .result_format(ResultFormatTier::Complete),
/// )?;
///
/// assert!(!result.success);
/// assert_eq!(dataset.get_expectations_config().len(), 1);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct Dataset {
    provider: Box<dyn TabularProvider>,
    registry: ExpectationRegistry,
    suite: ExpectationSuite,
    config: DatasetConfig,
}

impl Dataset {
    /// Creates a dataset with the default configuration.
    pub fn new(provider: impl TabularProvider + 'static) -> Result<Self> {
        Self::with_config(provider, DatasetConfig::default())
    }

    /// Creates a dataset with a custom configuration.
    pub fn with_config(provider: impl TabularProvider + 'static, config: DatasetConfig) -> Result<Self> {
        let mut registry = ExpectationRegistry::new();
        if config.register_builtins {
            register_builtins(&mut registry)?;
        }
        let suite = ExpectationSuite::new(config.default_result_format());

        info!(
            dataset.rows = provider.element_count(),
            dataset.columns = provider.column_names().len(),
            dataset.expectations = registry.len(),
            "Created dataset"
        );

        Ok(Self {
            provider: Box::new(provider),
            registry,
            suite,
            config,
        })
    }

    /// Creates a dataset over an arrow record batch.
    pub fn from_record_batch(batch: RecordBatch) -> Result<Self> {
        Self::new(ArrowTable::new(batch))
    }

    pub fn provider(&self) -> &dyn TabularProvider {
        self.provider.as_ref()
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn registry(&self) -> &ExpectationRegistry {
        &self.registry
    }

    /// Registers a generic expectation. See [`ExpectationRegistry::register_expectation`].
    pub fn register_expectation<F>(&mut self, name: &str, params: &[&str], required: &[&str], body: F) -> Result<()>
    where
        F: Fn(&dyn TabularProvider, &Kwargs) -> Result<GenericOutcome> + Send + Sync + 'static,
    {
        self.registry.register_expectation(name, params, required, body)
    }

    /// Registers a column map expectation. See [`ExpectationRegistry::register_column_map_expectation`].
    pub fn register_column_map_expectation<F>(
        &mut self,
        name: &str,
        params: &[&str],
        required: &[&str],
        predicate: F,
    ) -> Result<()>
    where
        F: Fn(&Value, &Kwargs) -> Result<bool> + Send + Sync + 'static,
    {
        self.registry
            .register_column_map_expectation(name, params, required, predicate)
    }

    /// Registers a column aggregate expectation. See [`ExpectationRegistry::register_column_aggregate_expectation`].
    pub fn register_column_aggregate_expectation<F>(
        &mut self,
        name: &str,
        params: &[&str],
        required: &[&str],
        aggregate: F,
    ) -> Result<()>
    where
        F: Fn(&ColumnView<'_>, &Kwargs) -> Result<AggregateObservation> + Send + Sync + 'static,
    {
        self.registry
            .register_column_aggregate_expectation(name, params, required, aggregate)
    }

    fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(
            &self.registry,
            self.provider.as_ref(),
            self.suite.default_expectation_args(),
            self.config.default_result_format(),
        )
    }

    fn dispatch(&self, name: &str, args: &ExpectationArgs) -> Result<Dispatched> {
        log_expectation!(
            self.config.log_config,
            expectation.name = %name,
            expectation.args = %self.config.log_config.truncate(
                &serde_json::to_string(args.kwargs()).unwrap_or_default()
            ),
            "Invoking expectation"
        );
        self.dispatcher().dispatch(name, args)
    }

    /// Evaluates an expectation and records the call in the suite.
    ///
    /// Exactly one record is appended when this returns `Ok`, including
    /// when a computation fault was captured. Nothing is recorded when it
    /// returns `Err`.
    pub fn expect(&mut self, name: &str, args: ExpectationArgs) -> Result<ExpectationResult> {
        let Dispatched { result, config } = self.dispatch(name, &args)?;
        self.suite.record(config);
        log_suite_op!(
            self.config.log_config,
            expectation.name = %name,
            suite.size = self.suite.expectations().len(),
            "Recorded expectation"
        );
        Ok(result)
    }

    /// Evaluates an expectation without recording it.
    pub fn evaluate(&self, name: &str, args: ExpectationArgs) -> Result<ExpectationResult> {
        Ok(self.dispatch(name, &args)?.result)
    }

    /// Re-evaluates a recorded invocation without recording it again.
    ///
    /// A record taken from a result's `expectation_config` reproduces that
    /// result's `result_obj`.
    pub fn run_expectation_config(&self, config: &ExpectationConfig) -> Result<ExpectationResult> {
        self.evaluate(&config.expectation_type, replay_args(config))
    }

    /// Returns a snapshot of the recorded invocations.
    pub fn get_expectations_config(&self) -> ExpectationSuiteConfig {
        self.suite.to_config()
    }

    /// Sets one default expectation argument for every later call.
    ///
    /// # Errors
    ///
    /// Returns a caller fault for an invalid `result_format` or a non-boolean
    /// `include_config`/`catch_exceptions`; the previous default is kept.
    pub fn set_default_expectation_argument(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        log_suite_op!(
            self.config.log_config,
            argument.name = %name,
            argument.value = %self.config.log_config.truncate(&value.to_string()),
            "Setting default expectation argument"
        );
        self.suite.set_default_expectation_argument(name, value)
    }

    /// Returns the default expectation arguments.
    pub fn default_expectation_args(&self) -> &Kwargs {
        self.suite.default_expectation_args()
    }

    /// Replays this dataset's own suite.
    pub fn validate(&self) -> Result<ValidationReport> {
        self.validate_suite(&self.get_expectations_config())
    }

    /// Replays a suite against this dataset without recording.
    ///
    /// Computation faults are captured into the report and every result
    /// carries its `expectation_config`. Caller faults, such as an
    /// expectation this dataset has not registered, abort the replay.
    #[instrument(skip(self, suite), fields(suite.expectations = suite.len()))]
    pub fn validate_suite(&self, suite: &ExpectationSuiteConfig) -> Result<ValidationReport> {
        log_suite_op!(
            self.config.log_config,
            suite.expectations = suite.len(),
            "Starting suite replay"
        );

        let results = suite
            .expectations
            .iter()
            .map(|config| {
                let args = replay_args(config).catch_exceptions(true).include_config(true);
                self.evaluate(&config.expectation_type, args)
            })
            .collect::<Result<Vec<_>>>()?;
        let report = ValidationReport::new(results);

        info!(
            suite.evaluated = report.statistics.evaluated_expectations,
            suite.successful = report.statistics.successful_expectations,
            suite.unsuccessful = report.statistics.unsuccessful_expectations,
            "Suite replay completed"
        );
        Ok(report)
    }
}

fn replay_args(config: &ExpectationConfig) -> ExpectationArgs {
    let args = ExpectationArgs::from_kwargs(config.kwargs.clone());
    match &config.meta {
        Some(meta) => args.meta(meta.clone()),
        None => args,
    }
}
