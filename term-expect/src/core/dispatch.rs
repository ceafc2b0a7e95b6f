//! The expectation dispatcher.
//!
//! Every call goes through the same pipeline:
//!
//! 1. look up the registered expectation
//! 2. bind arguments and merge instance defaults
//! 3. validate strategy arguments such as `mostly`
//! 4. run the computation inside the capture boundary
//! 5. shape the outcome to the requested tier
//! 6. build the invocation record and attach it when `include_config` is set
//!
//! Steps 1 to 3 fail fast with caller faults. Only step 4 is subject to
//! `catch_exceptions`.

use super::arguments::{resolve_arguments, ExpectationArgs, Kwargs, ResolvedArgs};
use super::capture::capture;
use super::registry::{ExpectationBody, ExpectationRegistry};
use super::result::ExpectationResult;
use super::result_format::ResultFormat;
use super::shaping::{shape_column_aggregate, shape_column_map, shape_custom};
use super::suite::ExpectationConfig;
use crate::prelude::*;
use crate::provider::TabularProvider;
use crate::strategies::{ColumnAggregatePlan, ColumnMapPlan};
use tracing::{debug, instrument};

/// The product of one dispatched call.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    /// The result returned to the caller
    pub result: ExpectationResult,
    /// The invocation record for the suite
    pub config: ExpectationConfig,
}

/// Runs registered expectations against one provider.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    registry: &'a ExpectationRegistry,
    provider: &'a dyn TabularProvider,
    defaults: &'a Kwargs,
    fallback: ResultFormat,
}

impl<'a> Dispatcher<'a> {
    /// Creates a dispatcher.
    ///
    /// `defaults` are the instance's default expectation arguments and
    /// `fallback` the format used when neither the call nor the defaults set one.
    pub fn new(
        registry: &'a ExpectationRegistry,
        provider: &'a dyn TabularProvider,
        defaults: &'a Kwargs,
        fallback: ResultFormat,
    ) -> Self {
        Self {
            registry,
            provider,
            defaults,
            fallback,
        }
    }

    /// Dispatches one call.
    ///
    /// # Errors
    ///
    /// Returns caller faults unconditionally. Computation faults are
    /// returned only when `catch_exceptions` is false; otherwise they become a
    /// failed result carrying `exception_info`.
    #[instrument(skip(self, args), fields(expectation.name = %name))]
    pub fn dispatch(&self, name: &str, args: &ExpectationArgs) -> Result<Dispatched> {
        let registered = self.registry.get(name)?;
        let resolved = resolve_arguments(
            name,
            registered.params(),
            registered.required(),
            args,
            self.defaults,
            self.fallback,
        )?;

        debug!(
            strategy = %registered.strategy(),
            result_format = %resolved.result_format.tier,
            catch_exceptions = resolved.catch_exceptions,
            include_config = resolved.include_config,
            "Dispatching expectation"
        );

        let mut result = self.run(name, registered.body(), &resolved)?;

        let config = ExpectationConfig {
            expectation_type: name.to_string(),
            kwargs: resolved.recorded_kwargs(),
            meta: resolved.meta.clone(),
        };
        if resolved.include_config {
            result.expectation_config = Some(config.clone());
        }

        debug!(
            success = result.success,
            raised_exception = result.raised_exception(),
            "Expectation evaluated"
        );
        Ok(Dispatched { result, config })
    }

    fn run(
        &self,
        name: &str,
        body: &ExpectationBody,
        resolved: &ResolvedArgs,
    ) -> Result<ExpectationResult> {
        let format = resolved.result_format;
        let kwargs = &resolved.domain;
        let catch = resolved.catch_exceptions;

        let result = match body {
            ExpectationBody::ColumnMap(predicate) => {
                let plan = ColumnMapPlan::bind(name, resolved)?;
                capture(name, catch, || {
                    plan.evaluate(self.provider, predicate.as_ref(), kwargs)
                })?
                .resolve(
                    |outcome| {
                        ExpectationResult::new(outcome.success)
                            .with_result_obj(shape_column_map(&outcome, &format))
                    },
                    ExpectationResult::from_fault,
                )
            }
            ExpectationBody::ColumnAggregate(aggregate) => {
                let plan = ColumnAggregatePlan::bind(name, resolved)?;
                capture(name, catch, || {
                    plan.evaluate(self.provider, aggregate.as_ref(), kwargs)
                })?
                .resolve(
                    |outcome| {
                        ExpectationResult::new(outcome.success)
                            .with_result_obj(shape_column_aggregate(outcome, &format))
                    },
                    ExpectationResult::from_fault,
                )
            }
            ExpectationBody::Generic(body) => capture(name, catch, || body(self.provider, kwargs))?
                .resolve(
                    |outcome| {
                        ExpectationResult::new(outcome.success)
                            .with_result_obj(shape_custom(outcome.result_obj, &format))
                    },
                    ExpectationResult::from_fault,
                ),
        };
        Ok(result)
    }
}
