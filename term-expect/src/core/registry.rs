//! Expectation registry.
//!
//! Maps expectation names to their declared parameters and executable body.
//! Registration is the only way to make an expectation callable through a
//! [`Dataset`](crate::dataset::Dataset).

use super::arguments::ReservedKey;
use crate::prelude::*;
use crate::strategies::{ColumnAggregateFn, ColumnMapFn, GenericFn, Strategy};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Parameter every column strategy binds first.
pub const COLUMN_PARAM: &str = "column";

/// Parameter the column map strategy adds after the caller's own.
pub const MOSTLY_PARAM: &str = "mostly";

/// The executable body of a registered expectation.
#[derive(Clone)]
pub enum ExpectationBody {
    Generic(Arc<GenericFn>),
    ColumnMap(Arc<ColumnMapFn>),
    ColumnAggregate(Arc<ColumnAggregateFn>),
}

impl ExpectationBody {
    pub fn strategy(&self) -> Strategy {
        match self {
            ExpectationBody::Generic(_) => Strategy::Generic,
            ExpectationBody::ColumnMap(_) => Strategy::ColumnMap,
            ExpectationBody::ColumnAggregate(_) => Strategy::ColumnAggregate,
        }
    }
}

impl fmt::Debug for ExpectationBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExpectationBody")
            .field(&self.strategy())
            .finish()
    }
}

/// A named expectation ready for dispatch.
#[derive(Debug, Clone)]
pub struct RegisteredExpectation {
    name: String,
    params: Vec<String>,
    required: Vec<String>,
    body: ExpectationBody,
}

impl RegisteredExpectation {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter names, in positional order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Parameters that must be bound on every call.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn body(&self) -> &ExpectationBody {
        &self.body
    }

    pub fn strategy(&self) -> Strategy {
        self.body.strategy()
    }
}

/// Registered expectations by name.
///
/// # Examples
///
/// ```rust
/// use term_expect::core::ExpectationRegistry;
///
/// let mut registry = ExpectationRegistry::new();
/// registry
///     .register_column_map_expectation("expect_column_values_to_be_odd", &[], &[], |value, _| {
///         Ok(value.as_i64().is_some_and(|v| v % 2 != 0))
///     })
///     .unwrap();
///
/// let registered = registry.get("expect_column_values_to_be_odd").unwrap();
/// assert_eq!(registered.params(), ["column", "mostly"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExpectationRegistry {
    expectations: HashMap<String, RegisteredExpectation>,
}

impl ExpectationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a generic expectation whose body sees the whole provider.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Configuration`] if a parameter name collides with
    /// a reserved control, is repeated, or `required` names an undeclared parameter.
    pub fn register_expectation<F>(
        &mut self,
        name: &str,
        params: &[&str],
        required: &[&str],
        body: F,
    ) -> Result<()>
    where
        F: Fn(&dyn crate::provider::TabularProvider, &super::Kwargs) -> Result<crate::strategies::GenericOutcome>
            + Send
            + Sync
            + 'static,
    {
        let params = owned(params);
        let required = owned(required);
        self.insert(name, params, required, ExpectationBody::Generic(Arc::new(body)))
    }

    /// Registers a column map expectation from a per-element predicate.
    ///
    /// The parameter list becomes `column`, then `params`, then `mostly`;
    /// `column` is always required.
    pub fn register_column_map_expectation<F>(
        &mut self,
        name: &str,
        params: &[&str],
        required: &[&str],
        predicate: F,
    ) -> Result<()>
    where
        F: Fn(&serde_json::Value, &super::Kwargs) -> Result<bool> + Send + Sync + 'static,
    {
        let mut all_params = vec![COLUMN_PARAM.to_string()];
        all_params.extend(owned(params));
        all_params.push(MOSTLY_PARAM.to_string());
        let mut all_required = vec![COLUMN_PARAM.to_string()];
        all_required.extend(owned(required));
        self.insert(
            name,
            all_params,
            all_required,
            ExpectationBody::ColumnMap(Arc::new(predicate)),
        )
    }

    /// Registers a column aggregate expectation.
    ///
    /// The parameter list becomes `column`, then `params`; `column` is
    /// always required.
    pub fn register_column_aggregate_expectation<F>(
        &mut self,
        name: &str,
        params: &[&str],
        required: &[&str],
        aggregate: F,
    ) -> Result<()>
    where
        F: Fn(&crate::provider::ColumnView<'_>, &super::Kwargs) -> Result<crate::strategies::AggregateObservation>
            + Send
            + Sync
            + 'static,
    {
        let mut all_params = vec![COLUMN_PARAM.to_string()];
        all_params.extend(owned(params));
        let mut all_required = vec![COLUMN_PARAM.to_string()];
        all_required.extend(owned(required));
        self.insert(
            name,
            all_params,
            all_required,
            ExpectationBody::ColumnAggregate(Arc::new(aggregate)),
        )
    }

    fn insert(
        &mut self,
        name: &str,
        params: Vec<String>,
        required: Vec<String>,
        body: ExpectationBody,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(TermError::Configuration(
                "expectation name must not be empty".to_string(),
            ));
        }
        for (position, param) in params.iter().enumerate() {
            if ReservedKey::is_reserved(param) {
                return Err(TermError::Configuration(format!(
                    "expectation '{name}' declares reserved parameter '{param}'"
                )));
            }
            if params[..position].contains(param) {
                return Err(TermError::Configuration(format!(
                    "expectation '{name}' declares parameter '{param}' twice"
                )));
            }
        }
        if let Some(undeclared) = required.iter().find(|param| !params.contains(param)) {
            return Err(TermError::Configuration(format!(
                "expectation '{name}' requires undeclared parameter '{undeclared}'"
            )));
        }

        let strategy = body.strategy();
        let registered = RegisteredExpectation {
            name: name.to_string(),
            params,
            required,
            body,
        };
        if self.expectations.insert(name.to_string(), registered).is_some() {
            warn!(expectation.name = %name, %strategy, "Replaced registered expectation");
        } else {
            debug!(expectation.name = %name, %strategy, "Registered expectation");
        }
        Ok(())
    }

    /// Looks up an expectation by name.
    pub fn get(&self, name: &str) -> Result<&RegisteredExpectation> {
        self.expectations
            .get(name)
            .ok_or_else(|| TermError::UnknownExpectation(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.expectations.contains_key(name)
    }

    /// Returns registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.expectations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::{AggregateObservation, GenericOutcome};

    #[test]
    fn test_column_strategies_add_implicit_params() {
        let mut registry = ExpectationRegistry::new();
        registry
            .register_column_map_expectation("map", &["min_value"], &[], |_, _| Ok(true))
            .unwrap();
        registry
            .register_column_aggregate_expectation("agg", &["min_value"], &["min_value"], |_, _| {
                Ok(AggregateObservation::new(true))
            })
            .unwrap();

        let map = registry.get("map").unwrap();
        assert_eq!(map.params(), ["column", "min_value", "mostly"]);
        assert_eq!(map.required(), ["column"]);
        assert_eq!(map.strategy(), Strategy::ColumnMap);

        let agg = registry.get("agg").unwrap();
        assert_eq!(agg.params(), ["column", "min_value"]);
        assert_eq!(agg.required(), ["column", "min_value"]);
        assert_eq!(agg.strategy(), Strategy::ColumnAggregate);
    }

    #[test]
    fn test_reserved_and_duplicate_params_are_rejected() {
        let mut registry = ExpectationRegistry::new();
        let reserved = registry.register_expectation("x", &["result_format"], &[], |_, _| {
            Ok(GenericOutcome::new(true))
        });
        assert!(matches!(reserved, Err(TermError::Configuration(_))));

        let repeated = registry.register_column_map_expectation("y", &["column"], &[], |_, _| Ok(true));
        assert!(matches!(repeated, Err(TermError::Configuration(_))));

        let undeclared = registry.register_expectation("z", &["a"], &["b"], |_, _| {
            Ok(GenericOutcome::new(true))
        });
        assert!(matches!(undeclared, Err(TermError::Configuration(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup() {
        let mut registry = ExpectationRegistry::new();
        registry
            .register_expectation("b", &[], &[], |_, _| Ok(GenericOutcome::new(true)))
            .unwrap();
        registry
            .register_expectation("a", &[], &[], |_, _| Ok(GenericOutcome::new(true)))
            .unwrap();

        assert_eq!(registry.names(), vec!["a", "b"]);
        assert!(registry.contains("a"));
        assert!(matches!(
            registry.get("missing"),
            Err(TermError::UnknownExpectation(_))
        ));
    }

    #[test]
    fn test_reregistration_replaces() {
        let mut registry = ExpectationRegistry::new();
        registry
            .register_expectation("a", &[], &[], |_, _| Ok(GenericOutcome::new(true)))
            .unwrap();
        registry
            .register_column_map_expectation("a", &[], &[], |_, _| Ok(true))
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a").unwrap().strategy(), Strategy::ColumnMap);
    }
}
