//! Call-time arguments and their resolution against instance defaults.
//!
//! Every expectation call carries domain arguments (a column name, bounds,
//! a `mostly` threshold) plus four reserved controls that only the
//! dispatcher interprets. Resolution binds positional arguments to declared
//! parameter names, splits out the reserved controls, and fills gaps from the
//! dataset's default expectation arguments. Call-time values always win.

use super::result_format::{ResultFormat, ResultFormatTier};
use crate::prelude::*;
use serde_json::{Map, Value};
use std::fmt;

/// Keyword arguments as an ordered JSON map.
pub type Kwargs = Map<String, Value>;

/// The reserved control keys every expectation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedKey {
    ResultFormat,
    IncludeConfig,
    CatchExceptions,
    Meta,
}

impl ReservedKey {
    pub const ALL: [ReservedKey; 4] = [
        ReservedKey::ResultFormat,
        ReservedKey::IncludeConfig,
        ReservedKey::CatchExceptions,
        ReservedKey::Meta,
    ];

    /// Returns the keyword name of this control.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservedKey::ResultFormat => "result_format",
            ReservedKey::IncludeConfig => "include_config",
            ReservedKey::CatchExceptions => "catch_exceptions",
            ReservedKey::Meta => "meta",
        }
    }

    /// Looks up a reserved key by keyword name.
    pub fn from_name(name: &str) -> Option<Self> {
        ReservedKey::ALL.into_iter().find(|key| key.as_str() == name)
    }

    /// Returns true if `name` is a reserved control keyword.
    pub fn is_reserved(name: &str) -> bool {
        Self::from_name(name).is_some()
    }
}

impl fmt::Display for ReservedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Arguments for one expectation call.
///
/// # Examples
///
/// ```rust
/// use term_expect::core::{ExpectationArgs, ResultFormatTier};
///
/// let args = ExpectationArgs::new()
///     .positional("mostly_odd")
///     .arg("mostly", 0.6)
///     .result_format(ResultFormatTier::Complete)
///     .include_config(true);
///
/// assert_eq!(args.positional_args().len(), 1);
/// assert!(args.kwargs().contains_key("result_format"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpectationArgs {
    positional: Vec<Value>,
    kwargs: Kwargs,
}

impl ExpectationArgs {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates arguments from a keyword map, such as a recorded config's kwargs.
    ///
    /// Reserved keys in the map are treated as controls.
    pub fn from_kwargs(kwargs: Kwargs) -> Self {
        Self {
            positional: Vec::new(),
            kwargs,
        }
    }

    /// Appends a positional argument, bound to the next declared parameter.
    pub fn positional(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a keyword argument.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    /// Sets `result_format` to a tier name, a [`ResultFormat`], or a raw JSON value.
    pub fn result_format(self, format: impl Into<Value>) -> Self {
        self.arg(ReservedKey::ResultFormat.as_str(), format)
    }

    /// Sets `include_config`.
    pub fn include_config(self, include: bool) -> Self {
        self.arg(ReservedKey::IncludeConfig.as_str(), include)
    }

    /// Sets `catch_exceptions`.
    pub fn catch_exceptions(self, catch: bool) -> Self {
        self.arg(ReservedKey::CatchExceptions.as_str(), catch)
    }

    /// Sets opaque caller metadata.
    pub fn meta(self, meta: impl Into<Value>) -> Self {
        self.arg(ReservedKey::Meta.as_str(), meta)
    }

    pub fn positional_args(&self) -> &[Value] {
        &self.positional
    }

    pub fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }
}

/// Arguments after binding, default merging and control validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArgs {
    /// Domain arguments passed to the computation
    pub domain: Kwargs,
    /// The parsed result format
    pub result_format: ResultFormat,
    /// `result_format` exactly as supplied, for the invocation record
    pub result_format_value: Value,
    pub include_config: bool,
    pub catch_exceptions: bool,
    pub meta: Option<Value>,
}

/// Binds and validates the arguments of one call.
///
/// `params` are the declared parameter names in positional order, `required`
/// the subset that must end up bound. `fallback` supplies the result format
/// when neither the call nor the defaults set one, and its partial limit
/// applies to bare tier names.
///
/// # Errors
///
/// Every error returned here is a caller fault: too many positional
/// arguments, an undeclared keyword, a keyword bound twice, a missing
/// required argument, or a malformed control value.
pub fn resolve_arguments(
    expectation: &str,
    params: &[String],
    required: &[String],
    args: &ExpectationArgs,
    defaults: &Kwargs,
    fallback: ResultFormat,
) -> Result<ResolvedArgs> {
    if args.positional.len() > params.len() {
        return Err(TermError::invalid_argument(
            expectation,
            format!(
                "takes {} positional arguments but {} were given",
                params.len(),
                args.positional.len()
            ),
        ));
    }

    let mut domain = Kwargs::new();
    for (name, value) in params.iter().zip(&args.positional) {
        domain.insert(name.clone(), value.clone());
    }

    let mut controls = Kwargs::new();
    for (name, value) in &args.kwargs {
        if ReservedKey::is_reserved(name) {
            controls.insert(name.clone(), value.clone());
        } else if params.contains(name) {
            if domain.contains_key(name) {
                return Err(TermError::invalid_argument(
                    expectation,
                    format!("got multiple values for argument '{name}'"),
                ));
            }
            domain.insert(name.clone(), value.clone());
        } else {
            return Err(TermError::invalid_argument(
                expectation,
                format!("got an unexpected keyword argument '{name}'"),
            ));
        }
    }

    for (name, value) in defaults {
        if ReservedKey::is_reserved(name) {
            controls.entry(name.clone()).or_insert_with(|| value.clone());
        } else if params.contains(name) {
            domain.entry(name.clone()).or_insert_with(|| value.clone());
        }
    }

    if let Some(missing) = required.iter().find(|name| !domain.contains_key(*name)) {
        return Err(TermError::missing_argument(expectation, missing.clone()));
    }

    let (result_format, result_format_value) =
        match controls.get(ReservedKey::ResultFormat.as_str()) {
            None | Some(Value::Null) => (fallback, Value::from(fallback.tier)),
            Some(value) => (
                ResultFormat::from_value(value, fallback.partial_unexpected_count)?,
                value.clone(),
            ),
        };

    let include_config = control_flag(expectation, &controls, ReservedKey::IncludeConfig)?;
    let catch_exceptions = control_flag(expectation, &controls, ReservedKey::CatchExceptions)?;
    let meta = controls
        .get(ReservedKey::Meta.as_str())
        .filter(|meta| !meta.is_null())
        .cloned();

    Ok(ResolvedArgs {
        domain,
        result_format,
        result_format_value,
        include_config,
        catch_exceptions,
        meta,
    })
}

fn control_flag(expectation: &str, controls: &Kwargs, key: ReservedKey) -> Result<bool> {
    match controls.get(key.as_str()) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(other) => Err(TermError::invalid_argument(
            expectation,
            format!("{key} must be a boolean or null, found {other}"),
        )),
    }
}

impl ResolvedArgs {
    /// Returns the kwargs recorded for this call.
    ///
    /// Domain arguments are always recorded. `result_format` is added only
    /// when configuration capture was requested and the tier is not
    /// `BOOLEAN_ONLY`.
    pub fn recorded_kwargs(&self) -> Kwargs {
        let mut kwargs = self.domain.clone();
        if self.include_config && self.result_format.tier != ResultFormatTier::BooleanOnly {
            kwargs.insert(
                ReservedKey::ResultFormat.as_str().to_string(),
                self.result_format_value.clone(),
            );
        }
        kwargs
    }

    /// Returns a domain argument, if bound.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.domain.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn defaults() -> Kwargs {
        let mut defaults = Kwargs::new();
        defaults.insert("include_config".to_string(), json!(false));
        defaults.insert("catch_exceptions".to_string(), json!(false));
        defaults.insert("result_format".to_string(), json!("BASIC"));
        defaults
    }

    #[test]
    fn test_reserved_keys() {
        for key in ReservedKey::ALL {
            assert_eq!(ReservedKey::from_name(key.as_str()), Some(key));
        }
        assert!(ReservedKey::is_reserved("meta"));
        assert!(!ReservedKey::is_reserved("column"));
    }

    #[test]
    fn test_positional_binding() {
        let args = ExpectationArgs::new().positional("a").positional(3);
        let resolved = resolve_arguments(
            "expect_between",
            &params(&["column", "min_value", "max_value"]),
            &params(&["column"]),
            &args,
            &defaults(),
            ResultFormat::default(),
        )
        .unwrap();

        assert_eq!(resolved.domain, json!({"column": "a", "min_value": 3}).as_object().unwrap().clone());
        assert_eq!(resolved.result_format, ResultFormat::new(ResultFormatTier::Basic));
        assert!(!resolved.include_config);
        assert!(!resolved.catch_exceptions);
    }

    #[test]
    fn test_call_kwargs_win_over_defaults() {
        let args = ExpectationArgs::new()
            .positional("a")
            .result_format("COMPLETE")
            .catch_exceptions(true);
        let resolved = resolve_arguments(
            "expect_x",
            &params(&["column"]),
            &[],
            &args,
            &defaults(),
            ResultFormat::default(),
        )
        .unwrap();

        assert_eq!(resolved.result_format.tier, ResultFormatTier::Complete);
        assert_eq!(resolved.result_format_value, json!("COMPLETE"));
        assert!(resolved.catch_exceptions);
    }

    #[test]
    fn test_domain_defaults_apply_only_to_declared_params() {
        let mut defaults = defaults();
        defaults.insert("mostly".to_string(), json!(0.5));
        defaults.insert("unrelated".to_string(), json!(1));

        let resolved = resolve_arguments(
            "expect_x",
            &params(&["column", "mostly"]),
            &[],
            &ExpectationArgs::new().positional("a"),
            &defaults,
            ResultFormat::default(),
        )
        .unwrap();

        assert_eq!(resolved.get("mostly"), Some(&json!(0.5)));
        assert!(resolved.get("unrelated").is_none());
    }

    #[test]
    fn test_argument_errors_are_caller_faults() {
        let cases = vec![
            ExpectationArgs::new().positional("a").positional("b"),
            ExpectationArgs::new().positional("a").arg("column", "b"),
            ExpectationArgs::new().arg("colum", "a"),
            ExpectationArgs::new().positional("a").include_config(true).arg("include_config", "yes"),
        ];
        for args in cases {
            let err = resolve_arguments(
                "expect_x",
                &params(&["column"]),
                &[],
                &args,
                &defaults(),
                ResultFormat::default(),
            )
            .unwrap_err();
            assert!(err.is_caller_fault(), "{err}");
        }
    }

    #[test]
    fn test_missing_required_argument() {
        let err = resolve_arguments(
            "expect_x",
            &params(&["column"]),
            &params(&["column"]),
            &ExpectationArgs::new(),
            &defaults(),
            ResultFormat::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TermError::MissingArgument { ref argument, .. } if argument == "column"));
    }

    #[test]
    fn test_unknown_tier_is_rejected() {
        let err = resolve_arguments(
            "expect_x",
            &[],
            &[],
            &ExpectationArgs::new().result_format("LOUD"),
            &defaults(),
            ResultFormat::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TermError::UnknownResultFormat(_)));
    }

    #[test]
    fn test_fallback_used_without_defaults() {
        let fallback = ResultFormat::new(ResultFormatTier::Summary).with_partial_unexpected_count(3);
        let resolved = resolve_arguments(
            "expect_x",
            &[],
            &[],
            &ExpectationArgs::new(),
            &Kwargs::new(),
            fallback,
        )
        .unwrap();
        assert_eq!(resolved.result_format, fallback);
        assert_eq!(resolved.result_format_value, json!("SUMMARY"));
    }

    #[test]
    fn test_recorded_kwargs() {
        let resolve = |args: ExpectationArgs| {
            resolve_arguments(
                "expect_x",
                &params(&["value"]),
                &[],
                &args,
                &defaults(),
                ResultFormat::default(),
            )
            .unwrap()
        };

        let plain = resolve(ExpectationArgs::new().positional("a"));
        assert_eq!(plain.recorded_kwargs(), json!({"value": "a"}).as_object().unwrap().clone());

        let with_config = resolve(ExpectationArgs::new().positional("a").include_config(true));
        assert_eq!(
            with_config.recorded_kwargs(),
            json!({"value": "a", "result_format": "BASIC"}).as_object().unwrap().clone()
        );

        let boolean_only = resolve(
            ExpectationArgs::new()
                .positional("a")
                .include_config(true)
                .result_format("BOOLEAN_ONLY"),
        );
        assert_eq!(boolean_only.recorded_kwargs(), json!({"value": "a"}).as_object().unwrap().clone());
    }

    #[test]
    fn test_meta_is_kept() {
        let resolved = resolve_arguments(
            "expect_x",
            &[],
            &[],
            &ExpectationArgs::new().meta(json!({"owner": "data-eng"})),
            &defaults(),
            ResultFormat::default(),
        )
        .unwrap();
        assert_eq!(resolved.meta, Some(json!({"owner": "data-eng"})));
    }
}
