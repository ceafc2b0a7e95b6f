//! Result verbosity tiers.

use crate::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Number of unexpected values kept in partial lists unless configured otherwise.
pub const DEFAULT_PARTIAL_UNEXPECTED_COUNT: usize = 20;

/// How much detail an expectation result carries.
///
/// Tiers are totally ordered; every field present at a lower tier is also
/// present at a higher one.
///
/// ```rust
/// use term_expect::core::ResultFormatTier;
///
/// assert!(ResultFormatTier::BooleanOnly < ResultFormatTier::Basic);
/// assert!(ResultFormatTier::Summary < ResultFormatTier::Complete);
/// assert_eq!("SUMMARY".parse::<ResultFormatTier>().unwrap(), ResultFormatTier::Summary);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultFormatTier {
    /// Only `success` is reported
    BooleanOnly = 0,
    /// Counts, percentages and a partial list of unexpected values
    #[default]
    Basic = 1,
    /// Adds partial indices and a frequency table of the partial values
    Summary = 2,
    /// Adds the full, untruncated unexpected values and indices
    Complete = 3,
}

impl ResultFormatTier {
    /// All tiers in ascending order of detail.
    pub const ALL: [ResultFormatTier; 4] = [
        ResultFormatTier::BooleanOnly,
        ResultFormatTier::Basic,
        ResultFormatTier::Summary,
        ResultFormatTier::Complete,
    ];

    /// Returns the canonical tier name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultFormatTier::BooleanOnly => "BOOLEAN_ONLY",
            ResultFormatTier::Basic => "BASIC",
            ResultFormatTier::Summary => "SUMMARY",
            ResultFormatTier::Complete => "COMPLETE",
        }
    }

    /// Returns true if this tier is at least as detailed as `other`.
    pub fn is_at_least(&self, other: ResultFormatTier) -> bool {
        *self >= other
    }
}

impl fmt::Display for ResultFormatTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResultFormatTier {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self> {
        ResultFormatTier::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| TermError::UnknownResultFormat(s.to_string()))
    }
}

impl From<ResultFormatTier> for Value {
    fn from(tier: ResultFormatTier) -> Self {
        Value::String(tier.as_str().to_string())
    }
}

/// A verbosity tier together with its partial-list limit.
///
/// On the wire this is either a bare tier name (`"SUMMARY"`) or an object
/// `{"result_obj_format": "SUMMARY", "partial_unexpected_count": 5}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultFormat {
    /// The verbosity tier
    #[serde(rename = "result_obj_format")]
    pub tier: ResultFormatTier,
    /// Maximum number of entries in partial unexpected lists
    #[serde(default = "default_partial_unexpected_count")]
    pub partial_unexpected_count: usize,
}

fn default_partial_unexpected_count() -> usize {
    DEFAULT_PARTIAL_UNEXPECTED_COUNT
}

impl Default for ResultFormat {
    fn default() -> Self {
        Self::new(ResultFormatTier::default())
    }
}

impl ResultFormat {
    /// Creates a format for `tier` with the default partial limit.
    pub fn new(tier: ResultFormatTier) -> Self {
        Self {
            tier,
            partial_unexpected_count: DEFAULT_PARTIAL_UNEXPECTED_COUNT,
        }
    }

    /// Sets the partial list limit.
    pub fn with_partial_unexpected_count(mut self, count: usize) -> Self {
        self.partial_unexpected_count = count;
        self
    }

    /// Parses a `result_format` argument.
    ///
    /// A bare string is a tier name and takes `default_partial` as its limit.
    /// An object must carry `result_obj_format` and may carry
    /// `partial_unexpected_count`.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::UnknownResultFormat`] for an unknown tier name and
    /// [`TermError::InvalidResultFormat`] for any other malformed value.
    pub fn from_value(value: &Value, default_partial: usize) -> Result<Self> {
        match value {
            Value::String(name) => {
                Ok(Self::new(name.parse()?).with_partial_unexpected_count(default_partial))
            }
            Value::Object(fields) => Self::from_object(fields, default_partial),
            other => Err(TermError::InvalidResultFormat(format!(
                "expected a tier name or an object, found {other}"
            ))),
        }
    }

    fn from_object(fields: &Map<String, Value>, default_partial: usize) -> Result<Self> {
        if let Some(key) = fields
            .keys()
            .find(|key| *key != "result_obj_format" && *key != "partial_unexpected_count")
        {
            return Err(TermError::InvalidResultFormat(format!(
                "unknown result format key '{key}'"
            )));
        }

        let tier = match fields.get("result_obj_format") {
            Some(Value::String(name)) => name.parse()?,
            Some(other) => {
                return Err(TermError::InvalidResultFormat(format!(
                    "result_obj_format must be a tier name, found {other}"
                )))
            }
            None => {
                return Err(TermError::InvalidResultFormat(
                    "missing result_obj_format".to_string(),
                ))
            }
        };

        let partial_unexpected_count = match fields.get("partial_unexpected_count") {
            None | Some(Value::Null) => default_partial,
            Some(value) => value.as_u64().map(|count| count as usize).ok_or_else(|| {
                TermError::InvalidResultFormat(format!(
                    "partial_unexpected_count must be a non-negative integer, found {value}"
                ))
            })?,
        };

        Ok(Self {
            tier,
            partial_unexpected_count,
        })
    }
}

impl From<ResultFormatTier> for ResultFormat {
    fn from(tier: ResultFormatTier) -> Self {
        Self::new(tier)
    }
}

impl From<ResultFormat> for Value {
    fn from(format: ResultFormat) -> Self {
        let mut fields = Map::new();
        fields.insert("result_obj_format".to_string(), format.tier.into());
        fields.insert(
            "partial_unexpected_count".to_string(),
            Value::from(format.partial_unexpected_count),
        );
        Value::Object(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tier_ordering() {
        assert!(ResultFormatTier::BooleanOnly < ResultFormatTier::Basic);
        assert!(ResultFormatTier::Basic < ResultFormatTier::Summary);
        assert!(ResultFormatTier::Summary < ResultFormatTier::Complete);
        assert!(ResultFormatTier::Complete.is_at_least(ResultFormatTier::Summary));
        assert!(!ResultFormatTier::Basic.is_at_least(ResultFormatTier::Summary));
    }

    #[test]
    fn test_tier_parse_and_display() {
        for tier in ResultFormatTier::ALL {
            assert_eq!(tier.to_string().parse::<ResultFormatTier>().unwrap(), tier);
        }

        let err = "VERBOSE".parse::<ResultFormatTier>().unwrap_err();
        assert!(matches!(err, TermError::UnknownResultFormat(ref name) if name == "VERBOSE"));
        // Tier names are case sensitive.
        assert!("basic".parse::<ResultFormatTier>().is_err());
    }

    #[test]
    fn test_tier_serde() {
        let json = serde_json::to_string(&ResultFormatTier::BooleanOnly).unwrap();
        assert_eq!(json, "\"BOOLEAN_ONLY\"");

        let tier: ResultFormatTier = serde_json::from_str("\"COMPLETE\"").unwrap();
        assert_eq!(tier, ResultFormatTier::Complete);
    }

    #[test]
    fn test_from_string_value() {
        let format = ResultFormat::from_value(&json!("SUMMARY"), 7).unwrap();
        assert_eq!(format.tier, ResultFormatTier::Summary);
        assert_eq!(format.partial_unexpected_count, 7);
    }

    #[test]
    fn test_from_object_value() {
        let format = ResultFormat::from_value(
            &json!({"result_obj_format": "COMPLETE", "partial_unexpected_count": 1}),
            DEFAULT_PARTIAL_UNEXPECTED_COUNT,
        )
        .unwrap();
        assert_eq!(format.tier, ResultFormatTier::Complete);
        assert_eq!(format.partial_unexpected_count, 1);

        let format =
            ResultFormat::from_value(&json!({"result_obj_format": "BASIC"}), 20).unwrap();
        assert_eq!(format, ResultFormat::new(ResultFormatTier::Basic));
    }

    #[test]
    fn test_malformed_values() {
        assert!(matches!(
            ResultFormat::from_value(&json!(3), 20),
            Err(TermError::InvalidResultFormat(_))
        ));
        assert!(matches!(
            ResultFormat::from_value(&json!({"partial_unexpected_count": 3}), 20),
            Err(TermError::InvalidResultFormat(_))
        ));
        assert!(matches!(
            ResultFormat::from_value(
                &json!({"result_obj_format": "BASIC", "partial_unexpected_count": -1}),
                20
            ),
            Err(TermError::InvalidResultFormat(_))
        ));
        assert!(matches!(
            ResultFormat::from_value(&json!({"result_obj_format": "BASIC", "colour": true}), 20),
            Err(TermError::InvalidResultFormat(_))
        ));
        assert!(matches!(
            ResultFormat::from_value(&json!({"result_obj_format": "LOUD"}), 20),
            Err(TermError::UnknownResultFormat(_))
        ));
    }

    #[test]
    fn test_value_conversion() {
        assert_eq!(Value::from(ResultFormatTier::Basic), json!("BASIC"));
        assert_eq!(
            Value::from(ResultFormat::new(ResultFormatTier::Summary).with_partial_unexpected_count(3)),
            json!({"result_obj_format": "SUMMARY", "partial_unexpected_count": 3})
        );
    }
}
