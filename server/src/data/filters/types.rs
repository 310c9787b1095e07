//! Filter request model
//!
//! Wire-level description of the filters a caller wants applied: plain
//! string-valued equality items, typed operator items, and the group that
//! combines them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::error::FilterError;
use super::value::{Value, ValueType};

/// Filter operators
///
/// Deserializes from a case-insensitive name (`"in"`, `"notIn"`, `"range"`,
/// `"contains"`, `"notNull"`) or a numeric code `0..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "OperatorRepr")]
pub enum FilterOperator {
    In,
    NotIn,
    Range,
    Contains,
    NotNull,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OperatorRepr {
    Code(i64),
    Name(String),
}

impl TryFrom<OperatorRepr> for FilterOperator {
    type Error = FilterError;

    fn try_from(repr: OperatorRepr) -> Result<Self, Self::Error> {
        match repr {
            OperatorRepr::Code(code) => Self::from_code(code),
            OperatorRepr::Name(name) => name.parse(),
        }
    }
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 5] = [
        Self::In,
        Self::NotIn,
        Self::Range,
        Self::Contains,
        Self::NotNull,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::In => "In",
            Self::NotIn => "NotIn",
            Self::Range => "Range",
            Self::Contains => "Contains",
            Self::NotNull => "NotNull",
        }
    }

    pub const fn code(&self) -> i64 {
        match self {
            Self::In => 0,
            Self::NotIn => 1,
            Self::Range => 2,
            Self::Contains => 3,
            Self::NotNull => 4,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, FilterError> {
        Self::ALL
            .into_iter()
            .find(|op| op.code() == code)
            .ok_or_else(|| FilterError::UnsupportedOperator(code.to_string()))
    }

    /// Exact number of values the operator takes, if fixed
    pub const fn arity(&self) -> Option<usize> {
        match self {
            Self::Range => Some(2),
            Self::Contains => Some(1),
            Self::In | Self::NotIn | Self::NotNull => None,
        }
    }

    pub fn check_arity(&self, actual: usize) -> Result<(), FilterError> {
        match self.arity() {
            Some(expected) if expected != actual => {
                Err(FilterError::arity(*self, expected, actual))
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for FilterOperator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| FilterError::UnsupportedOperator(s.to_string()))
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality / membership filter in raw string form
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterItem {
    pub key_name: String,
    pub values: Vec<String>,
}

impl FilterItem {
    pub fn new<I, S>(key_name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key_name: key_name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Typed filter with an explicit operator.
///
/// A missing `key_name` is a wildcard: the condition applies to every field
/// whose effective type equals `key_type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawOperatorItem")]
pub struct FilterOperatorItem {
    pub key_name: Option<String>,
    pub operator: FilterOperator,
    pub key_type: ValueType,
    pub values: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOperatorItem {
    #[serde(default)]
    key_name: Option<String>,
    operator: FilterOperator,
    key_type: ValueType,
    #[serde(default)]
    values: Vec<JsonValue>,
}

impl TryFrom<RawOperatorItem> for FilterOperatorItem {
    type Error = FilterError;

    fn try_from(raw: RawOperatorItem) -> Result<Self, Self::Error> {
        let values = raw
            .values
            .iter()
            .map(|json| {
                Value::from_json(json, raw.key_type).map_err(|reason| FilterError::Parse {
                    field: raw.key_name.clone().unwrap_or_else(|| "*".to_string()),
                    raw: json.to_string(),
                    value_type: raw.key_type,
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            key_name: raw.key_name,
            operator: raw.operator,
            key_type: raw.key_type,
            values,
        })
    }
}

impl FilterOperatorItem {
    pub fn new(
        key_name: impl Into<String>,
        operator: FilterOperator,
        key_type: ValueType,
        values: Vec<Value>,
    ) -> Self {
        Self {
            key_name: Some(key_name.into()),
            operator,
            key_type,
            values,
        }
    }

    pub fn wildcard(operator: FilterOperator, key_type: ValueType, values: Vec<Value>) -> Self {
        Self {
            key_name: None,
            operator,
            key_type,
            values,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.key_name.is_none()
    }

    fn label(&self) -> &str {
        self.key_name.as_deref().unwrap_or("*")
    }

    fn validate(&self) -> Result<(), FilterError> {
        if self.values.is_empty() && self.operator != FilterOperator::NotNull {
            return Err(FilterError::EmptyValues {
                field: self.label().to_string(),
            });
        }
        self.operator.check_arity(self.values.len())
    }
}

/// A complete filter request.
///
/// The final predicate is: every `and` item, AND every `and_op` item, AND
/// one OR clause over all wildcard `or` items, AND one OR clause over all
/// named `or` items. The two OR clauses are conjoined with each other, not
/// merged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterGroup {
    #[serde(default)]
    pub and: Vec<FilterItem>,
    #[serde(default)]
    pub and_op: Vec<FilterOperatorItem>,
    #[serde(default)]
    pub or: Vec<FilterOperatorItem>,
}

impl FilterGroup {
    /// Group with only `and` items populated
    pub fn from_items(items: Vec<FilterItem>) -> Self {
        Self {
            and: items,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.and.is_empty() && self.and_op.is_empty() && self.or.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.and.len() + self.and_op.len() + self.or.len()
    }

    /// Check caller-side invariants: non-empty keys and values, operator
    /// arity, and named `and_op` items.
    pub fn validate(&self) -> Result<(), FilterError> {
        for item in &self.and {
            if item.key_name.is_empty() {
                return Err(FilterError::invalid_request(
                    "EMPTY_FILTER_KEY",
                    "Filter item has an empty keyName",
                ));
            }
            if item.values.is_empty() {
                return Err(FilterError::EmptyValues {
                    field: item.key_name.clone(),
                });
            }
        }

        for item in &self.and_op {
            if item.is_wildcard() {
                return Err(FilterError::invalid_request(
                    "MISSING_FILTER_KEY",
                    format!("andOp {} filter requires a keyName", item.operator),
                ));
            }
            item.validate()?;
        }

        for item in &self.or {
            item.validate()?;
        }

        Ok(())
    }
}
