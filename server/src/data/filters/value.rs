//! Scalar values and effective field types
//!
//! `Value` is the closed set of scalars a filter compares against. Every
//! filterable field resolves to exactly one `ValueType`; optional fields
//! resolve to the type they wrap.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;
use sqlx::{Decode, Sqlite, Type};

/// Effective type of a filterable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Long,
    Float,
    Double,
    #[serde(alias = "boolean")]
    Bool,
    Date,
    String,
    #[serde(alias = "datetime")]
    Timestamp,
}

impl ValueType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::Date => "date",
            Self::String => "string",
            Self::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed scalar
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Date(NaiveDate),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Int(_) => ValueType::Int,
            Self::Long(_) => ValueType::Long,
            Self::Float(_) => ValueType::Float,
            Self::Double(_) => ValueType::Double,
            Self::Bool(_) => ValueType::Bool,
            Self::Date(_) => ValueType::Date,
            Self::Text(_) => ValueType::String,
            Self::Timestamp(_) => ValueType::Timestamp,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Decode a JSON scalar as the given type.
    ///
    /// Dates use ISO `YYYY-MM-DD`, timestamps RFC 3339. Ints are range-checked.
    pub fn from_json(json: &JsonValue, value_type: ValueType) -> Result<Self, String> {
        let mismatch = || format!("expected {} value, got {}", value_type, json);
        match value_type {
            ValueType::Int => json
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Self::Int)
                .ok_or_else(mismatch),
            ValueType::Long => json.as_i64().map(Self::Long).ok_or_else(mismatch),
            ValueType::Float => json
                .as_f64()
                .map(|n| Self::Float(n as f32))
                .ok_or_else(mismatch),
            ValueType::Double => json.as_f64().map(Self::Double).ok_or_else(mismatch),
            ValueType::Bool => json.as_bool().map(Self::Bool).ok_or_else(mismatch),
            ValueType::Date => json
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
                .map(Self::Date)
                .ok_or_else(mismatch),
            ValueType::String => json
                .as_str()
                .map(|s| Self::Text(s.to_string()))
                .ok_or_else(mismatch),
            ValueType::Timestamp => json
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| Self::Timestamp(dt.with_timezone(&Utc)))
                .ok_or_else(mismatch),
        }
    }
}

// Only values of the same variant are ordered.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.partial_cmp(b),
            (Self::Long(a), Self::Long(b)) => a.partial_cmp(b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Double(a), Self::Double(b)) => a.partial_cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.partial_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.partial_cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Long(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Date(v) => write!(f, "{}", v),
            Self::Text(v) => write!(f, "{:?}", v),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(v) => serializer.serialize_i32(*v),
            Self::Long(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f32(*v),
            Self::Double(v) => serializer.serialize_f64(*v),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Date(v) => serializer.collect_str(v),
            Self::Text(v) => serializer.serialize_str(v),
            Self::Timestamp(v) => serializer.serialize_str(&v.to_rfc3339()),
        }
    }
}

/// A Rust type that can back a filterable field.
///
/// `Option<V>` is the nullable wrapper: same effective type as `V`,
/// flagged nullable, and reads `None` as absent. An absent value type
/// (number, bool, date, timestamp) faults when compared; an absent string
/// is a reference that simply matches nothing.
pub trait FieldValue: Send + Sync + 'static {
    const VALUE_TYPE: ValueType;
    const NULLABLE: bool = false;
    const NULL_FAULTS: bool = false;

    fn into_value(self) -> Option<Value>;
}

/// A non-nullable scalar that maps one-to-one onto a `Value` variant
pub trait ScalarValue: FieldValue + Clone + PartialOrd + Sized {
    /// Reference types read `None` as "no match" instead of faulting
    const REFERENCE: bool = false;

    fn from_value(value: Value) -> Option<Self>;
}

/// Scalar types supported by column value lookup.
///
/// The closed set of types a column lookup can decode, both from memory
/// and from SQLite.
pub trait LookupValue:
    ScalarValue + for<'r> Decode<'r, Sqlite> + Type<Sqlite> + Unpin
{
}

macro_rules! scalar_value {
    ($ty:ty, $value_type:ident, $variant:ident, $reference:literal) => {
        impl FieldValue for $ty {
            const VALUE_TYPE: ValueType = ValueType::$value_type;

            fn into_value(self) -> Option<Value> {
                Some(Value::$variant(self))
            }
        }

        impl ScalarValue for $ty {
            const REFERENCE: bool = $reference;

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

scalar_value!(i32, Int, Int, false);
scalar_value!(i64, Long, Long, false);
scalar_value!(f32, Float, Float, false);
scalar_value!(f64, Double, Double, false);
scalar_value!(bool, Bool, Bool, false);
scalar_value!(NaiveDate, Date, Date, false);
scalar_value!(String, String, Text, true);
scalar_value!(DateTime<Utc>, Timestamp, Timestamp, false);

impl LookupValue for i32 {}
impl LookupValue for i64 {}
impl LookupValue for f32 {}
impl LookupValue for f64 {}
impl LookupValue for bool {}
impl LookupValue for NaiveDate {}
impl LookupValue for String {}

impl<V: ScalarValue> FieldValue for Option<V> {
    const VALUE_TYPE: ValueType = V::VALUE_TYPE;
    const NULLABLE: bool = true;
    const NULL_FAULTS: bool = !V::REFERENCE;

    fn into_value(self) -> Option<Value> {
        self.and_then(FieldValue::into_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_type_serde_names() {
        let ty: ValueType = serde_json::from_str(r#""int""#).unwrap();
        assert_eq!(ty, ValueType::Int);
        let ty: ValueType = serde_json::from_str(r#""boolean""#).unwrap();
        assert_eq!(ty, ValueType::Bool);
        assert_eq!(serde_json::to_string(&ValueType::Double).unwrap(), r#""double""#);
    }

    #[test]
    fn test_from_json_int_range_checked() {
        assert_eq!(
            Value::from_json(&json!(11), ValueType::Int).unwrap(),
            Value::Int(11)
        );
        assert!(Value::from_json(&json!(5_000_000_000i64), ValueType::Int).is_err());
        assert_eq!(
            Value::from_json(&json!(5_000_000_000i64), ValueType::Long).unwrap(),
            Value::Long(5_000_000_000)
        );
    }

    #[test]
    fn test_from_json_date_and_timestamp() {
        let date = Value::from_json(&json!("2024-02-29"), ValueType::Date).unwrap();
        assert_eq!(
            date,
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        let ts = Value::from_json(&json!("2024-01-01T10:00:00+02:00"), ValueType::Timestamp)
            .unwrap();
        assert_eq!(ts.to_string(), "2024-01-01T08:00:00+00:00");
        assert!(Value::from_json(&json!(20240101), ValueType::Date).is_err());
    }

    #[test]
    fn test_from_json_rejects_wrong_shape() {
        let err = Value::from_json(&json!("ten"), ValueType::Int).unwrap_err();
        assert_eq!(err, r#"expected int value, got "ten""#);
        assert!(Value::from_json(&json!(1), ValueType::String).is_err());
        assert!(Value::from_json(&json!("true"), ValueType::Bool).is_err());
    }

    #[test]
    fn test_ordering_only_within_variant() {
        assert!(Value::Int(1) < Value::Int(2));
        assert!(Value::Text("a".into()) < Value::Text("b".into()));
        assert_eq!(Value::Int(1).partial_cmp(&Value::Long(1)), None);
        assert_ne!(Value::Int(1), Value::Long(1));
    }

    #[test]
    fn test_serialize_untagged() {
        let values = vec![
            Value::Int(3),
            Value::Text("x".into()),
            Value::Bool(true),
            Value::Date(NaiveDate::from_ymd_opt(2010, 5, 1).unwrap()),
        ];
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"[3,"x",true,"2010-05-01"]"#
        );
    }

    #[test]
    fn test_option_unwraps_to_inner_type() {
        assert_eq!(<Option<i32> as FieldValue>::VALUE_TYPE, ValueType::Int);
        assert!(<Option<i32> as FieldValue>::NULLABLE);
        assert!(!<i32 as FieldValue>::NULLABLE);
        assert!(<Option<i32> as FieldValue>::NULL_FAULTS);
        assert!(<Option<NaiveDate> as FieldValue>::NULL_FAULTS);
        assert_eq!(Some(4i32).into_value(), Some(Value::Int(4)));
        assert_eq!(None::<i32>.into_value(), None);
    }

    #[test]
    fn test_optional_string_does_not_fault() {
        assert_eq!(<Option<String> as FieldValue>::VALUE_TYPE, ValueType::String);
        assert!(<Option<String> as FieldValue>::NULLABLE);
        assert!(!<Option<String> as FieldValue>::NULL_FAULTS);
        assert!(!<String as FieldValue>::NULL_FAULTS);
    }

    #[test]
    fn test_scalar_round_trips_variant() {
        assert_eq!(i64::from_value(Value::Long(9)), Some(9));
        assert_eq!(i64::from_value(Value::Int(9)), None);
        assert_eq!(
            String::from_value(Value::Text("a".into())),
            Some("a".to_string())
        );
    }
}
