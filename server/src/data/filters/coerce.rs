//! String-to-typed coercion for plain filter items
//!
//! Each supported effective type has a dedicated parser. Parse failures are
//! returned to the caller, never defaulted.

use chrono::NaiveDate;

use super::error::FilterError;
use super::schema::FieldDescriptor;
use super::value::{Value, ValueType};

/// Date format for raw filter values
pub const RAW_DATE_FORMAT: &str = "%Y%m%d";

/// Parse one raw value as the field's effective type
pub fn coerce_raw<T>(field: &FieldDescriptor<T>, raw: &str) -> Result<Value, FilterError> {
    let value_type = field.value_type();
    let parse_error = |reason: String| FilterError::Parse {
        field: field.name().to_string(),
        raw: raw.to_string(),
        value_type,
        reason,
    };

    match value_type {
        ValueType::String => Ok(Value::Text(raw.to_string())),
        ValueType::Int => raw
            .trim()
            .parse()
            .map(Value::Int)
            .map_err(|e| parse_error(e.to_string())),
        ValueType::Long => raw
            .trim()
            .parse()
            .map(Value::Long)
            .map_err(|e| parse_error(e.to_string())),
        ValueType::Float => raw
            .trim()
            .parse()
            .map(Value::Float)
            .map_err(|e| parse_error(e.to_string())),
        ValueType::Double => raw
            .trim()
            .parse()
            .map(Value::Double)
            .map_err(|e| parse_error(e.to_string())),
        ValueType::Bool => parse_bool(raw).map(Value::Bool).map_err(parse_error),
        ValueType::Date => NaiveDate::parse_from_str(raw.trim(), RAW_DATE_FORMAT)
            .map(Value::Date)
            .map_err(|e| parse_error(e.to_string())),
        ValueType::Timestamp => Err(FilterError::UnknownType(value_type)),
    }
}

/// Parse every raw value of an item
pub fn coerce_values<T>(
    field: &FieldDescriptor<T>,
    raws: &[String],
) -> Result<Vec<Value>, FilterError> {
    raws.iter().map(|raw| coerce_raw(field, raw)).collect()
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err("expected true or false".to_string())
    }
}
