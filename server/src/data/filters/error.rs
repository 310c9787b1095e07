//! Filter error types

use thiserror::Error;

use super::types::FilterOperator;
use super::value::ValueType;

/// Errors raised while parsing, compiling, or evaluating filters.
///
/// All of these are deterministic for a given input and are never retried.
#[derive(Error, Debug)]
pub enum FilterError {
    /// Key name does not match any field of the entity
    #[error("Field '{field}' not found on {entity}")]
    FieldNotFound { entity: &'static str, field: String },

    /// Filter item carries no values
    #[error("Filter on '{field}' has no values")]
    EmptyValues { field: String },

    /// Operator called with the wrong number of values
    #[error("{operator} requires exactly {expected} value(s), got {actual}")]
    Arity {
        operator: FilterOperator,
        expected: usize,
        actual: usize,
    },

    /// Operator applied where it cannot mean anything
    #[error("Logic error: {0}")]
    Logic(String),

    /// Unknown operator name or code
    #[error("Operator not supported: {0}")]
    UnsupportedOperator(String),

    /// Raw filter value does not parse as the field's type
    #[error("Cannot parse '{raw}' as {value_type} for field '{field}': {reason}")]
    Parse {
        field: String,
        raw: String,
        value_type: ValueType,
        reason: String,
    },

    /// Type outside a closed dispatch set
    #[error("Unknown type: {0}")]
    UnknownType(ValueType),

    /// Typed value does not match the field's effective type
    #[error("Field '{field}' is {expected}, got {actual} value")]
    TypeMismatch {
        field: String,
        expected: ValueType,
        actual: ValueType,
    },

    /// Nullable field read while absent
    #[error("Field '{field}' is null")]
    NullValue { field: String },

    /// Malformed or oversized filter request
    #[error("{message}")]
    InvalidRequest { code: &'static str, message: String },
}

impl FilterError {
    pub fn field_not_found(entity: &'static str, field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            entity,
            field: field.into(),
        }
    }

    pub fn arity(operator: FilterOperator, expected: usize, actual: usize) -> Self {
        Self::Arity {
            operator,
            expected,
            actual,
        }
    }

    pub fn invalid_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            code,
            message: message.into(),
        }
    }

    /// Stable machine-readable code for API consumers
    pub fn code(&self) -> &'static str {
        match self {
            Self::FieldNotFound { .. } => "FILTER_FIELD_NOT_FOUND",
            Self::EmptyValues { .. } => "FILTER_EMPTY_VALUES",
            Self::Arity { .. } => "FILTER_ARITY",
            Self::Logic(_) => "FILTER_LOGIC",
            Self::UnsupportedOperator(_) => "FILTER_UNSUPPORTED_OPERATOR",
            Self::Parse { .. } => "FILTER_PARSE",
            Self::UnknownType(_) => "FILTER_UNKNOWN_TYPE",
            Self::TypeMismatch { .. } => "FILTER_TYPE_MISMATCH",
            Self::NullValue { .. } => "FILTER_NULL_VALUE",
            Self::InvalidRequest { code, .. } => code,
        }
    }

    /// Whether the caller sent a bad request, as opposed to data faulting
    /// during evaluation
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Self::NullValue { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_error_display() {
        let err = FilterError::arity(FilterOperator::Range, 2, 3);
        assert_eq!(err.to_string(), "Range requires exactly 2 value(s), got 3");
        assert_eq!(err.code(), "FILTER_ARITY");
    }

    #[test]
    fn test_field_not_found_display() {
        let err = FilterError::field_not_found("student", "Grade");
        assert_eq!(err.to_string(), "Field 'Grade' not found on student");
    }

    #[test]
    fn test_unknown_type_names_type() {
        let err = FilterError::UnknownType(ValueType::Timestamp);
        assert_eq!(err.to_string(), "Unknown type: timestamp");
    }

    #[test]
    fn test_invalid_request_keeps_code() {
        let err = FilterError::invalid_request("TOO_MANY_FILTERS", "Maximum 50 filters allowed");
        assert_eq!(err.code(), "TOO_MANY_FILTERS");
        assert_eq!(err.to_string(), "Maximum 50 filters allowed");
        assert!(err.is_caller_error());
        assert!(
            !FilterError::NullValue {
                field: "gpa".into()
            }
            .is_caller_error()
        );
    }
}
