//! Filter parsing
//!
//! Parses JSON filter requests into a [`FilterGroup`] with size limits and
//! caller-side validation.

use crate::core::constants::{FILTER_MAX_ITEMS, FILTER_MAX_JSON_BYTES};

use super::error::FilterError;
use super::types::{FilterGroup, FilterItem};

/// Request size limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterLimits {
    pub max_json_bytes: usize,
    pub max_items: usize,
}

impl Default for FilterLimits {
    fn default() -> Self {
        Self {
            max_json_bytes: FILTER_MAX_JSON_BYTES,
            max_items: FILTER_MAX_ITEMS,
        }
    }
}

/// Parse a filter request.
///
/// Accepts a full group object or a bare array of `{keyName, values}` items,
/// which becomes the group's `and` list.
pub fn parse_filter_group(json_str: &str, limits: &FilterLimits) -> Result<FilterGroup, FilterError> {
    if json_str.len() > limits.max_json_bytes {
        return Err(FilterError::invalid_request(
            "FILTER_JSON_TOO_LARGE",
            format!(
                "Filter JSON exceeds maximum size of {} bytes",
                limits.max_json_bytes
            ),
        ));
    }

    let invalid = |e: serde_json::Error| FilterError::invalid_request("INVALID_FILTER_JSON", e.to_string());
    let group = if json_str.trim_start().starts_with('[') {
        let items: Vec<FilterItem> = serde_json::from_str(json_str).map_err(invalid)?;
        FilterGroup::from_items(items)
    } else {
        serde_json::from_str(json_str).map_err(invalid)?
    };

    if group.item_count() > limits.max_items {
        return Err(FilterError::invalid_request(
            "TOO_MANY_FILTERS",
            format!("Maximum {} filters allowed", limits.max_items),
        ));
    }

    group.validate()?;

    tracing::trace!(
        and = group.and.len(),
        and_op = group.and_op.len(),
        or = group.or.len(),
        "Filter request parsed"
    );

    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::super::types::FilterOperator;
    use super::*;

    #[test]
    fn test_parse_group_object() {
        let json = r#"{
            "and": [{"keyName": "grade", "values": ["10"]}],
            "or": [{"operator": "contains", "keyType": "string", "values": ["an"]}]
        }"#;
        let group = parse_filter_group(json, &FilterLimits::default()).unwrap();
        assert_eq!(group.and.len(), 1);
        assert!(group.and_op.is_empty());
        assert!(group.or[0].is_wildcard());
        assert_eq!(group.or[0].operator, FilterOperator::Contains);
    }

    #[test]
    fn test_parse_bare_item_list() {
        let json = r#" [{"keyName": "grade", "values": ["10", "11"]}]"#;
        let group = parse_filter_group(json, &FilterLimits::default()).unwrap();
        assert_eq!(group, FilterGroup::from_items(vec![FilterItem::new("grade", ["10", "11"])]));
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_filter_group("not valid json", &FilterLimits::default()).unwrap_err();
        assert_eq!(err.code(), "INVALID_FILTER_JSON");
    }

    #[test]
    fn test_parse_unsupported_operator() {
        let json = r#"{"andOp": [{"keyName": "grade", "operator": "between", "keyType": "int", "values": [1]}]}"#;
        let err = parse_filter_group(json, &FilterLimits::default()).unwrap_err();
        assert_eq!(err.code(), "INVALID_FILTER_JSON");
        assert!(err.to_string().contains("Operator not supported: between"));
    }

    #[test]
    fn test_parse_too_large() {
        let limits = FilterLimits {
            max_json_bytes: 16,
            ..Default::default()
        };
        let err = parse_filter_group(r#"[{"keyName": "grade", "values": ["10"]}]"#, &limits)
            .unwrap_err();
        assert_eq!(err.code(), "FILTER_JSON_TOO_LARGE");
    }

    #[test]
    fn test_parse_too_many_filters() {
        let limits = FilterLimits {
            max_items: 1,
            ..Default::default()
        };
        let json = r#"[{"keyName": "a", "values": ["1"]}, {"keyName": "b", "values": ["2"]}]"#;
        let err = parse_filter_group(json, &limits).unwrap_err();
        assert_eq!(err.code(), "TOO_MANY_FILTERS");
    }

    #[test]
    fn test_parse_rejects_empty_values() {
        let json = r#"[{"keyName": "grade", "values": []}]"#;
        let err = parse_filter_group(json, &FilterLimits::default()).unwrap_err();
        assert!(matches!(err, FilterError::EmptyValues { .. }));
    }

    #[test]
    fn test_parse_rejects_range_arity() {
        let json = r#"{"andOp": [{"keyName": "grade", "operator": 2, "keyType": "int", "values": [10]}]}"#;
        let err = parse_filter_group(json, &FilterLimits::default()).unwrap_err();
        assert!(matches!(err, FilterError::Arity { .. }));
    }
}
