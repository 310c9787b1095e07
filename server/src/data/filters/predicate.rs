//! Predicate compilation
//!
//! A [`FilterGroup`] is compiled into an ordered list of [`Predicate`]
//! clauses, one per chained filter step. The same tree is evaluated in
//! memory ([`Predicate::evaluate`]) or rendered to SQL (see `sql.rs`).

use std::fmt;
use std::sync::Arc;

use super::coerce::coerce_values;
use super::error::FilterError;
use super::schema::{EntitySchema, FieldDescriptor};
use super::types::{FilterGroup, FilterOperator, FilterOperatorItem};
use super::value::{Value, ValueType};

/// Boolean condition over a single record of `T`
pub enum Predicate<T> {
    /// `field == value`
    Eq {
        field: Arc<FieldDescriptor<T>>,
        value: Value,
    },
    /// `field` is a member of `values`
    In {
        field: Arc<FieldDescriptor<T>>,
        values: Vec<Value>,
    },
    Not(Box<Predicate<T>>),
    /// Half-open `lower <= field < upper`
    Range {
        field: Arc<FieldDescriptor<T>>,
        lower: Value,
        upper: Value,
    },
    /// Case-insensitive substring match; `needle` is stored uppercased
    Contains {
        field: Arc<FieldDescriptor<T>>,
        needle: String,
    },
    NotNull { field: Arc<FieldDescriptor<T>> },
    And(Vec<Predicate<T>>),
    Or(Vec<Predicate<T>>),
}

impl<T> Predicate<T> {
    /// Disjunction; a single alternative collapses to itself
    pub fn any(mut alternatives: Vec<Predicate<T>>) -> Self {
        if alternatives.len() == 1 {
            return alternatives.remove(0);
        }
        Self::Or(alternatives)
    }

    /// Conjunction; a single clause collapses to itself
    pub fn all(mut clauses: Vec<Predicate<T>>) -> Self {
        if clauses.len() == 1 {
            return clauses.remove(0);
        }
        Self::And(clauses)
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluate against one record.
    ///
    /// Comparison operators read nullable value types as their wrapped type,
    /// so an absent number, bool or date is a [`FilterError::NullValue`]
    /// fault rather than a non-match. An absent string matches no
    /// comparison, so `NotIn` over it holds. `NotNull` only checks presence.
    pub fn evaluate(&self, record: &T) -> Result<bool, FilterError> {
        match self {
            Self::Eq { field, value } => {
                Ok(field.value_of(record)?.is_some_and(|actual| actual == *value))
            }
            Self::In { field, values } => Ok(field
                .value_of(record)?
                .is_some_and(|actual| values.contains(&actual))),
            Self::Not(inner) => Ok(!inner.evaluate(record)?),
            Self::Range {
                field,
                lower,
                upper,
            } => Ok(field
                .value_of(record)?
                .is_some_and(|actual| *lower <= actual && actual < *upper)),
            Self::Contains { field, needle } => match field.value_of(record)? {
                Some(Value::Text(text)) => Ok(text.to_uppercase().contains(needle.as_str())),
                Some(other) => Err(FilterError::Logic(format!(
                    "Contains applied to {} field '{}'",
                    other.value_type(),
                    field.name()
                ))),
                None => Ok(false),
            },
            Self::NotNull { field } => Ok(field.read(record).is_some()),
            Self::And(clauses) => {
                for clause in clauses {
                    if !clause.evaluate(record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Or(alternatives) => {
                for alternative in alternatives {
                    if alternative.evaluate(record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Eq { field, value } => Self::Eq {
                field: Arc::clone(field),
                value: value.clone(),
            },
            Self::In { field, values } => Self::In {
                field: Arc::clone(field),
                values: values.clone(),
            },
            Self::Not(inner) => Self::Not(inner.clone()),
            Self::Range {
                field,
                lower,
                upper,
            } => Self::Range {
                field: Arc::clone(field),
                lower: lower.clone(),
                upper: upper.clone(),
            },
            Self::Contains { field, needle } => Self::Contains {
                field: Arc::clone(field),
                needle: needle.clone(),
            },
            Self::NotNull { field } => Self::NotNull {
                field: Arc::clone(field),
            },
            Self::And(clauses) => Self::And(clauses.clone()),
            Self::Or(alternatives) => Self::Or(alternatives.clone()),
        }
    }
}

impl<T> fmt::Display for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T>(f: &mut fmt::Formatter<'_>, items: &[Predicate<T>], sep: &str) -> fmt::Result {
            f.write_str("(")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                write!(f, "{}", item)?;
            }
            f.write_str(")")
        }

        match self {
            Self::Eq { field, value } => write!(f, "{} = {}", field.name(), value),
            Self::In { field, values } => {
                let list: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{} IN ({})", field.name(), list.join(", "))
            }
            Self::Not(inner) => write!(f, "NOT ({})", inner),
            Self::Range {
                field,
                lower,
                upper,
            } => write!(f, "{} <= {} < {}", lower, field.name(), upper),
            Self::Contains { field, needle } => {
                write!(f, "{} CONTAINS {:?}", field.name(), needle)
            }
            Self::NotNull { field } => write!(f, "{} IS NOT NULL", field.name()),
            Self::And(clauses) => join(f, clauses, " AND "),
            Self::Or(alternatives) => join(f, alternatives, " OR "),
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({})", self)
    }
}

fn membership<T>(
    field: &Arc<FieldDescriptor<T>>,
    values: &[Value],
) -> Result<Predicate<T>, FilterError> {
    match values {
        [] => Err(FilterError::EmptyValues {
            field: field.name().to_string(),
        }),
        [value] => Ok(Predicate::Eq {
            field: Arc::clone(field),
            value: value.clone(),
        }),
        _ => Ok(Predicate::In {
            field: Arc::clone(field),
            values: values.to_vec(),
        }),
    }
}

fn check_value_types<T>(field: &FieldDescriptor<T>, values: &[Value]) -> Result<(), FilterError> {
    match values
        .iter()
        .find(|value| value.value_type() != field.value_type())
    {
        Some(value) => Err(FilterError::TypeMismatch {
            field: field.name().to_string(),
            expected: field.value_type(),
            actual: value.value_type(),
        }),
        None => Ok(()),
    }
}

/// Compile one operator against one field
pub fn compile_operator<T>(
    field: &Arc<FieldDescriptor<T>>,
    operator: FilterOperator,
    values: &[Value],
) -> Result<Predicate<T>, FilterError> {
    if operator == FilterOperator::NotNull {
        return Ok(Predicate::NotNull {
            field: Arc::clone(field),
        });
    }

    check_value_types(field, values)?;

    match operator {
        FilterOperator::In => membership(field, values),
        FilterOperator::NotIn => membership(field, values).map(Predicate::negate),
        FilterOperator::Range => match values {
            [lower, upper] => Ok(Predicate::Range {
                field: Arc::clone(field),
                lower: lower.clone(),
                upper: upper.clone(),
            }),
            _ => Err(FilterError::arity(operator, 2, values.len())),
        },
        FilterOperator::Contains => {
            if field.value_type() != ValueType::String {
                return Err(FilterError::Logic(format!(
                    "Contains requires a string field, '{}' is {}",
                    field.name(),
                    field.value_type()
                )));
            }
            match values {
                [Value::Text(needle)] => Ok(Predicate::Contains {
                    field: Arc::clone(field),
                    needle: needle.to_uppercase(),
                }),
                _ => Err(FilterError::arity(operator, 1, values.len())),
            }
        }
        FilterOperator::NotNull => Ok(Predicate::NotNull {
            field: Arc::clone(field),
        }),
    }
}

fn compile_named<T>(
    schema: &EntitySchema<T>,
    item: &FilterOperatorItem,
) -> Result<Predicate<T>, FilterError> {
    let key_name = item.key_name.as_deref().ok_or_else(|| {
        FilterError::invalid_request(
            "MISSING_FILTER_KEY",
            format!("{} filter requires a keyName", item.operator),
        )
    })?;
    let field = schema.field(key_name)?;
    if item.key_type != field.value_type() {
        return Err(FilterError::TypeMismatch {
            field: key_name.to_string(),
            expected: field.value_type(),
            actual: item.key_type,
        });
    }
    compile_operator(field, item.operator, &item.values)
}

/// Compile a filter group into its top-level clauses.
///
/// Clause order: each `and` item, each `and_op` item, one OR clause over
/// every wildcard `or` item fanned out across fields of its `key_type`, then
/// one OR clause over the named `or` items. Every clause must hold. Steps
/// with nothing to contribute add no clause.
pub fn compile_group<T>(
    schema: &EntitySchema<T>,
    group: &FilterGroup,
) -> Result<Vec<Predicate<T>>, FilterError> {
    group.validate()?;

    let mut clauses = Vec::with_capacity(group.and.len() + group.and_op.len() + 2);

    for item in &group.and {
        let field = schema.field(&item.key_name)?;
        let values = coerce_values(field, &item.values)?;
        clauses.push(compile_operator(field, FilterOperator::In, &values)?);
    }

    for item in &group.and_op {
        clauses.push(compile_named(schema, item)?);
    }

    let mut wildcard = Vec::new();
    for item in group.or.iter().filter(|item| item.is_wildcard()) {
        for field in schema.fields_of_type(item.key_type) {
            wildcard.push(compile_operator(field, item.operator, &item.values)?);
        }
    }
    if !wildcard.is_empty() {
        clauses.push(Predicate::any(wildcard));
    }

    let named = group
        .or
        .iter()
        .filter(|item| !item.is_wildcard())
        .map(|item| compile_named(schema, item))
        .collect::<Result<Vec<_>, _>>()?;
    if !named.is_empty() {
        clauses.push(Predicate::any(named));
    }

    tracing::trace!(
        entity = schema.entity(),
        items = group.item_count(),
        clauses = clauses.len(),
        "Filter group compiled"
    );

    Ok(clauses)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{Pupil, class_roll, date, names};
    use super::super::types::FilterItem;
    use super::*;

    fn schema() -> EntitySchema<Pupil> {
        EntitySchema::build()
    }

    fn select<'a>(clauses: &[Predicate<Pupil>], pupils: &'a [Pupil]) -> Vec<&'a str> {
        names(pupils.iter().filter(|p| {
            clauses
                .iter()
                .all(|clause| clause.evaluate(p).expect("evaluate"))
        }))
    }

    fn op(
        schema: &EntitySchema<Pupil>,
        field: &str,
        operator: FilterOperator,
        values: Vec<Value>,
    ) -> Result<Predicate<Pupil>, FilterError> {
        compile_operator(schema.field(field).unwrap(), operator, &values)
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_in_single_value_is_equality() {
        let schema = schema();
        let pupils = class_roll();
        let pred = op(&schema, "grade", FilterOperator::In, vec![Value::Int(10)]).unwrap();

        assert!(matches!(pred, Predicate::Eq { .. }));
        assert_eq!(select(&[pred.clone()], &pupils), vec!["Anna", "Cara"]);

        let double_negated = pred.clone().negate().negate();
        assert_eq!(
            select(&[double_negated], &pupils),
            select(&[pred], &pupils)
        );
    }

    #[test]
    fn test_in_and_not_in_partition() {
        let schema = schema();
        let pupils = class_roll();
        let values = vec![text("Oslo"), text("Bergen")];

        let inside = op(&schema, "city", FilterOperator::In, values.clone()).unwrap();
        let outside = op(&schema, "city", FilterOperator::NotIn, values).unwrap();

        assert!(matches!(inside, Predicate::In { .. }));
        assert_eq!(select(&[inside], &pupils), vec!["Anna", "Ben"]);
        assert_eq!(select(&[outside], &pupils), vec!["Cara"]);
    }

    #[test]
    fn test_range_is_half_open() {
        let schema = schema();
        let pupils = class_roll();
        let pred = op(
            &schema,
            "grade",
            FilterOperator::Range,
            vec![Value::Int(10), Value::Int(11)],
        )
        .unwrap();

        assert_eq!(select(&[pred], &pupils), vec!["Anna", "Cara"]);
    }

    #[test]
    fn test_range_on_dates() {
        let schema = schema();
        let pupils = vec![
            Pupil::new(10, "Anna", "Oslo").born(date(2010, 3, 1)),
            Pupil::new(10, "Ben", "Oslo").born(date(2011, 3, 1)),
        ];
        let pred = op(
            &schema,
            "born",
            FilterOperator::Range,
            vec![
                Value::Date(date(2010, 1, 1)),
                Value::Date(date(2011, 1, 1)),
            ],
        )
        .unwrap();

        assert_eq!(select(&[pred], &pupils), vec!["Anna"]);
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let schema = schema();
        let pupils = vec![Pupil::new(10, "ABC", "Oslo"), Pupil::new(10, "xyz", "Oslo")];
        let pred = op(&schema, "name", FilterOperator::Contains, vec![text("bc")]).unwrap();

        assert_eq!(select(&[pred], &pupils), vec!["ABC"]);
    }

    #[test]
    fn test_arity_violations() {
        let schema = schema();

        for values in [vec![Value::Int(1)], vec![Value::Int(1), Value::Int(2), Value::Int(3)]] {
            let err = op(&schema, "grade", FilterOperator::Range, values).unwrap_err();
            assert!(matches!(err, FilterError::Arity { expected: 2, .. }));
        }

        for values in [vec![], vec![text("a"), text("b")]] {
            let err = op(&schema, "name", FilterOperator::Contains, values).unwrap_err();
            assert!(matches!(err, FilterError::Arity { expected: 1, .. }));
        }
    }

    #[test]
    fn test_value_type_mismatch() {
        let schema = schema();
        let err = op(&schema, "grade", FilterOperator::In, vec![Value::Long(10)]).unwrap_err();
        assert!(matches!(err, FilterError::TypeMismatch { .. }));
    }

    #[test]
    fn test_contains_on_number_is_logic_error() {
        let schema = schema();
        let err = op(&schema, "grade", FilterOperator::Contains, vec![Value::Int(1)]).unwrap_err();
        assert!(matches!(err, FilterError::Logic(_)));
    }

    #[test]
    fn test_null_faults_but_not_null_does_not() {
        let schema = schema();
        let pupil = Pupil::new(10, "Anna", "Oslo");

        let eq = op(&schema, "score", FilterOperator::In, vec![Value::Double(1.0)]).unwrap();
        assert!(matches!(
            eq.evaluate(&pupil),
            Err(FilterError::NullValue { .. })
        ));

        let present = op(&schema, "score", FilterOperator::NotNull, vec![]).unwrap();
        assert!(!present.evaluate(&pupil).unwrap());
        assert!(present.evaluate(&pupil.with_score(2.0)).unwrap());
    }

    fn nicknamed_roll() -> Vec<Pupil> {
        vec![
            Pupil::new(10, "Anna", "Oslo").nickname("Ace"),
            Pupil::new(10, "Ben", "Bergen"),
            Pupil::new(11, "Dan", "Oslo"),
        ]
    }

    #[test]
    fn test_absent_string_does_not_match() {
        let schema = schema();
        let pupils = nicknamed_roll();

        let named = op(&schema, "nickname", FilterOperator::In, vec![text("Ace")]).unwrap();
        assert_eq!(select(&[named], &pupils), vec!["Anna"]);

        let excluded = op(&schema, "nickname", FilterOperator::NotIn, vec![text("Ace")]).unwrap();
        assert_eq!(select(&[excluded], &pupils), vec!["Ben", "Dan"]);

        let contains = op(&schema, "nickname", FilterOperator::Contains, vec![text("c")]).unwrap();
        assert_eq!(select(&[contains], &pupils), vec!["Anna"]);
    }

    #[test]
    fn test_wildcard_skips_absent_strings() {
        let schema = schema();
        let pupils = nicknamed_roll();
        let search = |needle: &str| FilterGroup {
            or: vec![FilterOperatorItem::wildcard(
                FilterOperator::Contains,
                ValueType::String,
                vec![text(needle)],
            )],
            ..Default::default()
        };

        let clauses = compile_group(&schema, &search("an")).unwrap();
        assert_eq!(select(&clauses, &pupils), vec!["Anna", "Dan"]);

        let clauses = compile_group(&schema, &search("ace")).unwrap();
        assert_eq!(select(&clauses, &pupils), vec!["Anna"]);
    }

    #[test]
    fn test_and_item_on_optional_string() {
        let schema = schema();
        let pupils = nicknamed_roll();
        let group = FilterGroup::from_items(vec![FilterItem::new("nickname", ["Ace"])]);

        let clauses = compile_group(&schema, &group).unwrap();
        assert_eq!(select(&clauses, &pupils), vec!["Anna"]);
    }

    #[test]
    fn test_and_items_intersect() {
        let schema = schema();
        let pupils = vec![
            Pupil::new(10, "Anna", "Oslo"),
            Pupil::new(10, "Ben", "Bergen"),
            Pupil::new(11, "Cara", "Oslo"),
        ];
        let group = FilterGroup::from_items(vec![
            FilterItem::new("grade", ["10"]),
            FilterItem::new("city", ["Oslo"]),
        ]);

        let clauses = compile_group(&schema, &group).unwrap();
        assert_eq!(clauses.len(), 2);
        assert_eq!(select(&clauses, &pupils), vec!["Anna"]);
    }

    #[test]
    fn test_and_item_multiple_values() {
        let schema = schema();
        let pupils = class_roll();
        let group = FilterGroup::from_items(vec![FilterItem::new("grade", ["10", "11"])]);

        let clauses = compile_group(&schema, &group).unwrap();
        assert_eq!(select(&clauses, &pupils), vec!["Anna", "Ben", "Cara"]);
    }

    #[test]
    fn test_wildcard_unions_string_fields() {
        let schema = schema();
        let pupils = vec![
            Pupil::new(10, "Fooley", "Oslo"),
            Pupil::new(10, "Ben", "Bigfoot"),
            Pupil::new(10, "Cara", "Bergen"),
        ];
        let group = FilterGroup {
            or: vec![FilterOperatorItem::wildcard(
                FilterOperator::Contains,
                ValueType::String,
                vec![text("foo")],
            )],
            ..Default::default()
        };

        let clauses = compile_group(&schema, &group).unwrap();
        assert_eq!(clauses.len(), 1);
        assert!(matches!(clauses[0], Predicate::Or(ref alts) if alts.len() == 3));
        assert_eq!(select(&clauses, &pupils), vec!["Fooley", "Ben"]);
    }

    #[test]
    fn test_wildcard_and_named_or_groups_intersect() {
        let schema = schema();
        let pupils = vec![
            Pupil::new(10, "Fooley", "Oslo"),
            Pupil::new(11, "Ben", "Bigfoot"),
            Pupil::new(11, "Cara", "Bergen"),
        ];
        let group = FilterGroup {
            or: vec![
                FilterOperatorItem::wildcard(
                    FilterOperator::Contains,
                    ValueType::String,
                    vec![text("foo")],
                ),
                FilterOperatorItem::new(
                    "grade",
                    FilterOperator::In,
                    ValueType::Int,
                    vec![Value::Int(11)],
                ),
            ],
            ..Default::default()
        };

        let clauses = compile_group(&schema, &group).unwrap();
        assert_eq!(clauses.len(), 2);
        // Only Ben satisfies both OR groups; a merged OR would return all three.
        assert_eq!(select(&clauses, &pupils), vec!["Ben"]);
    }

    #[test]
    fn test_wildcard_without_matching_fields_adds_nothing() {
        let schema = schema();
        let group = FilterGroup {
            or: vec![FilterOperatorItem::wildcard(
                FilterOperator::In,
                ValueType::Timestamp,
                vec![Value::Timestamp(chrono::Utc::now())],
            )],
            ..Default::default()
        };

        let clauses = compile_group(&schema, &group).unwrap();
        assert!(clauses.is_empty());
    }

    #[test]
    fn test_scenario_grade_filters() {
        let schema = schema();
        let pupils = class_roll();

        let by_item = FilterGroup::from_items(vec![FilterItem::new("grade", ["10"])]);
        let clauses = compile_group(&schema, &by_item).unwrap();
        assert_eq!(select(&clauses, &pupils), vec!["Anna", "Cara"]);

        let by_range = FilterGroup {
            and_op: vec![FilterOperatorItem::new(
                "grade",
                FilterOperator::Range,
                ValueType::Int,
                vec![Value::Int(10), Value::Int(11)],
            )],
            ..Default::default()
        };
        let clauses = compile_group(&schema, &by_range).unwrap();
        assert_eq!(select(&clauses, &pupils), vec!["Anna", "Cara"]);
    }

    #[test]
    fn test_unknown_field_fails_fast() {
        let schema = schema();
        let group = FilterGroup::from_items(vec![FilterItem::new("Grade", ["10"])]);
        assert!(matches!(
            compile_group(&schema, &group),
            Err(FilterError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn test_unparsable_raw_value_fails() {
        let schema = schema();
        let group = FilterGroup::from_items(vec![FilterItem::new("grade", ["tenth"])]);
        assert!(matches!(
            compile_group(&schema, &group),
            Err(FilterError::Parse { .. })
        ));
    }

    #[test]
    fn test_display() {
        let schema = schema();
        let pred = Predicate::all(vec![
            op(&schema, "grade", FilterOperator::NotIn, vec![Value::Int(9), Value::Int(12)]).unwrap(),
            op(&schema, "name", FilterOperator::Contains, vec![text("an")]).unwrap(),
        ]);
        assert_eq!(
            pred.to_string(),
            r#"(NOT (grade IN (9, 12)) AND name CONTAINS "AN")"#
        );
    }
}
