//! Applying filter groups to query sources

use super::error::FilterError;
use super::memory::MemoryQuery;
use super::predicate::{Predicate, compile_group};
use super::schema::EntitySchema;
use super::sql::SqlQuery;
use super::types::{FilterGroup, FilterItem};

/// A deferred sequence of `T` that accepts filter clauses.
///
/// Implementations must not evaluate anything when a clause is added.
pub trait FilterSource<T>: Sized {
    fn entity_schema(&self) -> &EntitySchema<T>;

    /// Narrow the sequence; successive calls are ANDed
    fn filter(self, predicate: Predicate<T>) -> Self;
}

impl<T> FilterSource<T> for MemoryQuery<'_, T> {
    fn entity_schema(&self) -> &EntitySchema<T> {
        MemoryQuery::schema(self)
    }

    fn filter(self, predicate: Predicate<T>) -> Self {
        MemoryQuery::filter(self, predicate)
    }
}

impl<T> FilterSource<T> for SqlQuery<T> {
    fn entity_schema(&self) -> &EntitySchema<T> {
        SqlQuery::schema(self)
    }

    fn filter(self, predicate: Predicate<T>) -> Self {
        SqlQuery::filter(self, predicate)
    }
}

/// Compile `group` against the source's schema and chain every clause.
///
/// Compilation happens up front, so a bad group leaves nothing applied.
pub fn apply_filter_group<T, S>(source: S, group: &FilterGroup) -> Result<S, FilterError>
where
    S: FilterSource<T>,
{
    let clauses = compile_group(source.entity_schema(), group)?;
    Ok(clauses
        .into_iter()
        .fold(source, |source, clause| FilterSource::filter(source, clause)))
}

/// Shorthand for a group with only `and` items
pub fn apply_filter_items<T, S>(source: S, items: &[FilterItem]) -> Result<S, FilterError>
where
    S: FilterSource<T>,
{
    apply_filter_group(source, &FilterGroup::from_items(items.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{Pupil, class_roll, names, pupil_pool};
    use super::super::schema::SchemaCache;
    use super::super::types::{FilterOperator, FilterOperatorItem};
    use super::super::value::{Value, ValueType};
    use super::*;
    use crate::data::types::OrderDirection;

    fn mixed_group() -> FilterGroup {
        FilterGroup {
            and: vec![FilterItem::new("active", ["true"])],
            and_op: vec![FilterOperatorItem::new(
                "grade",
                FilterOperator::Range,
                ValueType::Int,
                vec![Value::Int(10), Value::Int(12)],
            )],
            or: vec![
                FilterOperatorItem::wildcard(
                    FilterOperator::Contains,
                    ValueType::String,
                    vec![Value::Text("o".into())],
                ),
                FilterOperatorItem::new(
                    "city",
                    FilterOperator::NotIn,
                    ValueType::String,
                    vec![Value::Text("Oslo".into())],
                ),
            ],
        }
    }

    fn mixed_roll() -> Vec<Pupil> {
        vec![
            Pupil::new(10, "Anna", "Oslo"),
            Pupil::new(11, "Bo", "Bergen"),
            Pupil::new(11, "Cara", "Trondheim").inactive(),
            Pupil::new(12, "Dora", "Bodo"),
            Pupil::new(10, "Eli", "Stavanger"),
        ]
    }

    #[test]
    fn test_apply_items_to_memory() {
        let pupils = class_roll();
        let cache = SchemaCache::new();
        let query = MemoryQuery::new(&pupils, &cache);

        let filtered = apply_filter_items(query, &[FilterItem::new("grade", ["10"])]).unwrap();
        assert_eq!(names(filtered.collect_rows().unwrap()), vec!["Anna", "Cara"]);
    }

    #[test]
    fn test_bad_group_fails_before_applying() {
        let pupils = class_roll();
        let cache = SchemaCache::new();
        let query = MemoryQuery::new(&pupils, &cache);

        let result = apply_filter_items(query, &[FilterItem::new("missing", ["1"])]);
        assert!(matches!(result, Err(FilterError::FieldNotFound { .. })));
    }

    #[tokio::test]
    async fn test_backends_agree() {
        let pupils = mixed_roll();
        let cache = SchemaCache::new();
        let group = mixed_group();

        let memory = apply_filter_group(MemoryQuery::new(&pupils, &cache), &group).unwrap();
        let from_memory: Vec<String> = names(memory.collect_rows().unwrap())
            .into_iter()
            .map(String::from)
            .collect();

        let pool = pupil_pool(&pupils).await;
        let sql = apply_filter_group(SqlQuery::<Pupil>::new(pool, &cache), &group)
            .unwrap()
            .order_by("id", OrderDirection::Asc)
            .unwrap();
        let rows = sql.fetch_all().await.unwrap();
        let from_sql: Vec<String> = names(&rows).into_iter().map(String::from).collect();

        // Anna fails the named OR, Cara is inactive, Dora is out of range,
        // and Eli fails the wildcard OR.
        assert_eq!(from_memory, vec!["Bo"]);
        assert_eq!(from_sql, from_memory);
    }
}
