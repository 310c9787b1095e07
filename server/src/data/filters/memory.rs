//! In-memory realization of filter predicates

use std::cmp::Ordering;
use std::sync::Arc;

use super::error::FilterError;
use super::predicate::Predicate;
use super::schema::{Entity, EntitySchema, SchemaCache};

/// Deferred filtered view over a borrowed slice.
///
/// Nothing is evaluated until the view is iterated. Null faults from
/// nullable fields surface per record.
pub struct MemoryQuery<'a, T> {
    records: &'a [T],
    schema: Arc<EntitySchema<T>>,
    clauses: Vec<Predicate<T>>,
}

impl<T> Clone for MemoryQuery<'_, T> {
    fn clone(&self) -> Self {
        Self {
            records: self.records,
            schema: Arc::clone(&self.schema),
            clauses: self.clauses.clone(),
        }
    }
}

impl<'a, T: Entity> MemoryQuery<'a, T> {
    pub fn new(records: &'a [T], cache: &SchemaCache) -> Self {
        Self::with_schema(records, cache.schema::<T>())
    }
}

impl<'a, T> MemoryQuery<'a, T> {
    pub fn with_schema(records: &'a [T], schema: Arc<EntitySchema<T>>) -> Self {
        Self {
            records,
            schema,
            clauses: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Arc<EntitySchema<T>> {
        &self.schema
    }

    /// Add a clause; clauses are ANDed
    pub fn filter(mut self, predicate: Predicate<T>) -> Self {
        self.clauses.push(predicate);
        self
    }

    pub fn matches(&self, record: &T) -> Result<bool, FilterError> {
        for clause in &self.clauses {
            if !clause.evaluate(record)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Matching records in source order
    pub fn iter(&self) -> impl Iterator<Item = Result<&'a T, FilterError>> + '_ {
        self.records
            .iter()
            .filter_map(move |record| match self.matches(record) {
                Ok(true) => Some(Ok(record)),
                Ok(false) => None,
                Err(e) => Some(Err(e)),
            })
    }

    pub fn collect_rows(&self) -> Result<Vec<&'a T>, FilterError> {
        self.iter().collect()
    }

    pub fn count(&self) -> Result<usize, FilterError> {
        self.iter().try_fold(0, |n, record| record.map(|_| n + 1))
    }

    /// Distinct values of `get` across matching records, ascending
    pub fn distinct_by<V, F>(&self, get: F) -> Result<Vec<V>, FilterError>
    where
        V: PartialOrd,
        F: Fn(&T) -> V,
    {
        let mut values = self
            .iter()
            .map(|record| record.map(&get))
            .collect::<Result<Vec<_>, _>>()?;
        sort_dedup(&mut values);
        Ok(values)
    }
}

/// Sort ascending and keep one of each value.
///
/// Values that do not compare to themselves (NaN) sort last and collapse
/// into a single entry.
pub(crate) fn sort_dedup<V: PartialOrd>(values: &mut Vec<V>) {
    values.sort_by(total_order);
    values.dedup_by(|a, b| total_order(a, b) == Ordering::Equal);
}

fn is_unordered<V: PartialOrd>(value: &V) -> bool {
    value.partial_cmp(value).is_none()
}

fn total_order<V: PartialOrd>(a: &V, b: &V) -> Ordering {
    a.partial_cmp(b)
        .unwrap_or_else(|| is_unordered(a).cmp(&is_unordered(b)))
}
