//! Distinct column values for filter-choice lists
//!
//! The typed entry points live on the backends
//! ([`MemoryQuery::distinct_by`], [`SqlQuery::distinct_column`]).
//! [`column_values`] resolves a field by name and dispatches over the closed
//! set of lookup types.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::data::error::DataError;

use super::error::FilterError;
use super::memory::{MemoryQuery, sort_dedup};
use super::schema::{EntitySchema, FieldDescriptor};
use super::sql::SqlQuery;
use super::value::{FieldValue, LookupValue, Value, ValueType};

/// A source that can list the distinct values of one of its fields
#[async_trait]
pub trait ValueLookup<T>: Send + Sync {
    fn lookup_schema(&self) -> &EntitySchema<T>;

    /// Distinct non-null values of `field`, decoded as `V`
    async fn distinct_of<V: LookupValue>(
        &self,
        field: &FieldDescriptor<T>,
    ) -> Result<Vec<V>, DataError>;
}

#[async_trait]
impl<'a, T: Send + Sync> ValueLookup<T> for MemoryQuery<'a, T> {
    fn lookup_schema(&self) -> &EntitySchema<T> {
        self.schema()
    }

    async fn distinct_of<V: LookupValue>(
        &self,
        field: &FieldDescriptor<T>,
    ) -> Result<Vec<V>, DataError> {
        let mut values = Vec::new();
        for record in self.iter() {
            let Some(value) = field.read(record?) else {
                continue;
            };
            let actual = value.value_type();
            let value = V::from_value(value).ok_or_else(|| FilterError::TypeMismatch {
                field: field.name().to_string(),
                expected: V::VALUE_TYPE,
                actual,
            })?;
            values.push(value);
        }
        sort_dedup(&mut values);
        Ok(values)
    }
}

#[async_trait]
impl<T: Send + Sync> ValueLookup<T> for SqlQuery<T> {
    fn lookup_schema(&self) -> &EntitySchema<T> {
        self.schema()
    }

    async fn distinct_of<V: LookupValue>(
        &self,
        field: &FieldDescriptor<T>,
    ) -> Result<Vec<V>, DataError> {
        self.distinct_values(field.column()).await
    }
}

fn to_values<V: FieldValue>(values: Vec<V>) -> Vec<Value> {
    values
        .into_iter()
        .filter_map(FieldValue::into_value)
        .collect()
}

/// Distinct values of the field named `name`, ascending.
///
/// Supports int, long, float, double, bool, date and string fields; any
/// other effective type is [`FilterError::UnknownType`].
pub async fn column_values<T, S>(source: &S, name: &str) -> Result<Vec<Value>, DataError>
where
    S: ValueLookup<T>,
{
    let schema = source.lookup_schema();
    let field = schema.field(name)?;

    let mut values = match field.value_type() {
        ValueType::Int => to_values(source.distinct_of::<i32>(field).await?),
        ValueType::Long => to_values(source.distinct_of::<i64>(field).await?),
        ValueType::Float => to_values(source.distinct_of::<f32>(field).await?),
        ValueType::Double => to_values(source.distinct_of::<f64>(field).await?),
        ValueType::Bool => to_values(source.distinct_of::<bool>(field).await?),
        ValueType::Date => to_values(source.distinct_of::<NaiveDate>(field).await?),
        ValueType::String => to_values(source.distinct_of::<String>(field).await?),
        other => return Err(FilterError::UnknownType(other).into()),
    };
    sort_dedup(&mut values);

    tracing::debug!(
        entity = schema.entity(),
        field = name,
        count = values.len(),
        "Column values resolved"
    );

    Ok(values)
}
