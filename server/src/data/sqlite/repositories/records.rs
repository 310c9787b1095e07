//! Filtered listings over any registered entity table
//!
//! Both operations compile the caller's filter group against the entity's
//! schema and push it down to SQLite.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};

use crate::data::error::DataError;
use crate::data::filters::{
    Entity, FilterGroup, SchemaCache, SqlQuery, Value, apply_filter_group, column_values,
};
use crate::data::types::{ListParams, Page};

/// One page of rows matching `group`, plus the total match count
pub async fn list_records<T>(
    pool: &SqlitePool,
    cache: &SchemaCache,
    group: &FilterGroup,
    params: &ListParams,
) -> Result<Page<T>, DataError>
where
    T: Entity + for<'r> FromRow<'r, SqliteRow> + Unpin,
{
    let mut query = apply_filter_group(SqlQuery::<T>::new(pool.clone(), cache), group)?;
    let total_items = query.count().await?;

    if let Some(order) = &params.order_by {
        query = query.order_by(&order.field, order.direction)?;
    }
    if let Some(limit) = params.limit {
        query = query.limit(limit);
    }
    if let Some(offset) = params.offset {
        query = query.offset(offset);
    }

    let data = query.fetch_all().await?;
    tracing::debug!(
        entity = T::NAME,
        returned = data.len(),
        total_items,
        "Listed records"
    );

    Ok(Page { data, total_items })
}

/// Distinct values of `field` among rows matching `group`, ascending
pub async fn record_filter_options<T: Entity>(
    pool: &SqlitePool,
    cache: &SchemaCache,
    group: &FilterGroup,
    field: &str,
) -> Result<Vec<Value>, DataError> {
    let query = apply_filter_group(SqlQuery::<T>::new(pool.clone(), cache), group)?;
    column_values(&query, field).await
}
