//! SQLite realization of filter predicates
//!
//! Predicates render to WHERE fragments with `?` placeholders; the values
//! are collected into [`SqlParams`] in placeholder order. [`SqlQuery`]
//! accumulates fragments and only touches the database when realized.

use std::sync::Arc;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Sqlite, SqlitePool};

use crate::data::error::DataError;
use crate::data::types::OrderDirection;
use crate::utils::sql::contains_pattern;

use super::error::FilterError;
use super::predicate::Predicate;
use super::schema::{Column, Entity, EntitySchema, SchemaCache};
use super::value::{LookupValue, Value};

/// Positional parameters for a rendered SQL fragment
#[derive(Debug, Clone, Default)]
pub struct SqlParams {
    pub values: Vec<Value>,
}

impl SqlParams {
    fn push(&mut self, value: Value) -> &'static str {
        self.values.push(value);
        "?"
    }
}

/// Bind every parameter onto a sqlx query, in order
macro_rules! bind_values {
    ($query:expr, $values:expr) => {{
        let mut query = $query;
        for value in $values {
            query = match value {
                Value::Int(v) => query.bind(*v),
                Value::Long(v) => query.bind(*v),
                Value::Float(v) => query.bind(*v),
                Value::Double(v) => query.bind(*v),
                Value::Bool(v) => query.bind(*v),
                Value::Date(v) => query.bind(*v),
                Value::Text(v) => query.bind(v.clone()),
                Value::Timestamp(v) => query.bind(*v),
            };
        }
        query
    }};
}

impl<T> Predicate<T> {
    /// Render as a SQL boolean expression.
    ///
    /// A NULL column fails comparisons instead of faulting. A negated
    /// comparison over a nullable string column holds for NULL, matching the
    /// in-memory result.
    pub fn to_sql(&self, params: &mut SqlParams) -> String {
        match self {
            Self::Eq { field, value } => {
                format!("{} = {}", field.column(), params.push(value.clone()))
            }
            Self::In { field, values } => {
                if values.is_empty() {
                    return "1=0".to_string();
                }
                let placeholders: Vec<&str> =
                    values.iter().map(|v| params.push(v.clone())).collect();
                format!("{} IN ({})", field.column(), placeholders.join(", "))
            }
            Self::Not(inner) => match inner.absent_string_column() {
                Some(column) => format!("({} IS NULL OR NOT ({}))", column, inner.to_sql(params)),
                None => format!("NOT ({})", inner.to_sql(params)),
            },
            Self::Range {
                field,
                lower,
                upper,
            } => {
                let column = field.column();
                format!(
                    "({} >= {} AND {} < {})",
                    column,
                    params.push(lower.clone()),
                    column,
                    params.push(upper.clone())
                )
            }
            Self::Contains { field, needle } => {
                let pattern = contains_pattern(needle);
                format!(
                    "UPPER({}) LIKE {} ESCAPE '\\'",
                    field.column(),
                    params.push(Value::Text(pattern))
                )
            }
            Self::NotNull { field } => format!("{} IS NOT NULL", field.column()),
            Self::And(clauses) => join_sql(clauses, " AND ", "1=1", params),
            Self::Or(alternatives) => join_sql(alternatives, " OR ", "1=0", params),
        }
    }
}

impl<T> Predicate<T> {
    /// Column of a comparison over a nullable string field
    fn absent_string_column(&self) -> Option<&'static str> {
        match self {
            Self::Eq { field, .. }
            | Self::In { field, .. }
            | Self::Range { field, .. }
            | Self::Contains { field, .. }
                if field.is_nullable() && !field.faults_on_null() =>
            {
                Some(field.column())
            }
            _ => None,
        }
    }
}

fn join_sql<T>(items: &[Predicate<T>], sep: &str, empty: &str, params: &mut SqlParams) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    let parts: Vec<String> = items.iter().map(|item| item.to_sql(params)).collect();
    format!("({})", parts.join(sep))
}

/// Deferred filtered query over an entity's table
pub struct SqlQuery<T> {
    pool: SqlitePool,
    schema: Arc<EntitySchema<T>>,
    conditions: Vec<String>,
    params: SqlParams,
    order: Vec<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl<T> Clone for SqlQuery<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            schema: Arc::clone(&self.schema),
            conditions: self.conditions.clone(),
            params: self.params.clone(),
            order: self.order.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

impl<T: Entity> SqlQuery<T> {
    pub fn new(pool: SqlitePool, cache: &SchemaCache) -> Self {
        Self::with_schema(pool, cache.schema::<T>())
    }
}

impl<T> SqlQuery<T> {
    pub fn with_schema(pool: SqlitePool, schema: Arc<EntitySchema<T>>) -> Self {
        Self {
            pool,
            schema,
            conditions: Vec::new(),
            params: SqlParams::default(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn schema(&self) -> &Arc<EntitySchema<T>> {
        &self.schema
    }

    /// Add a WHERE condition; conditions are ANDed
    pub fn filter(mut self, predicate: Predicate<T>) -> Self {
        let sql = predicate.to_sql(&mut self.params);
        self.conditions.push(sql);
        self
    }

    pub fn order_by(mut self, field: &str, direction: OrderDirection) -> Result<Self, FilterError> {
        let column = self.schema.field(field)?.column();
        self.order.push(format!("{} {}", column, direction.as_sql()));
        Ok(self)
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn params(&self) -> &[Value] {
        &self.params.values
    }

    /// `" WHERE ..."` or an empty string
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    fn is_paged(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }

    fn tail(&self) -> String {
        let mut sql = String::new();
        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order.join(", "));
        }
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset)),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {}", limit)),
            // SQLite requires LIMIT before OFFSET
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
            (None, None) => {}
        }
        sql
    }

    pub fn select_sql(&self) -> String {
        format!(
            "SELECT * FROM {}{}{}",
            self.schema.table(),
            self.where_clause(),
            self.tail()
        )
    }

    fn count_sql(&self) -> String {
        format!(
            "SELECT COUNT(*) FROM {}{}",
            self.schema.table(),
            self.where_clause()
        )
    }

    fn distinct_sql(&self, column: &str) -> String {
        if self.is_paged() {
            format!(
                "SELECT DISTINCT {col} FROM ({}) WHERE {col} IS NOT NULL ORDER BY {col}",
                self.select_sql(),
                col = column
            )
        } else {
            let mut conditions = self.conditions.clone();
            conditions.push(format!("{} IS NOT NULL", column));
            format!(
                "SELECT DISTINCT {col} FROM {} WHERE {} ORDER BY {col}",
                self.schema.table(),
                conditions.join(" AND "),
                col = column
            )
        }
    }

    /// Total rows matching the filters, ignoring limit and offset
    pub async fn count(&self) -> Result<u64, DataError> {
        let sql = self.count_sql();
        tracing::debug!(table = self.schema.table(), %sql, "Counting filtered rows");

        let count = bind_values!(sqlx::query_scalar::<Sqlite, i64>(&sql), &self.params.values)
            .fetch_one(&self.pool)
            .await
            .map_err(DataError::from_sqlite)?;
        Ok(count.max(0) as u64)
    }

    /// Distinct non-null values of a typed column, deduplicated by SQLite
    pub async fn distinct_column<V: LookupValue>(
        &self,
        column: &Column<T, V>,
    ) -> Result<Vec<V>, DataError> {
        self.distinct_values(column.column).await
    }

    pub(crate) async fn distinct_values<V: LookupValue>(
        &self,
        column: &str,
    ) -> Result<Vec<V>, DataError> {
        let sql = self.distinct_sql(column);
        tracing::debug!(table = self.schema.table(), %sql, "Selecting distinct values");

        bind_values!(sqlx::query_scalar::<Sqlite, V>(&sql), &self.params.values)
            .fetch_all(&self.pool)
            .await
            .map_err(DataError::from_sqlite)
    }
}

impl<T> SqlQuery<T>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    pub async fn fetch_all(&self) -> Result<Vec<T>, DataError> {
        let sql = self.select_sql();
        tracing::debug!(
            table = self.schema.table(),
            %sql,
            params = self.params.values.len(),
            "Running filtered query"
        );

        bind_values!(sqlx::query_as::<Sqlite, T>(&sql), &self.params.values)
            .fetch_all(&self.pool)
            .await
            .map_err(DataError::from_sqlite)
    }
}
