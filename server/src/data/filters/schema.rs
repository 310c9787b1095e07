//! Entity schema registry
//!
//! Each filterable record type implements [`Entity`] and declares its fields
//! once as typed [`Column`] handles. The resulting [`EntitySchema`] maps a
//! wire key name to a value accessor and its effective type. Schemas are
//! built lazily and shared through a [`SchemaCache`] owned by the
//! application.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use super::error::FilterError;
use super::value::{FieldValue, Value, ValueType};

/// Typed handle to one field of `T`
pub struct Column<T, V> {
    /// Key name used in filter requests (case-sensitive)
    pub name: &'static str,
    /// SQL column name
    pub column: &'static str,
    get: fn(&T) -> V,
}

impl<T, V> Column<T, V> {
    pub const fn new(name: &'static str, column: &'static str, get: fn(&T) -> V) -> Self {
        Self { name, column, get }
    }

    pub fn get(&self, record: &T) -> V {
        (self.get)(record)
    }
}

impl<T, V> Clone for Column<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Column<T, V> {}

/// Type-erased field metadata
pub struct FieldDescriptor<T> {
    name: &'static str,
    column: &'static str,
    value_type: ValueType,
    nullable: bool,
    null_faults: bool,
    read: Box<dyn Fn(&T) -> Option<Value> + Send + Sync>,
}

impl<T> FieldDescriptor<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn column(&self) -> &'static str {
        self.column
    }

    /// Effective type (the wrapped type for nullable fields)
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Read the field, `None` when a nullable field is absent
    pub fn read(&self, record: &T) -> Option<Value> {
        (self.read)(record)
    }

    /// Whether comparing an absent value is a fault rather than a non-match
    pub fn faults_on_null(&self) -> bool {
        self.null_faults
    }

    /// Read the field for a comparison.
    ///
    /// An absent nullable value type is a [`FilterError::NullValue`] fault.
    /// An absent string yields `Ok(None)`, which matches nothing.
    pub fn value_of(&self, record: &T) -> Result<Option<Value>, FilterError> {
        match self.read(record) {
            Some(value) => Ok(Some(value)),
            None if self.null_faults => Err(FilterError::NullValue {
                field: self.name.to_string(),
            }),
            None => Ok(None),
        }
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("value_type", &self.value_type)
            .field("nullable", &self.nullable)
            .field("null_faults", &self.null_faults)
            .finish()
    }
}

/// A record type that can be filtered
pub trait Entity: Send + Sync + Sized + 'static {
    /// Name used in error messages and logs
    const NAME: &'static str;
    /// Backing SQL table
    const TABLE: &'static str;

    fn describe(schema: &mut SchemaBuilder<Self>);
}

/// Collects field descriptors for an entity
pub struct SchemaBuilder<T> {
    fields: Vec<FieldDescriptor<T>>,
}

impl<T: 'static> SchemaBuilder<T> {
    fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn column<V: FieldValue>(&mut self, column: Column<T, V>) -> &mut Self {
        let get = column.get;
        self.fields.push(FieldDescriptor {
            name: column.name,
            column: column.column,
            value_type: V::VALUE_TYPE,
            nullable: V::NULLABLE,
            null_faults: V::NULL_FAULTS,
            read: Box::new(move |record: &T| get(record).into_value()),
        });
        self
    }
}

/// Field metadata for one entity type
pub struct EntitySchema<T> {
    entity: &'static str,
    table: &'static str,
    fields: Vec<Arc<FieldDescriptor<T>>>,
    by_name: HashMap<&'static str, usize>,
}

impl<T: Entity> EntitySchema<T> {
    pub fn build() -> Self {
        let mut builder = SchemaBuilder::new();
        T::describe(&mut builder);

        let mut fields = Vec::with_capacity(builder.fields.len());
        let mut by_name = HashMap::with_capacity(builder.fields.len());
        for field in builder.fields {
            if by_name.insert(field.name, fields.len()).is_some() {
                tracing::warn!(entity = T::NAME, field = field.name, "Duplicate field name");
            }
            fields.push(Arc::new(field));
        }

        Self {
            entity: T::NAME,
            table: T::TABLE,
            fields,
            by_name,
        }
    }
}

impl<T> EntitySchema<T> {
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn fields(&self) -> &[Arc<FieldDescriptor<T>>] {
        &self.fields
    }

    /// Look up a field by key name; unknown names fail fast
    pub fn field(&self, name: &str) -> Result<&Arc<FieldDescriptor<T>>, FilterError> {
        self.by_name
            .get(name)
            .map(|&index| &self.fields[index])
            .ok_or_else(|| FilterError::field_not_found(self.entity, name))
    }

    /// Fields whose effective type equals `value_type`, in declaration order
    pub fn fields_of_type(
        &self,
        value_type: ValueType,
    ) -> impl Iterator<Item = &Arc<FieldDescriptor<T>>> {
        self.fields
            .iter()
            .filter(move |field| field.value_type == value_type)
    }
}

/// Lazily populated schema registry keyed by entity type.
///
/// Entries are never invalidated. Concurrent first use builds under the
/// map's shard lock, so only one schema per type is stored.
#[derive(Default)]
pub struct SchemaCache {
    schemas: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema<T: Entity>(&self) -> Arc<EntitySchema<T>> {
        let entry = Arc::clone(
            &*self
                .schemas
                .entry(TypeId::of::<T>())
                .or_insert_with(|| {
                    let schema = EntitySchema::<T>::build();
                    tracing::debug!(
                        entity = T::NAME,
                        fields = schema.fields.len(),
                        "Entity schema built"
                    );
                    let schema: Arc<dyn Any + Send + Sync> = Arc::new(schema);
                    schema
                }),
        );

        // Keys are TypeIds, so the downcast matches; rebuilding is harmless.
        entry
            .downcast::<EntitySchema<T>>()
            .unwrap_or_else(|_| Arc::new(EntitySchema::build()))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCache")
            .field("entities", &self.schemas.len())
            .finish()
    }
}
