//! Dynamic filter engine
//!
//! Builds type-checked predicates at runtime from caller-supplied filter
//! requests and applies them to any entity that describes its fields once.
//! The same compiled predicate runs in memory or is pushed down to SQLite.
//!
//! ## Usage
//!
//! ```no_run
//! use classroll_server::data::filters::{
//!     FilterLimits, MemoryQuery, SchemaCache, apply_filter_group, parse_filter_group,
//! };
//! use classroll_server::data::types::Student;
//!
//! # fn run(students: Vec<Student>) -> Result<(), Box<dyn std::error::Error>> {
//! let cache = SchemaCache::new();
//! let group = parse_filter_group(
//!     r#"{"and": [{"keyName": "grade", "values": ["10"]}]}"#,
//!     &FilterLimits::default(),
//! )?;
//! let query = apply_filter_group(MemoryQuery::new(&students, &cache), &group)?;
//! for student in query.collect_rows()? {
//!     println!("{}", student.last_name);
//! }
//! # Ok(())
//! # }
//! ```

mod applier;
mod coerce;
mod error;
mod lookup;
mod memory;
mod parser;
mod predicate;
mod schema;
mod sql;
mod types;
mod value;

#[cfg(test)]
mod fixtures;

pub use applier::{FilterSource, apply_filter_group, apply_filter_items};
pub use coerce::{RAW_DATE_FORMAT, coerce_raw, coerce_values};
pub use error::FilterError;
pub use lookup::{ValueLookup, column_values};
pub use memory::MemoryQuery;
pub use parser::{FilterLimits, parse_filter_group};
pub use predicate::{Predicate, compile_group, compile_operator};
pub use schema::{Column, Entity, EntitySchema, FieldDescriptor, SchemaBuilder, SchemaCache};
pub use sql::{SqlParams, SqlQuery};
pub use types::{FilterGroup, FilterItem, FilterOperator, FilterOperatorItem};
pub use value::{FieldValue, LookupValue, ScalarValue, Value, ValueType};
