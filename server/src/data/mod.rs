//! Data storage layer
//!
//! - `filters` - Dynamic filter engine (schema registry, predicates, backends)
//! - `sqlite` - Embedded database for school records
//! - `types` - Entity records and listing parameters
//! - `error` - Unified error type for the data layer

pub mod error;
pub mod filters;
pub mod sqlite;
pub mod types;

pub use error::DataError;
pub use sqlite::SqliteService;
