//! Classroll: dynamic filtering over school records
//!
//! - `core` - CLI, configuration, constants, storage paths
//! - `data` - Filter engine, SQLite backend, entity types
//! - `utils` - Small shared helpers

mod app;
pub mod core;
pub mod data;
pub mod utils;
