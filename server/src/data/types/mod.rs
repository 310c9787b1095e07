//! Shared data types
//!
//! Filterable school records and the ordering/paging parameters used when
//! listing them.

mod query;
mod school;

pub use query::{ListParams, OrderBy, OrderDirection, Page};
pub use school::{NewClass, NewStudent, NewTeacher, SchoolClass, Student, Teacher};
