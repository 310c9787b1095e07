//! SQLite repositories
//!
//! Types (Student, Teacher, etc.) should be imported from `crate::data::types`.

pub mod class;
pub mod records;
pub mod student;
pub mod teacher;

pub use class::{get_class, insert_class, insert_classes};
pub use records::{list_records, record_filter_options};
pub use student::{get_student, insert_student, insert_students};
pub use teacher::{get_teacher, insert_teacher, insert_teachers};

#[cfg(test)]
pub(crate) async fn setup_test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::SqlitePool::connect(":memory:").await.unwrap();
    super::migrations::run_migrations(&pool).await.unwrap();
    pool
}
