//! SQLite error types

use std::fmt;

use thiserror::Error;

/// Table constraint a write violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Duplicate email, or a class name reused within a year
    Unique,
    /// Class or teacher reference to a missing row
    ForeignKey,
    /// Grade or GPA outside its allowed range
    Check,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unique => "already exists",
            Self::ForeignKey => "references a missing record",
            Self::Check => "has an out-of-range value",
        })
    }
}

#[derive(Error, Debug)]
pub enum SqliteError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    #[error("{record} {constraint}")]
    Conflict {
        record: String,
        constraint: Constraint,
    },
}

impl SqliteError {
    /// Classify a failed insert of `record`.
    ///
    /// Constraint violations become `Conflict`, anything else stays a
    /// database error.
    pub fn from_write(e: sqlx::Error, record: impl Into<String>) -> Self {
        let constraint = e.as_database_error().and_then(|db| {
            if db.is_unique_violation() {
                Some(Constraint::Unique)
            } else if db.is_foreign_key_violation() {
                Some(Constraint::ForeignKey)
            } else if db.is_check_violation() {
                Some(Constraint::Check)
            } else {
                None
            }
        });

        match constraint {
            Some(constraint) => Self::Conflict {
                record: record.into(),
                constraint,
            },
            None => Self::Database(e),
        }
    }

    pub fn constraint(&self) -> Option<Constraint> {
        match self {
            Self::Conflict { constraint, .. } => Some(*constraint),
            _ => None,
        }
    }
}
