//! Teacher repository for SQLite operations

use sqlx::{SqliteConnection, SqlitePool};

use crate::data::sqlite::SqliteError;
use crate::data::types::{NewTeacher, Teacher};

/// Insert a teacher and return the stored row
pub async fn insert_teacher(pool: &SqlitePool, new: &NewTeacher) -> Result<Teacher, SqliteError> {
    let mut conn = pool.acquire().await?;
    insert_with(&mut *conn, new).await
}

/// Insert teachers atomically: either all rows are stored or none
pub async fn insert_teachers(
    pool: &SqlitePool,
    teachers: &[NewTeacher],
) -> Result<Vec<Teacher>, SqliteError> {
    let mut tx = pool.begin().await?;
    let mut rows = Vec::with_capacity(teachers.len());
    for new in teachers {
        rows.push(insert_with(&mut *tx, new).await?);
    }
    tx.commit().await?;

    tracing::debug!(count = rows.len(), "Teachers inserted");
    Ok(rows)
}

async fn insert_with(conn: &mut SqliteConnection, new: &NewTeacher) -> Result<Teacher, SqliteError> {
    let now = chrono::Utc::now();

    let result = sqlx::query(
        "INSERT INTO teachers (first_name, last_name, email, subject, hired_on, active, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(&new.email)
    .bind(&new.subject)
    .bind(new.hired_on)
    .bind(new.active)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| SqliteError::from_write(e, "Teacher"))?;

    Ok(Teacher {
        id: result.last_insert_rowid(),
        first_name: new.first_name.clone(),
        last_name: new.last_name.clone(),
        email: new.email.clone(),
        subject: new.subject.clone(),
        hired_on: new.hired_on,
        active: new.active,
        created_at: now,
    })
}

/// Get a teacher by ID
pub async fn get_teacher(pool: &SqlitePool, id: i64) -> Result<Option<Teacher>, SqliteError> {
    let row = sqlx::query_as::<_, Teacher>(
        "SELECT id, first_name, last_name, email, subject, hired_on, active, created_at FROM teachers WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
