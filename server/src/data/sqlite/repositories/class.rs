//! Class repository for SQLite operations

use sqlx::{SqliteConnection, SqlitePool};

use crate::data::sqlite::SqliteError;
use crate::data::types::{NewClass, SchoolClass};

/// Insert a class and return the stored row
pub async fn insert_class(pool: &SqlitePool, new: &NewClass) -> Result<SchoolClass, SqliteError> {
    let mut conn = pool.acquire().await?;
    insert_with(&mut *conn, new).await
}

/// Insert classes atomically
pub async fn insert_classes(
    pool: &SqlitePool,
    classes: &[NewClass],
) -> Result<Vec<SchoolClass>, SqliteError> {
    let mut tx = pool.begin().await?;
    let mut rows = Vec::with_capacity(classes.len());
    for new in classes {
        rows.push(insert_with(&mut *tx, new).await?);
    }
    tx.commit().await?;

    tracing::debug!(count = rows.len(), "Classes inserted");
    Ok(rows)
}

async fn insert_with(
    conn: &mut SqliteConnection,
    new: &NewClass,
) -> Result<SchoolClass, SqliteError> {
    let now = chrono::Utc::now();

    let result = sqlx::query(
        "INSERT INTO classes (name, grade, teacher_id, room, capacity, year, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&new.name)
    .bind(new.grade)
    .bind(new.teacher_id)
    .bind(&new.room)
    .bind(new.capacity)
    .bind(new.year)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| SqliteError::from_write(e, format!("Class {} ({})", new.name, new.year)))?;

    Ok(SchoolClass {
        id: result.last_insert_rowid(),
        name: new.name.clone(),
        grade: new.grade,
        teacher_id: new.teacher_id,
        room: new.room.clone(),
        capacity: new.capacity,
        year: new.year,
        created_at: now,
    })
}

/// Get a class by ID
pub async fn get_class(pool: &SqlitePool, id: i64) -> Result<Option<SchoolClass>, SqliteError> {
    let row = sqlx::query_as::<_, SchoolClass>(
        "SELECT id, name, grade, teacher_id, room, capacity, year, created_at FROM classes WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
