//! Student repository for SQLite operations

use sqlx::{SqliteConnection, SqlitePool};

use crate::data::sqlite::SqliteError;
use crate::data::types::{NewStudent, Student};

/// Insert a student and return the stored row
pub async fn insert_student(pool: &SqlitePool, new: &NewStudent) -> Result<Student, SqliteError> {
    let mut conn = pool.acquire().await?;
    insert_with(&mut *conn, new).await
}

/// Insert students atomically
pub async fn insert_students(
    pool: &SqlitePool,
    students: &[NewStudent],
) -> Result<Vec<Student>, SqliteError> {
    let mut tx = pool.begin().await?;
    let mut rows = Vec::with_capacity(students.len());
    for new in students {
        rows.push(insert_with(&mut *tx, new).await?);
    }
    tx.commit().await?;

    tracing::debug!(count = rows.len(), "Students inserted");
    Ok(rows)
}

async fn insert_with(conn: &mut SqliteConnection, new: &NewStudent) -> Result<Student, SqliteError> {
    let now = chrono::Utc::now();

    let result = sqlx::query(
        r#"INSERT INTO students (first_name, last_name, email, grade, class_id, birth_date, gpa, attendance_rate, enrolled, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(&new.email)
    .bind(new.grade)
    .bind(new.class_id)
    .bind(new.birth_date)
    .bind(new.gpa)
    .bind(new.attendance_rate)
    .bind(new.enrolled)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        SqliteError::from_write(e, format!("Student {} {}", new.first_name, new.last_name))
    })?;

    Ok(Student {
        id: result.last_insert_rowid(),
        first_name: new.first_name.clone(),
        last_name: new.last_name.clone(),
        email: new.email.clone(),
        grade: new.grade,
        class_id: new.class_id,
        birth_date: new.birth_date,
        gpa: new.gpa,
        attendance_rate: new.attendance_rate,
        enrolled: new.enrolled,
        created_at: now,
    })
}

/// Get a student by ID
pub async fn get_student(pool: &SqlitePool, id: i64) -> Result<Option<Student>, SqliteError> {
    let row = sqlx::query_as::<_, Student>(
        r#"SELECT id, first_name, last_name, email, grade, class_id, birth_date, gpa, attendance_rate, enrolled, created_at
           FROM students WHERE id = ?"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::super::setup_test_pool;
    use super::*;
    use crate::data::sqlite::Constraint;

    fn new_student(first_name: &str, grade: i32) -> NewStudent {
        NewStudent {
            first_name: first_name.to_string(),
            last_name: "Holm".to_string(),
            email: None,
            grade,
            class_id: None,
            birth_date: NaiveDate::from_ymd_opt(2009, 3, 14).unwrap(),
            gpa: Some(3.5),
            attendance_rate: 0.95,
            enrolled: true,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_student() {
        let pool = setup_test_pool().await;
        let student = insert_student(&pool, &new_student("Maja", 10)).await.unwrap();

        let fetched = get_student(&pool, student.id).await.unwrap().unwrap();
        assert_eq!(fetched.first_name, "Maja");
        assert_eq!(fetched.grade, 10);
        assert_eq!(fetched.gpa, Some(3.5));
        assert_eq!(fetched.attendance_rate, 0.95);
        assert_eq!(fetched.birth_date, student.birth_date);
        assert!(fetched.enrolled);
    }

    #[tokio::test]
    async fn test_insert_students_assigns_ids() {
        let pool = setup_test_pool().await;
        let rows = insert_students(&pool, &[new_student("Maja", 10), new_student("Olle", 11)])
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_ne!(rows[0].id, rows[1].id);
    }

    #[tokio::test]
    async fn test_grade_out_of_range_is_conflict() {
        let pool = setup_test_pool().await;
        let err = insert_student(&pool, &new_student("Maja", 20)).await.unwrap_err();
        assert_eq!(err.constraint(), Some(Constraint::Check));
    }

    #[tokio::test]
    async fn test_missing_class_is_conflict() {
        let pool = setup_test_pool().await;
        let mut student = new_student("Maja", 10);
        student.class_id = Some(7);
        let err = insert_student(&pool, &student).await.unwrap_err();
        assert_eq!(err.constraint(), Some(Constraint::ForeignKey));
        assert_eq!(err.to_string(), "Student Maja Holm references a missing record");
    }
}
