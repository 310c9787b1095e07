//! School records exposed to the filter engine
//!
//! Each record declares its filterable fields once as typed columns. Wire
//! key names are camelCase; SQL columns are snake_case.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::data::filters::{Column, Entity, SchemaBuilder};

// ============================================================================
// Teachers
// ============================================================================

/// Teacher row from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub subject: String,
    pub hired_on: NaiveDate,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Teacher {
    pub const ID: Column<Self, i64> = Column::new("id", "id", |t: &Self| t.id);
    pub const FIRST_NAME: Column<Self, String> =
        Column::new("firstName", "first_name", |t: &Self| t.first_name.clone());
    pub const LAST_NAME: Column<Self, String> =
        Column::new("lastName", "last_name", |t: &Self| t.last_name.clone());
    pub const EMAIL: Column<Self, Option<String>> =
        Column::new("email", "email", |t: &Self| t.email.clone());
    pub const SUBJECT: Column<Self, String> =
        Column::new("subject", "subject", |t: &Self| t.subject.clone());
    pub const HIRED_ON: Column<Self, NaiveDate> =
        Column::new("hiredOn", "hired_on", |t: &Self| t.hired_on);
    pub const ACTIVE: Column<Self, bool> = Column::new("active", "active", |t: &Self| t.active);
    pub const CREATED_AT: Column<Self, DateTime<Utc>> =
        Column::new("createdAt", "created_at", |t: &Self| t.created_at);
}

impl Entity for Teacher {
    const NAME: &'static str = "teacher";
    const TABLE: &'static str = "teachers";

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema
            .column(Self::ID)
            .column(Self::FIRST_NAME)
            .column(Self::LAST_NAME)
            .column(Self::EMAIL)
            .column(Self::SUBJECT)
            .column(Self::HIRED_ON)
            .column(Self::ACTIVE)
            .column(Self::CREATED_AT);
    }
}

/// Teacher import payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeacher {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub subject: String,
    pub hired_on: NaiveDate,
    #[serde(default = "default_true")]
    pub active: bool,
}

// ============================================================================
// Classes
// ============================================================================

/// Class row from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SchoolClass {
    pub id: i64,
    pub name: String,
    pub grade: i32,
    pub teacher_id: Option<i64>,
    pub room: Option<String>,
    pub capacity: i32,
    pub year: i32,
    pub created_at: DateTime<Utc>,
}

impl SchoolClass {
    pub const ID: Column<Self, i64> = Column::new("id", "id", |c: &Self| c.id);
    pub const NAME: Column<Self, String> = Column::new("name", "name", |c: &Self| c.name.clone());
    pub const GRADE: Column<Self, i32> = Column::new("grade", "grade", |c: &Self| c.grade);
    pub const TEACHER_ID: Column<Self, Option<i64>> =
        Column::new("teacherId", "teacher_id", |c: &Self| c.teacher_id);
    pub const ROOM: Column<Self, Option<String>> =
        Column::new("room", "room", |c: &Self| c.room.clone());
    pub const CAPACITY: Column<Self, i32> =
        Column::new("capacity", "capacity", |c: &Self| c.capacity);
    pub const YEAR: Column<Self, i32> = Column::new("year", "year", |c: &Self| c.year);
    pub const CREATED_AT: Column<Self, DateTime<Utc>> =
        Column::new("createdAt", "created_at", |c: &Self| c.created_at);
}

impl Entity for SchoolClass {
    const NAME: &'static str = "class";
    const TABLE: &'static str = "classes";

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema
            .column(Self::ID)
            .column(Self::NAME)
            .column(Self::GRADE)
            .column(Self::TEACHER_ID)
            .column(Self::ROOM)
            .column(Self::CAPACITY)
            .column(Self::YEAR)
            .column(Self::CREATED_AT);
    }
}

/// Class import payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClass {
    pub name: String,
    pub grade: i32,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub room: Option<String>,
    pub capacity: i32,
    pub year: i32,
}

// ============================================================================
// Students
// ============================================================================

/// Student row from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub grade: i32,
    pub class_id: Option<i64>,
    pub birth_date: NaiveDate,
    pub gpa: Option<f64>,
    pub attendance_rate: f32,
    pub enrolled: bool,
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub const ID: Column<Self, i64> = Column::new("id", "id", |s: &Self| s.id);
    pub const FIRST_NAME: Column<Self, String> =
        Column::new("firstName", "first_name", |s: &Self| s.first_name.clone());
    pub const LAST_NAME: Column<Self, String> =
        Column::new("lastName", "last_name", |s: &Self| s.last_name.clone());
    pub const EMAIL: Column<Self, Option<String>> =
        Column::new("email", "email", |s: &Self| s.email.clone());
    pub const GRADE: Column<Self, i32> = Column::new("grade", "grade", |s: &Self| s.grade);
    pub const CLASS_ID: Column<Self, Option<i64>> =
        Column::new("classId", "class_id", |s: &Self| s.class_id);
    pub const BIRTH_DATE: Column<Self, NaiveDate> =
        Column::new("birthDate", "birth_date", |s: &Self| s.birth_date);
    pub const GPA: Column<Self, Option<f64>> = Column::new("gpa", "gpa", |s: &Self| s.gpa);
    pub const ATTENDANCE_RATE: Column<Self, f32> =
        Column::new("attendanceRate", "attendance_rate", |s: &Self| s.attendance_rate);
    pub const ENROLLED: Column<Self, bool> =
        Column::new("enrolled", "enrolled", |s: &Self| s.enrolled);
    pub const CREATED_AT: Column<Self, DateTime<Utc>> =
        Column::new("createdAt", "created_at", |s: &Self| s.created_at);
}

impl Entity for Student {
    const NAME: &'static str = "student";
    const TABLE: &'static str = "students";

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema
            .column(Self::ID)
            .column(Self::FIRST_NAME)
            .column(Self::LAST_NAME)
            .column(Self::EMAIL)
            .column(Self::GRADE)
            .column(Self::CLASS_ID)
            .column(Self::BIRTH_DATE)
            .column(Self::GPA)
            .column(Self::ATTENDANCE_RATE)
            .column(Self::ENROLLED)
            .column(Self::CREATED_AT);
    }
}

/// Student import payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub grade: i32,
    #[serde(default)]
    pub class_id: Option<i64>,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default = "default_attendance")]
    pub attendance_rate: f32,
    #[serde(default = "default_true")]
    pub enrolled: bool,
}

fn default_true() -> bool {
    true
}

fn default_attendance() -> f32 {
    1.0
}
