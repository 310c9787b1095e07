//! SQLite schema definitions
//!
//! Initial schema with all tables. Later versions are applied by the
//! migration runner on top of this.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Complete schema SQL (version 1)
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Teachers
-- =============================================================================
CREATE TABLE IF NOT EXISTS teachers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL CHECK(length(first_name) >= 1),
    last_name TEXT NOT NULL CHECK(length(last_name) >= 1),
    email TEXT UNIQUE,
    subject TEXT NOT NULL,
    hired_on DATE NOT NULL,
    active BOOLEAN NOT NULL DEFAULT 1,
    created_at DATETIME NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_teachers_last_name ON teachers(last_name);

-- =============================================================================
-- 2. Classes (references teachers)
-- =============================================================================
CREATE TABLE IF NOT EXISTS classes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    grade INTEGER NOT NULL CHECK(grade >= 1 AND grade <= 13),
    teacher_id INTEGER REFERENCES teachers(id) ON DELETE SET NULL,
    room TEXT,
    capacity INTEGER NOT NULL CHECK(capacity > 0),
    year INTEGER NOT NULL,
    created_at DATETIME NOT NULL,
    UNIQUE(name, year)
);

CREATE INDEX IF NOT EXISTS idx_classes_teacher ON classes(teacher_id);
CREATE INDEX IF NOT EXISTS idx_classes_grade ON classes(grade);

-- =============================================================================
-- 3. Students (references classes)
-- =============================================================================
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL CHECK(length(first_name) >= 1),
    last_name TEXT NOT NULL CHECK(length(last_name) >= 1),
    email TEXT UNIQUE,
    grade INTEGER NOT NULL CHECK(grade >= 1 AND grade <= 13),
    class_id INTEGER REFERENCES classes(id) ON DELETE SET NULL,
    birth_date DATE NOT NULL,
    gpa REAL CHECK(gpa IS NULL OR (gpa >= 0 AND gpa <= 5)),
    enrolled BOOLEAN NOT NULL DEFAULT 1,
    created_at DATETIME NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_students_class ON students(class_id);
CREATE INDEX IF NOT EXISTS idx_students_grade ON students(grade);
CREATE INDEX IF NOT EXISTS idx_students_last_name ON students(last_name);
"#;
