//! Test entity shared by the filter tests

use chrono::NaiveDate;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use super::schema::{Column, Entity, SchemaBuilder};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Pupil {
    pub id: i64,
    pub grade: i32,
    pub name: String,
    pub city: String,
    pub score: Option<f64>,
    pub born: NaiveDate,
    pub active: bool,
    pub height: f32,
    pub nickname: Option<String>,
}

impl Pupil {
    pub const ID: Column<Pupil, i64> = Column::new("id", "id", |p: &Pupil| p.id);
    pub const GRADE: Column<Pupil, i32> = Column::new("grade", "grade", |p: &Pupil| p.grade);
    pub const NAME: Column<Pupil, String> = Column::new("name", "name", |p: &Pupil| p.name.clone());
    pub const CITY: Column<Pupil, String> = Column::new("city", "city", |p: &Pupil| p.city.clone());
    pub const SCORE: Column<Pupil, Option<f64>> =
        Column::new("score", "score", |p: &Pupil| p.score);
    pub const BORN: Column<Pupil, NaiveDate> = Column::new("born", "born", |p: &Pupil| p.born);
    pub const ACTIVE: Column<Pupil, bool> = Column::new("active", "active", |p: &Pupil| p.active);
    pub const HEIGHT: Column<Pupil, f32> = Column::new("height", "height", |p: &Pupil| p.height);
    pub const NICKNAME: Column<Pupil, Option<String>> =
        Column::new("nickname", "nickname", |p: &Pupil| p.nickname.clone());

    pub fn new(grade: i32, name: &str, city: &str) -> Self {
        Self {
            id: 0,
            grade,
            name: name.to_string(),
            city: city.to_string(),
            score: None,
            born: date(2010, 1, 1),
            active: true,
            height: 150.0,
            nickname: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn born(mut self, born: NaiveDate) -> Self {
        self.born = born;
        self
    }

    pub fn nickname(mut self, nickname: &str) -> Self {
        self.nickname = Some(nickname.to_string());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

impl Entity for Pupil {
    const NAME: &'static str = "pupil";
    const TABLE: &'static str = "pupils";

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema
            .column(Self::ID)
            .column(Self::GRADE)
            .column(Self::NAME)
            .column(Self::CITY)
            .column(Self::SCORE)
            .column(Self::BORN)
            .column(Self::ACTIVE)
            .column(Self::HEIGHT)
            .column(Self::NICKNAME);
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Anna (10), Ben (11), Cara (10)
pub fn class_roll() -> Vec<Pupil> {
    vec![
        Pupil::new(10, "Anna", "Oslo"),
        Pupil::new(11, "Ben", "Bergen"),
        Pupil::new(10, "Cara", "Trondheim"),
    ]
}

pub fn names<'a>(pupils: impl IntoIterator<Item = &'a Pupil>) -> Vec<&'a str> {
    pupils.into_iter().map(|p| p.name.as_str()).collect()
}

const PUPILS_TABLE: &str = r#"
CREATE TABLE pupils (
    id INTEGER PRIMARY KEY,
    grade INTEGER NOT NULL,
    name TEXT NOT NULL,
    city TEXT NOT NULL,
    score REAL,
    born DATE NOT NULL,
    active BOOLEAN NOT NULL,
    height REAL NOT NULL,
    nickname TEXT
)
"#;

/// Single-connection in-memory pool holding `pupils`; ids are assigned 1..
pub async fn pupil_pool(pupils: &[Pupil]) -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test pool");

    sqlx::query(PUPILS_TABLE)
        .execute(&pool)
        .await
        .expect("Failed to create pupils table");

    for pupil in pupils {
        sqlx::query(
            "INSERT INTO pupils (grade, name, city, score, born, active, height, nickname) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(pupil.grade)
        .bind(&pupil.name)
        .bind(&pupil.city)
        .bind(pupil.score)
        .bind(pupil.born)
        .bind(pupil.active)
        .bind(pupil.height)
        .bind(&pupil.nickname)
        .execute(&pool)
        .await
        .expect("Failed to insert pupil");
    }

    pool
}
