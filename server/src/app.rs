//! Core application

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::FromRow;
use sqlx::sqlite::SqliteRow;

use crate::core::cli::{self, CliConfig, Commands, EntityKind, FilterArgs};
use crate::core::config::AppConfig;
use crate::core::constants::{DEFAULT_LOG_FILTER, ENV_LOG};
use crate::core::storage::AppStorage;
use crate::data::SqliteService;
use crate::data::filters::{Entity, FilterGroup, SchemaCache, ValueType, parse_filter_group};
use crate::data::sqlite::repositories::{
    insert_classes, insert_students, insert_teachers, list_records, record_filter_options,
};
use crate::data::types::{
    ListParams, NewClass, NewStudent, NewTeacher, OrderBy, OrderDirection, SchoolClass, Student,
    Teacher,
};

/// One row of `classroll schema` output
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldInfo {
    key_name: &'static str,
    column: &'static str,
    key_type: ValueType,
    nullable: bool,
}

pub struct CoreApp {
    pub config: AppConfig,
    pub storage: AppStorage,
    pub database: Arc<SqliteService>,
    pub schemas: Arc<SchemaCache>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self::init(&cli_config).await?;
        let result = app.execute(command).await;
        app.database.close().await;
        result
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init(&config).await?;
        let database = SqliteService::init(&storage, &config.database)
            .await
            .context("Failed to initialize database")?;

        Ok(Self {
            config,
            storage,
            database: Arc::new(database),
            schemas: Arc::new(SchemaCache::new()),
        })
    }

    async fn execute(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Query {
                entity,
                filter,
                order_by,
                desc,
                limit,
                offset,
            } => {
                let group = self.read_filter(&filter)?;
                let order_by = order_by.map(|order| OrderBy {
                    direction: if desc {
                        OrderDirection::Desc
                    } else {
                        order.direction
                    },
                    ..order
                });
                let params = ListParams {
                    order_by,
                    limit,
                    offset,
                };
                match entity {
                    EntityKind::Students => self.query::<Student>(&group, &params).await,
                    EntityKind::Teachers => self.query::<Teacher>(&group, &params).await,
                    EntityKind::Classes => self.query::<SchoolClass>(&group, &params).await,
                }
            }
            Commands::Options {
                entity,
                field,
                filter,
            } => {
                let group = self.read_filter(&filter)?;
                match entity {
                    EntityKind::Students => self.options::<Student>(&group, &field).await,
                    EntityKind::Teachers => self.options::<Teacher>(&group, &field).await,
                    EntityKind::Classes => self.options::<SchoolClass>(&group, &field).await,
                }
            }
            Commands::Import { entity, file } => self.import(entity, &file).await,
            Commands::Schema { entity } => match entity {
                EntityKind::Students => self.describe::<Student>(),
                EntityKind::Teachers => self.describe::<Teacher>(),
                EntityKind::Classes => self.describe::<SchoolClass>(),
            },
        }
    }

    /// Parse the filter group from `--filter` or `--filter-file`; none means match all
    fn read_filter(&self, args: &FilterArgs) -> Result<FilterGroup> {
        let json = match (&args.filter, &args.filter_file) {
            (Some(json), _) => json.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read filter file: {}", path.display()))?,
            (None, None) => return Ok(FilterGroup::default()),
        };

        let group = parse_filter_group(&json, &self.config.filters)
            .context("Invalid filter request")?;
        tracing::debug!(items = group.item_count(), "Filter group parsed");
        Ok(group)
    }

    async fn query<T>(&self, group: &FilterGroup, params: &ListParams) -> Result<()>
    where
        T: Entity + Serialize + for<'r> FromRow<'r, SqliteRow> + Unpin,
    {
        let page = list_records::<T>(self.database.pool(), &self.schemas, group, params)
            .await
            .with_context(|| format!("Failed to list {} records", T::NAME))?;

        tracing::info!(
            entity = T::NAME,
            returned = page.data.len(),
            total = page.total_items,
            "Query complete"
        );
        print_json(&page)
    }

    async fn options<T: Entity>(&self, group: &FilterGroup, field: &str) -> Result<()> {
        let values = record_filter_options::<T>(self.database.pool(), &self.schemas, group, field)
            .await
            .with_context(|| format!("Failed to list values of {}.{}", T::NAME, field))?;
        print_json(&values)
    }

    fn describe<T: Entity>(&self) -> Result<()> {
        let schema = self.schemas.schema::<T>();
        let fields: Vec<FieldInfo> = schema
            .fields()
            .iter()
            .map(|field| FieldInfo {
                key_name: field.name(),
                column: field.column(),
                key_type: field.value_type(),
                nullable: field.is_nullable(),
            })
            .collect();
        print_json(&fields)
    }

    async fn import(&self, entity: EntityKind, file: &Path) -> Result<()> {
        let pool = self.database.pool();
        let inserted = match entity {
            EntityKind::Students => {
                let records: Vec<NewStudent> = read_records(file)?;
                insert_students(pool, &records).await?.len()
            }
            EntityKind::Teachers => {
                let records: Vec<NewTeacher> = read_records(file)?;
                insert_teachers(pool, &records).await?.len()
            }
            EntityKind::Classes => {
                let records: Vec<NewClass> = read_records(file)?;
                insert_classes(pool, &records).await?.len()
            }
        };

        tracing::info!(%entity, inserted, file = %file.display(), "Import complete");
        print_json(&serde_json::json!({ "entity": entity.as_str(), "inserted": inserted }))
    }

    fn init_logging() {
        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .with_writer(std::io::stderr)
            .compact()
            .with_env_filter(filter)
            .init();
    }
}

/// Read a JSON array of import records
fn read_records<T: DeserializeOwned>(file: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read import file: {}", file.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse import file: {}", file.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_read_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"[{"name": "10A", "grade": 10, "capacity": 28, "year": 2024}]"#,
        )
        .unwrap();

        let records: Vec<NewClass> = read_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "10A");
        assert!(records[0].teacher_id.is_none());
    }

    #[test]
    fn test_read_records_rejects_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"name": "10A"}"#).unwrap();

        let err = read_records::<NewClass>(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse import file"));
    }

    #[test]
    fn test_field_info_serializes_type_name() {
        let info = FieldInfo {
            key_name: "gpa",
            column: "gpa",
            key_type: ValueType::Double,
            nullable: true,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["keyName"], "gpa");
        assert_eq!(json["keyType"], "double");
        assert_eq!(json["nullable"], true);
    }
}
