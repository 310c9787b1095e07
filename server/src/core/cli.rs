use clap::{Args, Parser, Subcommand};

use std::fmt;
use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_DATA_DIR, ENV_DB_MAX_CONNECTIONS, ENV_FILTER_MAX_ITEMS,
    ENV_FILTER_MAX_JSON_BYTES,
};
use crate::data::types::OrderBy;

#[derive(Parser)]
#[command(name = "classroll")]
#[command(version, about = "Filter and browse school records", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Data directory (database lives under <dir>/sqlite)
    #[arg(long, global = true, env = ENV_DATA_DIR)]
    pub data_dir: Option<PathBuf>,

    /// SQLite connection pool size
    #[arg(long, global = true, env = ENV_DB_MAX_CONNECTIONS)]
    pub db_max_connections: Option<u32>,

    /// Maximum filter request size in bytes
    #[arg(long, global = true, env = ENV_FILTER_MAX_JSON_BYTES)]
    pub filter_max_json_bytes: Option<usize>,

    /// Maximum number of filter items per request
    #[arg(long, global = true, env = ENV_FILTER_MAX_ITEMS)]
    pub filter_max_items: Option<usize>,
}

/// Record types the CLI can address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Students,
    Teachers,
    Classes,
}

impl EntityKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Students => "students",
            EntityKind::Teachers => "teachers",
            EntityKind::Classes => "classes",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse entity kind from CLI string (singular or plural)
fn parse_entity_kind(s: &str) -> Result<EntityKind, String> {
    match s.to_lowercase().as_str() {
        "students" | "student" => Ok(EntityKind::Students),
        "teachers" | "teacher" => Ok(EntityKind::Teachers),
        "classes" | "class" => Ok(EntityKind::Classes),
        _ => Err(format!(
            "Invalid entity '{}'. Valid options: students, teachers, classes",
            s
        )),
    }
}

/// Parse `field` or `field:asc|desc`
fn parse_order_by(s: &str) -> Result<OrderBy, String> {
    s.parse()
}

/// Filter request, inline or from a file
#[derive(Args, Clone, Debug, Default)]
pub struct FilterArgs {
    /// Filter group as JSON (object with and/andOp/or, or a list of and-items)
    #[arg(long, short = 'f', conflicts_with = "filter_file")]
    pub filter: Option<String>,

    /// Read the filter group JSON from a file
    #[arg(long)]
    pub filter_file: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// List records matching a filter as JSON
    Query {
        #[arg(value_parser = parse_entity_kind)]
        entity: EntityKind,

        #[command(flatten)]
        filter: FilterArgs,

        /// Sort field, optionally suffixed with :asc or :desc
        #[arg(long, value_parser = parse_order_by)]
        order_by: Option<OrderBy>,

        /// Sort descending (overrides the :asc/:desc suffix)
        #[arg(long, requires = "order_by")]
        desc: bool,

        /// Maximum rows to return
        #[arg(long)]
        limit: Option<u32>,

        /// Rows to skip
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Print the distinct values of a field among matching records
    Options {
        #[arg(value_parser = parse_entity_kind)]
        entity: EntityKind,

        /// Field key name (e.g. grade, lastName)
        field: String,

        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Insert records from a JSON array file
    Import {
        #[arg(value_parser = parse_entity_kind)]
        entity: EntityKind,

        /// JSON file holding an array of new records
        file: PathBuf,
    },
    /// Describe the filterable fields of an entity
    Schema {
        #[arg(value_parser = parse_entity_kind)]
        entity: EntityKind,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub db_max_connections: Option<u32>,
    pub filter_max_json_bytes: Option<usize>,
    pub filter_max_items: Option<usize>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Commands) {
    let cli = Cli::parse();
    let config = CliConfig {
        config: cli.config,
        data_dir: cli.data_dir,
        db_max_connections: cli.db_max_connections,
        filter_max_json_bytes: cli.filter_max_json_bytes,
        filter_max_items: cli.filter_max_items,
    };
    (config, cli.command)
}
