// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! Wraps the cargo invocations CI runs (lint, build, test, deny, machete), a
//! migration check for the `SQLite` schema of `kampcomp-persistence` and a
//! quick smoke run of the queue worker.
//!
//! There is no typos check: identifiers and logbook texts are Dutch.
//!
//! ### Migration check
//!
//! `cargo xtask verify-migrations` applies the embedded migrations to an
//! in-memory database and verifies that:
//! - exactly the tables the persistence crate maps exist
//! - every foreign key and index names existing columns
//! - reverting all migrations leaves no tables behind
//! - applying them again yields the same schema

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{fmt::Debug, io, process::Output, vec};

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{
    eyre::{eyre, Context},
    Result,
};
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use duct::cmd;
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

/// Tables the persistence crate maps in its diesel schema.
const EXPECTED_TABLES: [&str; 11] = [
    "audit_events",
    "clubs",
    "competities",
    "deelnemers",
    "indiv_klassen",
    "kampioenschappen",
    "klasse_limieten",
    "mutaties",
    "regio_inschrijvingen",
    "sporters",
    "worker_leases",
];

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, migrations, worker)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Check dependencies
    #[command(visible_alias = "cd")]
    Deny,

    /// Check unused dependencies
    #[command(visible_alias = "m")]
    Machete,

    /// Lint formatting and clippy
    #[command(visible_alias = "l")]
    Lint,

    /// Run tests, doc tests included
    #[command(visible_alias = "t")]
    Test,

    /// Verify that the `SQLite` migrations apply, revert and re-apply cleanly
    #[command(visible_alias = "vm")]
    VerifyMigrations,

    /// Run the queue worker once against a database file
    #[command(visible_alias = "w")]
    WorkerSmoke {
        /// Database file; a throwaway file under target/ when absent
        #[arg(long)]
        database: Option<String>,
    },
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Deny => deny(),
            Self::Machete => machete(),
            Self::Lint => lint(),
            Self::Test => test(),
            Self::VerifyMigrations => verify_migrations(),
            Self::WorkerSmoke { database } => worker_smoke(database.as_deref()),
        }
    }
}

fn ci() -> Result<()> {
    lint()?;
    deny()?;
    machete()?;
    build()?;
    test()?;
    verify_migrations()?;
    worker_smoke(None)?;
    Ok(())
}

fn deny() -> Result<()> {
    run_cargo(vec!["deny", "check"])
}

fn machete() -> Result<()> {
    cmd!("cargo-machete").run_with_trace()?;
    Ok(())
}

fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Clippy with warnings denied, then the formatting check
fn lint() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])?;
    run_cargo(vec!["fmt", "--all", "--check"])
}

fn test() -> Result<()> {
    run_cargo(vec!["test", "--workspace", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run `kampcomp-server worker 5 --quick` so the worker opens the database,
/// runs the overstap sweep, drains and exits within five seconds.
fn worker_smoke(database: Option<&str>) -> Result<()> {
    let database: &str = database.unwrap_or("target/worker-smoke.sqlite3");
    tracing::info!(database, "Running a quick worker pass");
    run_cargo(vec![
        "run",
        "--package",
        "kampcomp-server",
        "--",
        "--database",
        database,
        "worker",
        "5",
        "--quick",
    ])
}

/// Verify the `SQLite` migrations of the persistence crate
///
/// Fails if the schema does not hold exactly the expected tables, if a
/// foreign key or index names a missing column, or if the down migrations
/// do not undo the up migrations.
fn verify_migrations() -> Result<()> {
    tracing::info!("Applying migrations to an in-memory database");
    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply migrations: {e}"))?;

    let schema = introspect_sqlite_schema(&mut conn)?;
    check_tables(&schema)?;
    check_references(&schema)?;

    tracing::info!("Reverting all migrations");
    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to revert migrations: {e}"))?;
    let leftover = introspect_sqlite_schema(&mut conn)?;
    if !leftover.tables.is_empty() {
        return Err(eyre!(
            "Tables left after reverting all migrations: {:?}",
            leftover.tables.keys().collect::<Vec<_>>()
        ));
    }

    tracing::info!("Re-applying migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to re-apply migrations: {e}"))?;
    let reapplied = introspect_sqlite_schema(&mut conn)?;
    if reapplied != schema {
        return Err(eyre!("Schema differs after a revert and re-apply"));
    }

    tracing::info!("Migration check passed");
    Ok(())
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    indexes: BTreeSet<Index>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Index {
    name: String,
    unique: bool,
    columns: Vec<String>,
}

/// Introspect `SQLite` schema
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Integer)]
        unique: i32,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' \
         AND name != '__diesel_schema_migrations' ORDER BY name",
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table {
            columns: BTreeMap::new(),
            primary_keys: BTreeSet::new(),
            foreign_keys: BTreeSet::new(),
            indexes: BTreeSet::new(),
        };

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            if col.pk > 0 {
                table_info.primary_keys.insert(col.name.clone());
            }
            table_info.columns.insert(
                col.name,
                Column {
                    normalized_type: normalize_sqlite_type(&col.r#type),
                    nullable: col.notnull == 0,
                },
            );
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
                to_column: fk.to,
            });
        }

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        for idx in indexes {
            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;

            table_info.indexes.insert(Index {
                name: idx.name,
                unique: idx.unique != 0,
                columns: index_columns.into_iter().map(|c| c.name).collect(),
            });
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

/// Normalize `SQLite` type to common representation
fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let normalized = sqlite_type.to_uppercase();
    if normalized.contains("INT") {
        "integer".to_string()
    } else if normalized.contains("REAL")
        || normalized.contains("FLOA")
        || normalized.contains("DOUB")
    {
        "real".to_string()
    } else if normalized.contains("BLOB") {
        "blob".to_string()
    } else {
        "text".to_string()
    }
}

/// Fail unless the schema holds exactly the expected tables
fn check_tables(schema: &Schema) -> Result<()> {
    let expected: BTreeSet<&str> = EXPECTED_TABLES.into_iter().collect();
    let actual: BTreeSet<&str> = schema.tables.keys().map(String::as_str).collect();

    let mut errors = Vec::new();
    for table in expected.difference(&actual) {
        errors.push(format!("  - Table '{table}' is mapped but not created"));
    }
    for table in actual.difference(&expected) {
        errors.push(format!("  - Table '{table}' is created but not mapped"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(eyre!("Table mismatch\n{}", errors.join("\n")))
    }
}

/// Fail when a foreign key or index names a column that does not exist
fn check_references(schema: &Schema) -> Result<()> {
    let mut errors = Vec::new();

    for (table_name, table) in &schema.tables {
        if table.primary_keys.is_empty() {
            errors.push(format!("  - Table '{table_name}' has no primary key"));
        }

        for fk in &table.foreign_keys {
            if !table.columns.contains_key(&fk.from_column) {
                errors.push(format!(
                    "  - Foreign key column '{table_name}.{}' does not exist",
                    fk.from_column
                ));
            }
            let target_exists = schema
                .tables
                .get(&fk.to_table)
                .is_some_and(|target| target.columns.contains_key(&fk.to_column));
            if !target_exists {
                errors.push(format!(
                    "  - Foreign key '{table_name}.{}' references missing '{}.{}'",
                    fk.from_column, fk.to_table, fk.to_column
                ));
            }
        }

        for idx in &table.indexes {
            for column in &idx.columns {
                if !table.columns.contains_key(column) {
                    errors.push(format!(
                        "  - Index '{}' names missing column '{table_name}.{column}'",
                        idx.name
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(eyre!("Broken references\n{}", errors.join("\n")))
    }
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
