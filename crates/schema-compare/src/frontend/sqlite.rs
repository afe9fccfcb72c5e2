//! SQLite frontend.
//!
//! The schema is read from the catalog of a live database:
//!
//! - tables from `sqlite_master` (internal `sqlite_*` tables excluded)
//! - columns, declared types, NOT NULL flags, defaults and primary keys
//!   from `pragma_table_info`
//! - single-column unique indexes from `pragma_index_list` and
//!   `pragma_index_info`
//! - foreign keys from `pragma_foreign_key_list`; a relation without an
//!   explicit target column references the target table's primary key
//!
//! `AUTOINCREMENT` is taken from the table's `CREATE TABLE` statement and
//! attached to its primary key column.

use std::collections::BTreeMap;

use schema_compare_core::{ColumnDef, SchemaGraph, SchemaGraphBuilder, Table};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info, trace};

use super::SourceDescriptor;
use crate::error::{FrontendError, Result};

const TABLES_SQL: &str = "SELECT name, sql FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";

const COLUMNS_SQL: &str =
    "SELECT cid, name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?) ORDER BY cid";

const INDEXES_SQL: &str = "SELECT name, \"unique\", origin FROM pragma_index_list(?)";

const INDEX_COLUMNS_SQL: &str = "SELECT name FROM pragma_index_info(?)";

const FOREIGN_KEYS_SQL: &str =
    "SELECT \"table\", \"from\", \"to\" FROM pragma_foreign_key_list(?) ORDER BY id, seq";

/// One row of `pragma_table_info`.
type ColumnRow = (i64, String, String, i64, Option<String>, i64);

/// Opens a database read-only and reads its schema graph.
pub async fn load(descriptor: &SourceDescriptor) -> Result<SchemaGraph> {
    info!(source = %descriptor, "opening sqlite database");
    let options = SqliteConnectOptions::new()
        .filename(descriptor.path())
        .read_only(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| FrontendError::extraction(descriptor.as_str(), e))?;

    let graph = read_schema(&pool, descriptor.as_str()).await;
    pool.close().await;
    graph
}

/// Reads the schema graph of a connected database.
///
/// `origin` names the database in source references and error messages.
/// The graph is not validated here.
pub async fn read_schema(pool: &SqlitePool, origin: &str) -> Result<SchemaGraph> {
    let db_error = |e: sqlx::Error| FrontendError::extraction(origin, e);

    let tables: Vec<(String, Option<String>)> = sqlx::query_as(TABLES_SQL)
        .fetch_all(pool)
        .await
        .map_err(db_error)?;

    let mut builder = SchemaGraph::builder();
    let mut primary_keys: BTreeMap<String, String> = BTreeMap::new();

    for (table, create_sql) in &tables {
        let columns: Vec<ColumnRow> = sqlx::query_as(COLUMNS_SQL)
            .bind(table)
            .fetch_all(pool)
            .await
            .map_err(db_error)?;
        let unique = unique_columns(pool, table).await.map_err(db_error)?;
        let autoincrement = create_sql
            .as_deref()
            .is_some_and(|sql| sql.to_ascii_uppercase().contains("AUTOINCREMENT"));

        builder =
            builder.add_table(Table::new(table).with_source_ref(format!("{origin}#{table}")));
        for (cid, name, sql_type, not_null, default, pk) in columns {
            trace!(table = %table, column = %name, %sql_type, "column");
            let mut def = ColumnDef::new(&name, sql_type)
                .at(usize::try_from(cid).unwrap_or_default())
                .source_ref(format!("{origin}#{table}.{name}"));
            if not_null != 0 {
                def = def.not_null();
            }
            if pk != 0 {
                def = def.primary_key();
                if autoincrement {
                    def = def.auto_increment();
                }
                // The first key column stands in for composite keys.
                if pk == 1 {
                    primary_keys.insert(table.clone(), name.clone());
                }
            }
            if unique.contains(&name) {
                def = def.unique();
            }
            if let Some(expr) = default {
                def = def.default_expr(expr);
            }
            builder = builder.column(table, def);
        }
    }

    let mut foreign_keys = 0usize;
    for (table, _) in &tables {
        let relations: Vec<(String, String, Option<String>)> = sqlx::query_as(FOREIGN_KEYS_SQL)
            .bind(table)
            .fetch_all(pool)
            .await
            .map_err(db_error)?;
        for (target_table, column, target_column) in relations {
            builder = add_foreign_key(
                builder,
                origin,
                &primary_keys,
                (table.as_str(), column.as_str()),
                (target_table.as_str(), target_column),
            )?;
            foreign_keys += 1;
        }
    }

    let graph = builder.build();
    debug!(
        tables = graph.table_count(),
        columns = graph.column_count(),
        foreign_keys,
        "sqlite schema read"
    );
    Ok(graph)
}

/// Columns covered by a single-column unique index or constraint.
async fn unique_columns(pool: &SqlitePool, table: &str) -> sqlx::Result<Vec<String>> {
    let indexes: Vec<(String, i64, String)> = sqlx::query_as(INDEXES_SQL)
        .bind(table)
        .fetch_all(pool)
        .await?;

    let mut columns = Vec::new();
    for (index, unique, origin) in indexes {
        // Primary key indexes are covered by the PRIMARY KEY constraint.
        if unique == 0 || origin == "pk" {
            continue;
        }
        let indexed: Vec<(Option<String>,)> = sqlx::query_as(INDEX_COLUMNS_SQL)
            .bind(&index)
            .fetch_all(pool)
            .await?;
        if let [(Some(column),)] = indexed.as_slice() {
            columns.push(column.clone());
        }
    }
    Ok(columns)
}

fn add_foreign_key(
    builder: SchemaGraphBuilder,
    origin: &str,
    primary_keys: &BTreeMap<String, String>,
    (table, column): (&str, &str),
    (target_table, target_column): (&str, Option<String>),
) -> Result<SchemaGraphBuilder> {
    let target_column = match target_column {
        Some(target) => target,
        None => primary_keys.get(target_table).cloned().ok_or_else(|| {
            FrontendError::extraction(
                origin,
                format!(
                    "foreign key {table}.{column} references '{target_table}', \
                     which has no primary key"
                ),
            )
        })?,
    };
    Ok(builder.foreign_key((table, column), (target_table, target_column)))
}
