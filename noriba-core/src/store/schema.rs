//! Relational schema derived from the entity catalog.
//!
//! Every entity becomes one table whose columns are all `TEXT`, so loaded
//! values keep their source spelling. Natural keys and join columns receive
//! non-unique indexes; duplicate rows must survive a load that skips dedup.

use std::collections::BTreeSet;

use rusqlite::{Connection, Error as SqliteError};
use thiserror::Error;

use crate::catalog::{EntityDef, LOAD_ORDER, SchemaCatalog};

/// Errors raised while dropping or creating the schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A DDL statement failed.
    #[error("failed to execute schema step '{step}' on table {table}")]
    Statement {
        /// Short description of the step.
        step: &'static str,
        /// Table the statement targeted.
        table: &'static str,
        /// Error reported by SQLite.
        #[source]
        source: SqliteError,
    },
    /// Opening or committing the schema transaction failed.
    #[error("failed to {operation} schema transaction")]
    Transaction {
        /// Either `begin` or `commit`.
        operation: &'static str,
        /// Error reported by SQLite.
        #[source]
        source: SqliteError,
    },
}

/// Drop every catalog table and recreate it, committing on success.
///
/// The reset runs in its own transaction. Dropping is idempotent: tables that
/// do not exist are ignored.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use noriba_core::store::reset_schema;
///
/// let mut connection = Connection::open_in_memory().expect("open database");
/// reset_schema(&mut connection).expect("reset schema");
/// let stops: i64 = connection
///     .query_row("SELECT COUNT(*) FROM stops", [], |row| row.get(0))
///     .expect("count stops");
/// assert_eq!(stops, 0);
/// ```
pub fn reset_schema(connection: &mut Connection) -> Result<(), SchemaError> {
    in_transaction(connection, |transaction| {
        drop_schema(transaction)?;
        create_schema(transaction)
    })
}

/// Create any missing catalog table and index, leaving existing data intact.
pub fn ensure_schema(connection: &mut Connection) -> Result<(), SchemaError> {
    in_transaction(connection, create_schema)
}

/// Drop every catalog table, children first.
pub fn drop_schema(connection: &Connection) -> Result<(), SchemaError> {
    for kind in LOAD_ORDER.iter().rev() {
        let table = kind.table();
        run_schema_step(
            connection,
            "drop table",
            table,
            &format!("DROP TABLE IF EXISTS \"{table}\""),
        )?;
    }
    Ok(())
}

/// Create every catalog table and its indexes when missing.
pub fn create_schema(connection: &Connection) -> Result<(), SchemaError> {
    for entity in SchemaCatalog::entities() {
        run_schema_step(connection, "create table", entity.table, &create_table_sql(entity))?;
        for sql in create_index_sql(entity) {
            run_schema_step(connection, "create index", entity.table, &sql)?;
        }
    }
    Ok(())
}

/// `CREATE TABLE` statement for one entity.
#[must_use]
pub fn create_table_sql(entity: &EntityDef) -> String {
    let columns = entity
        .columns
        .iter()
        .map(|column| {
            if column.required {
                format!("\"{}\" TEXT NOT NULL", column.name)
            } else {
                format!("\"{}\" TEXT", column.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS \"{}\" ({columns})", entity.table)
}

/// `CREATE INDEX` statements covering the natural key and join columns.
#[must_use]
pub fn create_index_sql(entity: &EntityDef) -> Vec<String> {
    let mut statements = Vec::new();
    if !entity.natural_key.is_empty() {
        statements.push(index_sql(entity.table, "key", entity.natural_key));
    }
    let join_columns: BTreeSet<&str> = entity
        .relations
        .iter()
        .flat_map(|relation| relation.on.iter().map(|(local, _)| *local))
        .filter(|column| entity.natural_key.first() != Some(column))
        .collect();
    for column in join_columns {
        statements.push(index_sql(entity.table, column, &[column]));
    }
    statements
}

fn index_sql(table: &str, suffix: &str, columns: &[&str]) -> String {
    let columns = columns
        .iter()
        .map(|column| format!("\"{column}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE INDEX IF NOT EXISTS \"idx_{table}_{suffix}\" ON \"{table}\" ({columns})")
}

fn in_transaction<F>(connection: &mut Connection, body: F) -> Result<(), SchemaError>
where
    F: FnOnce(&Connection) -> Result<(), SchemaError>,
{
    let transaction = connection
        .transaction()
        .map_err(|source| SchemaError::Transaction {
            operation: "begin",
            source,
        })?;
    let scoped: &Connection = &transaction;
    body(scoped)?;
    transaction
        .commit()
        .map_err(|source| SchemaError::Transaction {
            operation: "commit",
            source,
        })
}

fn run_schema_step(
    connection: &Connection,
    step: &'static str,
    table: &'static str,
    sql: &str,
) -> Result<(), SchemaError> {
    connection
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| SchemaError::Statement {
            step,
            table,
            source,
        })
}
