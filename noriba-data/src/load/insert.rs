//! Chunked multi-row inserts.

use log::debug;
use noriba_core::EntityDef;
use rusqlite::{Connection, params_from_iter};

/// SQLite limits bound parameters per statement to 999 by default. Inserts
/// are chunked to remain below that ceiling.
pub(crate) const SQLITE_MAX_VARIABLE_NUMBER: usize = 999;

/// A staged row: one optional value per catalog column, in column order.
pub(crate) type StagedRow = Vec<Option<String>>;

/// Number of rows that fit in one statement for `columns` columns.
pub(crate) fn rows_per_statement(columns: usize) -> usize {
    (SQLITE_MAX_VARIABLE_NUMBER / columns.max(1)).max(1)
}

/// Insert every staged row into the entity's table.
pub(crate) fn insert_rows(
    connection: &Connection,
    entity: &EntityDef,
    rows: &[StagedRow],
) -> rusqlite::Result<usize> {
    let chunk_size = rows_per_statement(entity.columns.len());
    let mut inserted = 0;
    for chunk in rows.chunks(chunk_size) {
        let sql = insert_sql(entity, chunk.len());
        let mut statement = connection.prepare_cached(&sql)?;
        let values = chunk.iter().flatten().map(Option::as_deref);
        inserted += statement.execute(params_from_iter(values))?;
        debug!("{}: inserted batch of {} rows", entity.table, chunk.len());
    }
    Ok(inserted)
}

fn insert_sql(entity: &EntityDef, rows: usize) -> String {
    let columns = entity
        .column_names()
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = format!("({})", vec!["?"; entity.columns.len()].join(", "));
    let values = vec![placeholders.as_str(); rows].join(", ");
    format!(
        "INSERT INTO \"{}\" ({columns}) VALUES {values}",
        entity.table
    )
}
