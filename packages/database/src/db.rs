//! Database connection and schema setup.

use std::path::Path;

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

use crate::StoreError;

/// Opens (or creates) the waste `SQLite` database at the given path.
///
/// Creates the parent directory if it does not exist. The schema is not
/// touched; call [`ensure_schema`] afterwards.
///
/// # Errors
///
/// Returns [`StoreError`] if the directory cannot be created or the
/// database cannot be opened.
pub fn open(path: &Path) -> Result<Box<dyn Database>, StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::Open {
            path: path.to_path_buf(),
            message: format!("cannot create {}: {e}", parent.display()),
        })?;
    }

    init_sqlite_rusqlite(Some(path)).map_err(|e| StoreError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Creates the `waste` table and its index if they don't already exist.
///
/// # Errors
///
/// Returns [`StoreError`] if the schema DDL fails.
pub async fn ensure_schema(db: &dyn Database) -> Result<(), StoreError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS waste (
            id       INTEGER PRIMARY KEY AUTOINCREMENT,
            date     TEXT NOT NULL,
            business TEXT NOT NULL,
            stream   TEXT NOT NULL,
            quantity REAL NOT NULL,
            notes    TEXT
        )",
    )
    .await?;

    db.exec_raw("CREATE INDEX IF NOT EXISTS idx_waste_date ON waste (date, id)")
        .await?;

    Ok(())
}
