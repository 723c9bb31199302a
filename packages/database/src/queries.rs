//! SQL for the `waste` table.
//!
//! All statements use `query_raw_params()` / `exec_raw()` with positional
//! `?` parameters. Row decoding goes through
//! [`moosicbox_json_utils::database::ToValue`].

use chrono::NaiveDate;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};
use waste_tracker_database_models::{DATE_FORMAT, LabelField, MonthKey, NewWasteRecord, WasteRecord};

use crate::StoreError;

const SELECT_COLUMNS: &str = "SELECT id, date, business, stream, quantity, notes FROM waste";

/// Inserts an already-validated record dated `date` and returns its id.
///
/// The insert is a single statement, so it either commits fully or not at
/// all.
///
/// # Errors
///
/// Returns [`StoreError`] if the insert fails or no id comes back.
pub async fn insert_record(
    db: &dyn Database,
    record: &NewWasteRecord,
    date: NaiveDate,
) -> Result<i64, StoreError> {
    let rows = db
        .query_raw_params(
            "INSERT INTO waste (date, business, stream, quantity, notes)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id",
            &[
                DatabaseValue::String(date.format(DATE_FORMAT).to_string()),
                DatabaseValue::String(record.business.clone()),
                DatabaseValue::String(record.stream.clone()),
                DatabaseValue::Real64(record.quantity),
                record
                    .notes
                    .as_ref()
                    .map_or(DatabaseValue::Null, |n| DatabaseValue::String(n.clone())),
            ],
        )
        .await?;

    let row = rows.first().ok_or_else(|| StoreError::Conversion {
        message: "Insert returned no id".to_string(),
    })?;

    row.to_value::<i64>("id").map_err(|e| conversion("id", e))
}

/// Records dated within `month`, ordered by date then id.
///
/// # Errors
///
/// Returns [`StoreError`] if the query fails or a row cannot be decoded.
pub async fn records_in_month(
    db: &dyn Database,
    month: MonthKey,
) -> Result<Vec<WasteRecord>, StoreError> {
    let rows = db
        .query_raw_params(
            &format!("{SELECT_COLUMNS} WHERE substr(date, 1, 7) = ? ORDER BY date ASC, id ASC"),
            &[DatabaseValue::String(month.to_string())],
        )
        .await?;

    rows.iter().map(row_to_record).collect()
}

/// Every record, ordered by date then id, or by id alone.
///
/// # Errors
///
/// Returns [`StoreError`] if the query fails or a row cannot be decoded.
pub async fn all_records(
    db: &dyn Database,
    order_by_date: bool,
) -> Result<Vec<WasteRecord>, StoreError> {
    let order = if order_by_date {
        "date ASC, id ASC"
    } else {
        "id ASC"
    };

    let rows = db
        .query_raw_params(&format!("{SELECT_COLUMNS} ORDER BY {order}"), &[])
        .await?;

    rows.iter().map(row_to_record).collect()
}

/// Distinct values ever stored in a label column, sorted ascending.
///
/// # Errors
///
/// Returns [`StoreError`] if the query fails.
pub async fn distinct_values(
    db: &dyn Database,
    field: LabelField,
) -> Result<Vec<String>, StoreError> {
    let column = field.as_ref();
    let rows = db
        .query_raw_params(
            &format!("SELECT DISTINCT {column} AS value FROM waste ORDER BY value ASC"),
            &[],
        )
        .await?;

    rows.iter()
        .map(|row| row.to_value::<String>("value").map_err(|e| conversion(column, e)))
        .collect()
}

/// Number of stored records.
///
/// # Errors
///
/// Returns [`StoreError`] if the query fails.
pub async fn count_records(db: &dyn Database) -> Result<i64, StoreError> {
    let rows = db
        .query_raw_params("SELECT COUNT(*) AS count FROM waste", &[])
        .await?;

    rows.first()
        .map_or(Ok(0), |row| row.to_value::<i64>("count").map_err(|e| conversion("count", e)))
}

fn row_to_record(row: &Row) -> Result<WasteRecord, StoreError> {
    let date: String = row.to_value("date").map_err(|e| conversion("date", e))?;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|e| StoreError::Conversion {
        message: format!("Invalid stored date '{date}': {e}"),
    })?;

    Ok(WasteRecord {
        id: row.to_value("id").map_err(|e| conversion("id", e))?,
        date,
        business: row.to_value("business").map_err(|e| conversion("business", e))?,
        stream: row.to_value("stream").map_err(|e| conversion("stream", e))?,
        quantity: row.to_value("quantity").map_err(|e| conversion("quantity", e))?,
        notes: row.to_value("notes").map_err(|e| conversion("notes", e))?,
    })
}

fn conversion(column: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Conversion {
        message: format!("Failed to read column '{column}': {e}"),
    }
}
