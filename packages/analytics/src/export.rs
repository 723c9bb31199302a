//! CSV export of stored records.

use waste_tracker_database::RecordStore;
use waste_tracker_database_models::{MonthKey, WasteRecord};

use crate::AnalyticsError;

/// Header row of every export.
pub const EXPORT_HEADER: [&str; 5] = ["Date", "Business", "Stream", "Quantity (kg)", "Notes"];

/// Serializes the month's records, or every record when `month` is `None`,
/// ordered by date.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store query or serialization fails.
pub async fn export_rows(
    store: &RecordStore,
    month: Option<MonthKey>,
) -> Result<String, AnalyticsError> {
    let records = match month {
        Some(month) => store.query_by_month(month).await?,
        None => store.query_all(true).await?,
    };
    log::debug!("Exporting {} records", records.len());
    write_csv(&records)
}

/// Writes `records` as CSV with [`EXPORT_HEADER`].
///
/// Fields containing commas, quotes, or newlines are quoted.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if serialization fails.
pub fn write_csv(records: &[WasteRecord]) -> Result<String, AnalyticsError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;

    for record in records {
        writer.write_record([
            record.date.to_string().as_str(),
            record.business.as_str(),
            record.stream.as_str(),
            record.quantity.to_string().as_str(),
            record.notes.as_deref().unwrap_or_default(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Attachment filename: `waste.csv`, or `waste_<YYYY-MM>.csv` for a single
/// month.
#[must_use]
pub fn export_filename(month: Option<MonthKey>) -> String {
    month.map_or_else(|| "waste.csv".to_string(), |m| format!("waste_{m}.csv"))
}
