#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Record store for waste-disposal events.
//!
//! A single `SQLite` file (via `switchy_database`) holds one append-only
//! `waste` table. [`RecordStore`] owns the connection, validates and inserts
//! records, and serves the month-filtered and full listings that the
//! reporting engine and CSV export read from.

pub mod clock;
pub mod config;
pub mod db;
pub mod queries;

use std::path::{Path, PathBuf};

use switchy_database::Database;
use waste_tracker_database_models::{
    LabelField, MonthKey, NewWasteRecord, ValidationError, WasteEntryInput, WasteRecord,
};

pub use clock::{Calendar, Clock, FixedClock, SystemClock};
pub use config::{ConfigError, StoreConfig};

/// Errors that can occur during record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record was rejected before anything was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The database file could not be opened.
    #[error("Failed to open database at {}: {message}", .path.display())]
    Open {
        /// Location that was being opened.
        path: PathBuf,
        /// Underlying driver message.
        message: String,
    },

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// An I/O operation failed (e.g., creating the database directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// The validation failure, if this error is one.
    #[must_use]
    pub const fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }
}

/// Durable, append-only storage of [`WasteRecord`]s.
///
/// Owns one managed `SQLite` connection for its whole lifetime. Inserts are
/// single statements and are committed before they return.
pub struct RecordStore {
    db: Box<dyn Database>,
    calendar: Calendar,
    path: Option<PathBuf>,
}

impl RecordStore {
    /// Opens (or creates) the store described by `config` and ensures the
    /// schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or the schema
    /// DDL fails.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::open_with_calendar(&config.db_path, Calendar::system(config.utc_offset)).await
    }

    /// Opens the store at `path` with an explicit calendar.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or the schema
    /// DDL fails.
    pub async fn open_with_calendar(path: &Path, calendar: Calendar) -> Result<Self, StoreError> {
        log::debug!("Opening waste database at {}", path.display());
        let db = db::open(path)?;
        let store = Self {
            db,
            calendar,
            path: Some(path.to_path_buf()),
        };
        store.initialize().await?;
        Ok(store)
    }

    /// Wraps an already-open connection and ensures the schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the schema DDL fails.
    pub async fn from_database(db: Box<dyn Database>, calendar: Calendar) -> Result<Self, StoreError> {
        let store = Self {
            db,
            calendar,
            path: None,
        };
        store.initialize().await?;
        Ok(store)
    }

    /// Ensures the `waste` table exists. Safe to call any number of times.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the schema DDL fails.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        db::ensure_schema(self.db.as_ref()).await
    }

    /// The calendar used for defaulting dates.
    #[must_use]
    pub const fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Location of the backing file, if opened from a path.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The underlying connection.
    #[must_use]
    pub fn database(&self) -> &dyn Database {
        self.db.as_ref()
    }

    /// Validates and stores `record`, returning it with its assigned id.
    ///
    /// A missing date becomes today's date per [`Self::calendar`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] (and writes nothing) if a field is
    /// invalid, or another [`StoreError`] if the insert fails.
    pub async fn insert(&self, record: NewWasteRecord) -> Result<WasteRecord, StoreError> {
        let record = record.validate()?;
        let date = record.date.unwrap_or_else(|| self.calendar.today());

        let id = queries::insert_record(self.db.as_ref(), &record, date).await?;
        log::debug!(
            "Inserted waste record {id}: {date} {} / {} {} kg",
            record.business,
            record.stream,
            record.quantity
        );

        Ok(record.into_record(id, date))
    }

    /// Coerces raw inbound fields and stores the result.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if a field cannot be coerced, or
    /// any error from [`Self::insert`].
    pub async fn insert_input(&self, input: &WasteEntryInput) -> Result<WasteRecord, StoreError> {
        self.insert(NewWasteRecord::parse(input)?).await
    }

    /// Records dated within `month`, ordered by date then insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    pub async fn query_by_month(&self, month: MonthKey) -> Result<Vec<WasteRecord>, StoreError> {
        queries::records_in_month(self.db.as_ref(), month).await
    }

    /// Every stored record, by date (ties by insertion order) or by
    /// insertion order alone.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    pub async fn query_all(&self, order_by_date: bool) -> Result<Vec<WasteRecord>, StoreError> {
        queries::all_records(self.db.as_ref(), order_by_date).await
    }

    /// Distinct values ever stored for `field`, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    pub async fn distinct_values(&self, field: LabelField) -> Result<Vec<String>, StoreError> {
        queries::distinct_values(self.db.as_ref(), field).await
    }

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    pub async fn count(&self) -> Result<i64, StoreError> {
        queries::count_records(self.db.as_ref()).await
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("path", &self.path)
            .field("calendar", &self.calendar)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use waste_tracker_database_models::RecordField;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn test_store(name: &str, today: NaiveDate) -> RecordStore {
        let path = std::env::temp_dir()
            .join(format!("waste_tracker_store_{name}_{}", std::process::id()))
            .join("waste.db");
        let _ = std::fs::remove_file(&path);
        RecordStore::open_with_calendar(&path, Calendar::fixed(today))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_defaults_date() {
        let store = test_store("defaults", date(2024, 6, 15)).await;

        let first = store
            .insert(NewWasteRecord::new("DAB", "ACN", 50.0).with_date(date(2024, 6, 1)))
            .await
            .unwrap();
        let second = store
            .insert(NewWasteRecord::new(" DAB ", "DCM ", 30.0).with_notes("  "))
            .await
            .unwrap();

        assert!(second.id > first.id);
        assert_eq!(first.date, date(2024, 6, 1));
        assert_eq!(second.date, date(2024, 6, 15));
        assert_eq!(second.business, "DAB");
        assert_eq!(second.stream, "DCM");
        assert_eq!(second.notes, None);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let store = test_store("idempotent", date(2024, 6, 15)).await;
        store
            .insert(NewWasteRecord::new("DAB", "ACN", 1.0))
            .await
            .unwrap();

        store.initialize().await.unwrap();
        store.initialize().await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn reopening_keeps_records() {
        let path = std::env::temp_dir()
            .join(format!("waste_tracker_store_reopen_{}", std::process::id()))
            .join("waste.db");
        let _ = std::fs::remove_file(&path);

        {
            let store = RecordStore::open(&StoreConfig::new(&path)).await.unwrap();
            store
                .insert(
                    NewWasteRecord::new("DAB", "ACN", 5.0)
                        .with_date(date(2024, 6, 1))
                        .with_notes("first drum"),
                )
                .await
                .unwrap();
        }

        let store = RecordStore::open(&StoreConfig::new(&path)).await.unwrap();
        let all = store.query_all(true).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].notes.as_deref(), Some("first drum"));
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn open_fails_when_parent_is_a_file() {
        let blocker = std::env::temp_dir().join(format!(
            "waste_tracker_store_blocker_{}",
            std::process::id()
        ));
        std::fs::write(&blocker, b"not a directory").unwrap();
        let path = blocker.join("waste.db");

        let err = RecordStore::open(&StoreConfig::new(&path))
            .await
            .unwrap_err();

        assert!(
            matches!(&err, StoreError::Open { path: failed, .. } if failed == &path),
            "{err:?}"
        );
        assert!(err.to_string().contains(&path.display().to_string()), "{err}");
    }

    #[tokio::test]
    async fn negative_quantity_is_rejected_without_writing() {
        let store = test_store("negative", date(2024, 6, 15)).await;

        let err = store
            .insert(NewWasteRecord::new("DAB", "ACN", -5.0))
            .await
            .unwrap_err();

        assert_eq!(
            err.as_validation().map(ValidationError::field),
            Some(RecordField::Quantity)
        );
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_business_is_rejected_without_writing() {
        let store = test_store("empty_business", date(2024, 6, 15)).await;
        store
            .insert(NewWasteRecord::new("DAB", "ACN", 1.0))
            .await
            .unwrap();

        let err = store
            .insert(NewWasteRecord::new("", "ACN", 1.0))
            .await
            .unwrap_err();

        assert_eq!(
            err.as_validation().map(ValidationError::field),
            Some(RecordField::Business)
        );
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn insert_input_rejects_unparseable_quantity() {
        let store = test_store("bad_input", date(2024, 6, 15)).await;
        let input = WasteEntryInput {
            business: "DAB".to_string(),
            stream: "ACN".to_string(),
            quantity: "lots".to_string(),
            ..WasteEntryInput::default()
        };

        let err = store.insert_input(&input).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::InvalidNumber { .. })
        ));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn query_by_month_filters_and_orders() {
        let store = test_store("by_month", date(2024, 6, 15)).await;
        for (day, business, quantity) in [
            (date(2024, 6, 20), "DAB", 1.0),
            (date(2024, 5, 31), "DAB", 2.0),
            (date(2024, 6, 3), "PKP", 3.0),
            (date(2024, 7, 1), "DAB", 4.0),
            (date(2024, 6, 3), "DAB", 5.0),
        ] {
            store
                .insert(NewWasteRecord::new(business, "ACN", quantity).with_date(day))
                .await
                .unwrap();
        }

        let june = store
            .query_by_month("2024-06".parse().unwrap())
            .await
            .unwrap();

        let quantities: Vec<f64> = june.iter().map(|r| r.quantity).collect();
        assert_eq!(quantities, vec![3.0, 5.0, 1.0]);
        assert!(june.windows(2).all(|w| (w[0].date, w[0].id) < (w[1].date, w[1].id)));
    }

    #[tokio::test]
    async fn query_all_orders_by_date_or_id() {
        let store = test_store("all", date(2024, 6, 15)).await;
        store
            .insert(NewWasteRecord::new("DAB", "ACN", 1.0).with_date(date(2024, 7, 1)))
            .await
            .unwrap();
        store
            .insert(NewWasteRecord::new("DAB", "ACN", 2.0).with_date(date(2024, 5, 1)))
            .await
            .unwrap();

        let by_date: Vec<f64> = store
            .query_all(true)
            .await
            .unwrap()
            .iter()
            .map(|r| r.quantity)
            .collect();
        let by_id: Vec<f64> = store
            .query_all(false)
            .await
            .unwrap()
            .iter()
            .map(|r| r.quantity)
            .collect();

        assert_eq!(by_date, vec![2.0, 1.0]);
        assert_eq!(by_id, vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn distinct_values_lists_labels() {
        let store = test_store("distinct", date(2024, 6, 15)).await;
        for (business, stream) in [("PKP", "DCM"), ("DAB", "ACN"), ("DAB", "DCM")] {
            store
                .insert(NewWasteRecord::new(business, stream, 1.0))
                .await
                .unwrap();
        }

        assert_eq!(
            store.distinct_values(LabelField::Business).await.unwrap(),
            vec!["DAB".to_string(), "PKP".to_string()]
        );
        assert_eq!(
            store.distinct_values(LabelField::Stream).await.unwrap(),
            vec!["ACN".to_string(), "DCM".to_string()]
        );
    }
}
