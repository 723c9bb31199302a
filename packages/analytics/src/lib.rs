#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Monthly reporting engine for the waste tracker.
//!
//! Reads from the [`RecordStore`](waste_tracker_database::RecordStore),
//! never writes to it. [`summary`] computes the per-month aggregate view;
//! [`export`] serializes stored rows to CSV.

pub mod export;
pub mod summary;

pub use export::{EXPORT_HEADER, export_filename, export_rows, write_csv};
pub use summary::{compute_summary, current_month_key, summarize};

use thiserror::Error;
use waste_tracker_database::StoreError;

/// Errors that can occur during reporting operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Reading from the record store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the CSV buffer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV output was not valid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
