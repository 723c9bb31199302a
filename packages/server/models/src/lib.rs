#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the waste tracker server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the database row types to allow independent evolution of the API
//! contract.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use waste_tracker_analytics_models::MonthlySummary;
use waste_tracker_database_models::{MonthKey, RecordField, WasteEntryInput, WasteRecord};

/// A waste record as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiWasteRecord {
    /// Record ID.
    pub id: i64,
    /// Disposal date (`YYYY-MM-DD`).
    pub date: NaiveDate,
    /// Business label.
    pub business: String,
    /// Stream label.
    pub stream: String,
    /// Kilograms.
    pub quantity: f64,
    /// Notes, if any.
    pub notes: Option<String>,
}

impl From<WasteRecord> for ApiWasteRecord {
    fn from(record: WasteRecord) -> Self {
        Self {
            id: record.id,
            date: record.date,
            business: record.business,
            stream: record.stream,
            quantity: record.quantity,
            notes: record.notes,
        }
    }
}

/// A submitted entry, from an HTML form or a JSON body.
///
/// Every field is optional at the deserialization level so that a missing
/// field reaches validation and is reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EntryForm {
    /// `YYYY-MM-DD`; blank means today.
    pub date: Option<String>,
    /// Business label.
    pub business: String,
    /// Stream label.
    pub stream: String,
    /// Kilograms, as text or a JSON number.
    #[serde(deserialize_with = "text_or_number")]
    pub quantity: String,
    /// Optional notes.
    pub notes: Option<String>,
}

impl From<EntryForm> for WasteEntryInput {
    fn from(form: EntryForm) -> Self {
        Self {
            date: form.date,
            business: form.business,
            stream: form.stream,
            quantity: form.quantity,
            notes: form.notes,
        }
    }
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

/// Query parameters selecting a month.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthQueryParams {
    /// `YYYY-MM`; defaults to the current month.
    pub month: Option<String>,
}

/// Selectable labels for the entry form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOptions {
    /// Business labels.
    pub businesses: Vec<String>,
    /// Stream labels.
    pub streams: Vec<String>,
}

/// Everything the summary page needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSummaryView {
    /// The month shown.
    pub month: MonthKey,
    /// Today's date, the default for new entries.
    pub today: NaiveDate,
    /// Aggregates for the month.
    pub summary: MonthlySummary,
    /// The month's records, by date.
    pub records: Vec<ApiWasteRecord>,
    /// Labels for the entry form.
    pub options: ApiOptions,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body returned for failed requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
    /// The rejected input field, for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<RecordField>,
}

impl ApiError {
    /// An error not tied to a field.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            field: None,
        }
    }

    /// An error about a specific input field.
    #[must_use]
    pub fn for_field(error: impl Into<String>, field: RecordField) -> Self {
        Self {
            error: error.into(),
            field: Some(field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_form_accepts_numeric_quantity() {
        let form: EntryForm = serde_json::from_str(
            r#"{"business":"DAB","stream":"ACN","quantity":12.5,"date":"2024-06-01"}"#,
        )
        .unwrap();
        assert_eq!(form.quantity, "12.5");

        let form: EntryForm =
            serde_json::from_str(r#"{"business":"DAB","stream":"ACN","quantity":"7"}"#).unwrap();
        assert_eq!(form.quantity, "7");
        assert_eq!(form.date, None);
    }

    #[test]
    fn entry_form_tolerates_missing_fields() {
        let form: EntryForm = serde_json::from_str(r#"{"stream":"ACN"}"#).unwrap();
        let input = WasteEntryInput::from(form);
        assert!(input.business.is_empty());
        assert!(input.quantity.is_empty());
    }

    #[test]
    fn api_error_omits_missing_field() {
        let json = serde_json::to_value(ApiError::new("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"error": "boom"}));

        let json =
            serde_json::to_value(ApiError::for_field("bad", RecordField::Quantity)).unwrap();
        assert_eq!(json, serde_json::json!({"error": "bad", "field": "quantity"}));
    }
}
