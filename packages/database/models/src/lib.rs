#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Waste record types and input validation.
//!
//! These types represent the shapes of data as stored in and retrieved from
//! the `SQLite` waste log. Raw inbound fields arrive as a
//! [`WasteEntryInput`], are coerced and validated into a
//! [`NewWasteRecord`], and come back from the store as a [`WasteRecord`]
//! with an assigned id.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Date format used for stored and inbound dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A field of a waste record, used to identify validation failures.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecordField {
    /// Date the disposal occurred.
    Date,
    /// Originating business unit.
    Business,
    /// Waste stream / category.
    Stream,
    /// Mass in kilograms.
    Quantity,
    /// Free-text annotation.
    Notes,
}

/// A free-text label column that can be listed with its distinct values.
///
/// The `AsRef<str>` form is the column name in the `waste` table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LabelField {
    /// The `business` column.
    Business,
    /// The `stream` column.
    Stream,
}

impl From<LabelField> for RecordField {
    fn from(value: LabelField) -> Self {
        match value {
            LabelField::Business => Self::Business,
            LabelField::Stream => Self::Stream,
        }
    }
}

/// Rejection of an inbound field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was missing or blank.
    #[error("{field} must not be empty")]
    Empty {
        /// The offending field.
        field: RecordField,
    },

    /// A numeric field could not be parsed, or was not finite.
    #[error("{field} must be a number, got '{value}'")]
    InvalidNumber {
        /// The offending field.
        field: RecordField,
        /// The rejected input.
        value: String,
    },

    /// A numeric field was below zero.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// The offending field.
        field: RecordField,
        /// The rejected value.
        value: f64,
    },

    /// The date was not a valid `YYYY-MM-DD` calendar date.
    #[error("date must be formatted as YYYY-MM-DD, got '{value}'")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },
}

impl ValidationError {
    /// Returns the field that failed validation.
    #[must_use]
    pub const fn field(&self) -> RecordField {
        match self {
            Self::Empty { field }
            | Self::InvalidNumber { field, .. }
            | Self::Negative { field, .. } => *field,
            Self::InvalidDate { .. } => RecordField::Date,
        }
    }
}

// ---------------------------------------------------------------------------
// Month keys
// ---------------------------------------------------------------------------

/// A calendar month, formatted as `YYYY-MM`.
///
/// Internally this is the first day of the month, so every `MonthKey` is a
/// real calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey(NaiveDate);

/// Error returned when a string is not a valid `YYYY-MM` month.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month '{value}': expected YYYY-MM")]
pub struct MonthKeyError {
    /// The rejected input.
    pub value: String,
}

impl MonthKey {
    /// Creates a month key from a year and a 1-based month.
    ///
    /// # Errors
    ///
    /// Returns [`MonthKeyError`] if `month` is not in `1..=12` or the year is
    /// out of range.
    pub fn new(year: i32, month: u32) -> Result<Self, MonthKeyError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| MonthKeyError {
                value: format!("{year:04}-{month:02}"),
            })
    }

    /// Returns the month containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    /// Calendar year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// 1-based month number.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// The first day of this month.
    #[must_use]
    pub const fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Whether `date` falls within this month.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MonthKeyError {
            value: s.to_string(),
        };

        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }

        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;

        Self::new(year, month).map_err(|_| err())
    }
}

impl TryFrom<String> for MonthKey {
    type Error = MonthKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A stored waste-disposal event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteRecord {
    /// Primary key, assigned on insert.
    pub id: i64,
    /// Date the disposal occurred.
    pub date: NaiveDate,
    /// Originating business unit.
    pub business: String,
    /// Waste stream / category (e.g. solvent type).
    pub stream: String,
    /// Mass in kilograms.
    pub quantity: f64,
    /// Optional free-text annotation.
    pub notes: Option<String>,
}

/// A waste record that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWasteRecord {
    /// Date the disposal occurred. `None` means "today".
    pub date: Option<NaiveDate>,
    /// Originating business unit.
    pub business: String,
    /// Waste stream / category.
    pub stream: String,
    /// Mass in kilograms.
    pub quantity: f64,
    /// Optional free-text annotation.
    pub notes: Option<String>,
}

impl NewWasteRecord {
    /// Creates a candidate record without a date or notes.
    #[must_use]
    pub fn new(business: impl Into<String>, stream: impl Into<String>, quantity: f64) -> Self {
        Self {
            date: None,
            business: business.into(),
            stream: stream.into(),
            quantity,
            notes: None,
        }
    }

    /// Sets the disposal date.
    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Coerces raw inbound fields into a validated candidate record.
    ///
    /// A blank or missing `date` stays `None` so the store can apply its own
    /// notion of "today".
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming the first field that is blank,
    /// unparseable, or out of range.
    pub fn parse(input: &WasteEntryInput) -> Result<Self, ValidationError> {
        let date = match input.date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
                ValidationError::InvalidDate {
                    value: raw.to_string(),
                }
            })?),
        };

        let raw_quantity = input.quantity.trim();
        if raw_quantity.is_empty() {
            return Err(ValidationError::Empty {
                field: RecordField::Quantity,
            });
        }
        let quantity: f64 = raw_quantity
            .parse()
            .map_err(|_| ValidationError::InvalidNumber {
                field: RecordField::Quantity,
                value: raw_quantity.to_string(),
            })?;

        Self {
            date,
            business: input.business.clone(),
            stream: input.stream.clone(),
            quantity,
            notes: input.notes.clone(),
        }
        .validate()
    }

    /// Checks the invariants of a storable record and normalizes it.
    ///
    /// Labels are trimmed, blank notes become `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if `business` or `stream` is blank,
    /// `quantity` is negative or not finite, or the date's year does not fit
    /// in four digits.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let business = non_empty(&self.business, RecordField::Business)?;
        let stream = non_empty(&self.stream, RecordField::Stream)?;

        // Stored dates must stay `YYYY-MM-DD` so month filtering sees them.
        if let Some(date) = self.date
            && !(0..=9999).contains(&date.year())
        {
            return Err(ValidationError::InvalidDate {
                value: date.format(DATE_FORMAT).to_string(),
            });
        }

        if !self.quantity.is_finite() {
            return Err(ValidationError::InvalidNumber {
                field: RecordField::Quantity,
                value: self.quantity.to_string(),
            });
        }
        if self.quantity < 0.0 {
            return Err(ValidationError::Negative {
                field: RecordField::Quantity,
                value: self.quantity,
            });
        }

        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(ToString::to_string);

        Ok(Self {
            date: self.date,
            business,
            stream,
            // Folds `-0.0` into `0.0`.
            quantity: self.quantity + 0.0,
            notes,
        })
    }

    /// Attaches the assigned id and resolved date.
    #[must_use]
    pub fn into_record(self, id: i64, date: NaiveDate) -> WasteRecord {
        WasteRecord {
            id,
            date,
            business: self.business,
            stream: self.stream,
            quantity: self.quantity,
            notes: self.notes,
        }
    }
}

/// Trims `value` and rejects it if nothing is left.
fn non_empty(value: &str, field: RecordField) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_string())
}

/// Raw, untyped fields of a waste entry as submitted by a form or CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WasteEntryInput {
    /// `YYYY-MM-DD`, optional.
    pub date: Option<String>,
    /// Business label.
    pub business: String,
    /// Stream label.
    pub stream: String,
    /// Quantity in kilograms, as text.
    pub quantity: String,
    /// Optional notes.
    pub notes: Option<String>,
}
