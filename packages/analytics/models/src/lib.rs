#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Monthly summary types for the waste tracker reporting engine.
//!
//! A [`MonthlySummary`] is derived on demand from the records of a single
//! calendar month and is never persisted. [`SummaryOptions`] carries the
//! configured limit, warning threshold, and optional fixed label lists.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use waste_tracker_database_models::{MonthKey, WasteRecord};

/// Default monthly mass limit in kilograms.
pub const DEFAULT_LIMIT_KG: f64 = 1000.0;

/// Default fraction of the limit above which a warning is raised.
pub const DEFAULT_WARNING_FRACTION: f64 = 0.8;

/// Default number of recent entries listed in a summary.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Knobs for computing a [`MonthlySummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryOptions {
    /// Monthly mass limit in kilograms.
    pub limit_kg: f64,
    /// Fraction of the limit above which `over_limit_warning` is set.
    pub warning_fraction: f64,
    /// How many of the most recently inserted records to list.
    pub recent_limit: usize,
    /// Cap `usage_percent` at 100.
    pub clamp_usage_percent: bool,
    /// Fixed business list; every entry appears in the totals, zero-filled.
    pub businesses: Option<Vec<String>>,
    /// Fixed stream list; every entry appears in the totals, zero-filled.
    pub streams: Option<Vec<String>>,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            limit_kg: DEFAULT_LIMIT_KG,
            warning_fraction: DEFAULT_WARNING_FRACTION,
            recent_limit: DEFAULT_RECENT_LIMIT,
            clamp_usage_percent: true,
            businesses: None,
            streams: None,
        }
    }
}

impl SummaryOptions {
    /// Options with the given limit and warning fraction, other fields
    /// defaulted.
    #[must_use]
    pub fn with_limit(limit_kg: f64, warning_fraction: f64) -> Self {
        Self {
            limit_kg,
            warning_fraction,
            ..Self::default()
        }
    }
}

/// Total quantity disposed on one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// The day.
    pub date: NaiveDate,
    /// Summed kilograms for that day.
    pub quantity: f64,
}

/// Summed quantity for one (business, stream) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessStreamTotal {
    /// Business label.
    pub business: String,
    /// Stream label.
    pub stream: String,
    /// Summed kilograms.
    pub quantity: f64,
}

/// Aggregate view of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    /// The month summarized.
    pub month: MonthKey,
    /// Number of records in the month.
    pub record_count: usize,
    /// Sum of all quantities in the month.
    pub total_quantity: f64,
    /// Summed quantity per business.
    pub totals_by_business: BTreeMap<String, f64>,
    /// Summed quantity per stream.
    pub totals_by_stream: BTreeMap<String, f64>,
    /// Summed quantity per observed (business, stream) pair, sorted by
    /// business then stream.
    pub totals_by_business_stream: Vec<BusinessStreamTotal>,
    /// One point per distinct date, ascending.
    pub trend_by_date: Vec<TrendPoint>,
    /// Most recently inserted records of the month, newest first.
    pub recent_entries: Vec<WasteRecord>,
    /// Total as a percentage of the limit.
    pub usage_percent: f64,
    /// Whether the total exceeds the warning threshold.
    pub over_limit_warning: bool,
    /// Limit the percentage was computed against.
    pub limit_kg: f64,
    /// Warning threshold fraction used.
    pub warning_fraction: f64,
}

impl MonthlySummary {
    /// The mass at which the warning triggers.
    #[must_use]
    pub fn warning_threshold_kg(&self) -> f64 {
        self.limit_kg * self.warning_fraction
    }

    /// Kilograms left before the limit is reached, never negative.
    #[must_use]
    pub fn remaining_kg(&self) -> f64 {
        (self.limit_kg - self.total_quantity).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_site_limits() {
        let options = SummaryOptions::default();
        assert!((options.limit_kg - 1000.0).abs() < f64::EPSILON);
        assert!((options.warning_fraction - 0.8).abs() < f64::EPSILON);
        assert_eq!(options.recent_limit, 10);
        assert!(options.clamp_usage_percent);
    }

    #[test]
    fn summary_serializes_camel_case() {
        let summary = MonthlySummary {
            month: MonthKey::new(2024, 6).unwrap(),
            record_count: 0,
            total_quantity: 0.0,
            totals_by_business: BTreeMap::new(),
            totals_by_stream: BTreeMap::new(),
            totals_by_business_stream: Vec::new(),
            trend_by_date: Vec::new(),
            recent_entries: Vec::new(),
            usage_percent: 0.0,
            over_limit_warning: false,
            limit_kg: 1000.0,
            warning_fraction: 0.8,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["month"], "2024-06");
        assert!(json.get("totalsByBusiness").is_some());
        assert!(json.get("overLimitWarning").is_some());
        assert_eq!(json["totalsByBusinessStream"], serde_json::json!([]));
        assert!((summary.warning_threshold_kg() - 800.0).abs() < 1e-9);
        assert!((summary.remaining_kg() - 1000.0).abs() < f64::EPSILON);
    }
}
