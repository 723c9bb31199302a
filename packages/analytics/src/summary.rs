//! Per-month aggregation.
//!
//! Totals (overall, per label, per business and stream pair), the per-day
//! trend, and the recent-entry list are computed in a single pass over the
//! month's rows.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use waste_tracker_analytics_models::{
    BusinessStreamTotal, MonthlySummary, SummaryOptions, TrendPoint,
};
use waste_tracker_database::{Calendar, RecordStore};
use waste_tracker_database_models::{MonthKey, WasteRecord};

use crate::AnalyticsError;

/// The month containing today, per the calendar's configured offset.
#[must_use]
pub fn current_month_key(calendar: &Calendar) -> MonthKey {
    calendar.current_month()
}

/// Fetches `month` from the store and summarizes it.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store query fails.
pub async fn summarize(
    store: &RecordStore,
    month: MonthKey,
    options: &SummaryOptions,
) -> Result<MonthlySummary, AnalyticsError> {
    let records = store.query_by_month(month).await?;
    log::debug!("Summarizing {} records for {month}", records.len());
    Ok(compute_summary(month, &records, options))
}

/// Aggregates the records of `month`.
///
/// Records outside `month` are ignored, so callers may pass a wider slice.
#[must_use]
pub fn compute_summary(
    month: MonthKey,
    records: &[WasteRecord],
    options: &SummaryOptions,
) -> MonthlySummary {
    let in_month: Vec<&WasteRecord> = records.iter().filter(|r| month.contains(r.date)).collect();

    let mut totals_by_business = zero_filled(options.businesses.as_deref());
    let mut totals_by_stream = zero_filled(options.streams.as_deref());
    let mut by_pair: BTreeMap<(String, String), f64> = BTreeMap::new();
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut total_quantity = 0.0;

    for record in &in_month {
        total_quantity += record.quantity;
        *totals_by_business
            .entry(record.business.clone())
            .or_insert(0.0) += record.quantity;
        *totals_by_stream.entry(record.stream.clone()).or_insert(0.0) += record.quantity;
        *by_pair
            .entry((record.business.clone(), record.stream.clone()))
            .or_insert(0.0) += record.quantity;
        *by_date.entry(record.date).or_insert(0.0) += record.quantity;
    }

    let totals_by_business_stream = by_pair
        .into_iter()
        .map(|((business, stream), quantity)| BusinessStreamTotal {
            business,
            stream,
            quantity,
        })
        .collect();

    let trend_by_date = by_date
        .into_iter()
        .map(|(date, quantity)| TrendPoint { date, quantity })
        .collect();

    let mut recent_entries: Vec<WasteRecord> = in_month.iter().map(|r| (*r).clone()).collect();
    recent_entries.sort_by(|a, b| b.id.cmp(&a.id));
    recent_entries.truncate(options.recent_limit);

    MonthlySummary {
        month,
        record_count: in_month.len(),
        total_quantity,
        totals_by_business,
        totals_by_stream,
        totals_by_business_stream,
        trend_by_date,
        recent_entries,
        usage_percent: usage_percent(total_quantity, options),
        over_limit_warning: total_quantity > options.limit_kg * options.warning_fraction,
        limit_kg: options.limit_kg,
        warning_fraction: options.warning_fraction,
    }
}

fn zero_filled(labels: Option<&[String]>) -> BTreeMap<String, f64> {
    labels
        .unwrap_or_default()
        .iter()
        .map(|label| (label.clone(), 0.0))
        .collect()
}

fn usage_percent(total: f64, options: &SummaryOptions) -> f64 {
    if options.limit_kg <= 0.0 {
        return 0.0;
    }

    let percent = total * 100.0 / options.limit_kg;
    if options.clamp_usage_percent {
        percent.min(100.0)
    } else {
        percent
    }
}
