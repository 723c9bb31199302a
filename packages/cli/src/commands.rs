//! Implementations of the non-interactive subcommands.

use std::fmt::Write as _;
use std::path::Path;

use waste_tracker_analytics::{export_filename, export_rows, summarize};
use waste_tracker_analytics_models::{MonthlySummary, SummaryOptions};
use waste_tracker_database::RecordStore;
use waste_tracker_database_models::{MonthKey, WasteEntryInput, WasteRecord};

/// Stores one entry and returns it with its assigned id.
///
/// # Errors
///
/// Returns an error if the entry is invalid or cannot be stored.
pub async fn add(
    store: &RecordStore,
    input: &WasteEntryInput,
) -> Result<WasteRecord, Box<dyn std::error::Error>> {
    let record = store.insert_input(input).await?;
    log::info!(
        "Recorded {} kg of {} for {} on {} (id {})",
        record.quantity,
        record.stream,
        record.business,
        record.date,
        record.id
    );
    Ok(record)
}

/// Summarizes `month`, defaulting to the store calendar's current month.
///
/// # Errors
///
/// Returns an error if `month` is malformed or the store query fails.
pub async fn summary(
    store: &RecordStore,
    month: Option<&str>,
    options: &SummaryOptions,
) -> Result<MonthlySummary, Box<dyn std::error::Error>> {
    let month = match month {
        Some(raw) => raw.parse::<MonthKey>()?,
        None => store.calendar().current_month(),
    };
    Ok(summarize(store, month, options).await?)
}

/// Writes the CSV export to `output`, or returns it when `output` is `None`.
///
/// # Errors
///
/// Returns an error if `month` is malformed, the export fails, or the file
/// cannot be written.
pub async fn export(
    store: &RecordStore,
    month: Option<&str>,
    output: Option<&Path>,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let month = month.map(str::parse::<MonthKey>).transpose()?;
    let csv = export_rows(store, month).await?;

    let Some(output) = output else {
        return Ok(Some(csv));
    };

    let path = if output.is_dir() {
        output.join(export_filename(month))
    } else {
        output.to_path_buf()
    };
    std::fs::write(&path, csv)?;
    log::info!("Wrote {}", path.display());

    Ok(None)
}

/// Renders a summary as a plain-text report.
#[must_use]
pub fn render_summary(summary: &MonthlySummary) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Waste summary for {}", summary.month);
    let _ = writeln!(out, "{}", "-".repeat(50));
    let _ = writeln!(
        out,
        "Total: {:.2} kg in {} entries ({:.1}% of {} kg limit)",
        summary.total_quantity, summary.record_count, summary.usage_percent, summary.limit_kg
    );
    if summary.over_limit_warning {
        let _ = writeln!(
            out,
            "WARNING: above {:.0}% of the monthly limit",
            summary.warning_fraction * 100.0
        );
    }

    write_totals(&mut out, "By business", &summary.totals_by_business);
    write_totals(&mut out, "By stream", &summary.totals_by_stream);

    if !summary.totals_by_business_stream.is_empty() {
        let _ = writeln!(out, "\nBy business and stream");
        for total in &summary.totals_by_business_stream {
            let _ = writeln!(
                out,
                "  {:<20} {:<20} {:>10.2}",
                total.business, total.stream, total.quantity
            );
        }
    }

    if !summary.trend_by_date.is_empty() {
        let _ = writeln!(out, "\nBy date");
        for point in &summary.trend_by_date {
            let _ = writeln!(out, "  {:<20} {:>10.2}", point.date, point.quantity);
        }
    }

    if !summary.recent_entries.is_empty() {
        let _ = writeln!(out, "\nRecent entries");
        for record in &summary.recent_entries {
            let _ = writeln!(
                out,
                "  #{:<5} {} {:<12} {:<12} {:>10.2}  {}",
                record.id,
                record.date,
                record.business,
                record.stream,
                record.quantity,
                record.notes.as_deref().unwrap_or_default()
            );
        }
    }

    out
}

fn write_totals<'a>(
    out: &mut String,
    title: &str,
    totals: impl IntoIterator<Item = (&'a String, &'a f64)>,
) {
    let _ = writeln!(out, "\n{title}");
    for (label, quantity) in totals {
        let _ = writeln!(out, "  {label:<20} {quantity:>10.2}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use waste_tracker_database::Calendar;

    async fn test_store(name: &str) -> RecordStore {
        let path = std::env::temp_dir()
            .join(format!("waste_tracker_cli_{name}_{}", std::process::id()))
            .join("waste.db");
        let _ = std::fs::remove_file(&path);
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        RecordStore::open_with_calendar(&path, Calendar::fixed(today))
            .await
            .unwrap()
    }

    fn entry(business: &str, stream: &str, quantity: &str) -> WasteEntryInput {
        WasteEntryInput {
            date: None,
            business: business.to_string(),
            stream: stream.to_string(),
            quantity: quantity.to_string(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn add_then_summarize_current_month() {
        let store = test_store("summary").await;
        add(&store, &entry("DAB", "ACN", "50")).await.unwrap();
        add(&store, &entry("DAB", "DCM", "30")).await.unwrap();

        let summary = summary(&store, None, &SummaryOptions::default())
            .await
            .unwrap();
        assert_eq!(summary.month.to_string(), "2024-06");
        assert!((summary.total_quantity - 80.0).abs() < 1e-9);

        let report = render_summary(&summary);
        assert!(report.contains("Waste summary for 2024-06"));
        assert!(report.contains("8.0% of 1000 kg limit"));
        assert!(report.contains("By business and stream"));
        assert!(report.contains(&format!("  {:<20} {:<20} {:>10.2}", "DAB", "ACN", 50.0)));
        assert!(!report.contains("WARNING"));
    }

    #[tokio::test]
    async fn add_rejects_bad_quantity() {
        let store = test_store("bad_quantity").await;
        assert!(add(&store, &entry("DAB", "ACN", "lots")).await.is_err());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn summary_rejects_malformed_month() {
        let store = test_store("bad_month").await;
        assert!(
            summary(&store, Some("2024-6"), &SummaryOptions::default())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn export_to_directory_uses_month_filename() {
        let store = test_store("export_dir").await;
        add(&store, &entry("DAB", "ACN", "5")).await.unwrap();

        let dir = std::env::temp_dir().join(format!(
            "waste_tracker_cli_export_out_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();

        let returned = export(&store, Some("2024-06"), Some(dir.as_path())).await.unwrap();
        assert!(returned.is_none());

        let written = std::fs::read_to_string(dir.join("waste_2024-06.csv")).unwrap();
        assert!(written.starts_with("Date,Business,Stream,Quantity (kg),Notes\n"));
        assert!(written.contains("2024-06-15,DAB,ACN,5,"));
    }

    #[tokio::test]
    async fn export_without_output_returns_text() {
        let store = test_store("export_stdout").await;
        let csv = export(&store, None, None).await.unwrap().unwrap();
        assert_eq!(csv, "Date,Business,Stream,Quantity (kg),Notes\n");
    }
}
