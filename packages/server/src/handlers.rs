//! HTTP handler functions for the waste tracker API.

use actix_web::{HttpResponse, http::header, web};
use waste_tracker_analytics::{compute_summary, export_filename, export_rows};
use waste_tracker_analytics_models::SummaryOptions;
use waste_tracker_database::{RecordStore, StoreError};
use waste_tracker_database_models::{LabelField, MonthKey, WasteEntryInput};
use waste_tracker_server_models::{
    ApiError, ApiHealth, ApiOptions, ApiSummaryView, ApiWasteRecord, EntryForm, MonthQueryParams,
};

use crate::AppState;

/// Where a successful form submission is redirected.
pub const SUMMARY_PATH: &str = "/api/summary";

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/summary`
///
/// Returns the month's aggregates, its records, and the entry form options.
/// Defaults to the current month.
pub async fn summary(
    state: web::Data<AppState>,
    params: web::Query<MonthQueryParams>,
) -> HttpResponse {
    let month = match resolve_month(&state, params.month.as_deref()) {
        Ok(month) => month,
        Err(response) => return response,
    };

    let records = match state.store.query_by_month(month).await {
        Ok(records) => records,
        Err(e) => return store_error("query records", &e),
    };

    let options = match label_options(&state.store, &state.summary_options).await {
        Ok(options) => options,
        Err(e) => return store_error("list options", &e),
    };

    let summary = compute_summary(month, &records, &state.summary_options);

    HttpResponse::Ok().json(ApiSummaryView {
        month,
        today: state.store.calendar().today(),
        summary,
        records: records.into_iter().map(ApiWasteRecord::from).collect(),
        options,
    })
}

/// `GET /api/options`
///
/// Lists the business and stream labels offered by the entry form.
pub async fn options(state: web::Data<AppState>) -> HttpResponse {
    match label_options(&state.store, &state.summary_options).await {
        Ok(options) => HttpResponse::Ok().json(options),
        Err(e) => store_error("list options", &e),
    }
}

/// `POST /entries`
///
/// Stores a form submission and redirects to the summary.
pub async fn create_entry_form(
    state: web::Data<AppState>,
    form: web::Form<EntryForm>,
) -> HttpResponse {
    let input = WasteEntryInput::from(form.into_inner());
    match state.store.insert_input(&input).await {
        Ok(record) => {
            log::info!("Recorded entry {} ({} kg)", record.id, record.quantity);
            HttpResponse::SeeOther()
                .insert_header((header::LOCATION, SUMMARY_PATH))
                .finish()
        }
        Err(e) => store_error("insert entry", &e),
    }
}

/// `POST /api/entries`
///
/// Stores a JSON entry and returns it with its assigned id.
pub async fn create_entry_json(
    state: web::Data<AppState>,
    body: web::Json<EntryForm>,
) -> HttpResponse {
    let input = WasteEntryInput::from(body.into_inner());
    match state.store.insert_input(&input).await {
        Ok(record) => {
            log::info!("Recorded entry {} ({} kg)", record.id, record.quantity);
            HttpResponse::Created().json(ApiWasteRecord::from(record))
        }
        Err(e) => store_error("insert entry", &e),
    }
}

/// `GET /export.csv`
///
/// Downloads every record, or one month's records with `?month=YYYY-MM`.
pub async fn export_csv(
    state: web::Data<AppState>,
    params: web::Query<MonthQueryParams>,
) -> HttpResponse {
    let month = match month_param(params.month.as_deref()).map(str::parse::<MonthKey>) {
        None => None,
        Some(Ok(month)) => Some(month),
        Some(Err(e)) => return HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
    };

    match export_rows(&state.store, month).await {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export_filename(month)),
            ))
            .body(body),
        Err(e) => {
            log::error!("Failed to export records: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to export records"))
        }
    }
}

/// Parses `?month=`, defaulting to the store calendar's current month.
fn resolve_month(state: &AppState, raw: Option<&str>) -> Result<MonthKey, HttpResponse> {
    match month_param(raw) {
        None => Ok(state.store.calendar().current_month()),
        Some(raw) => raw
            .parse()
            .map_err(|e: waste_tracker_database_models::MonthKeyError| {
                HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
            }),
    }
}

/// A trimmed `?month=` value; blank counts as absent.
fn month_param(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|m| !m.is_empty())
}

/// Configured label lists, falling back to the values already stored.
///
/// # Errors
///
/// Returns [`StoreError`] if the distinct-value query fails.
pub async fn label_options(
    store: &RecordStore,
    options: &SummaryOptions,
) -> Result<ApiOptions, StoreError> {
    let businesses = match &options.businesses {
        Some(list) => list.clone(),
        None => store.distinct_values(LabelField::Business).await?,
    };
    let streams = match &options.streams {
        Some(list) => list.clone(),
        None => store.distinct_values(LabelField::Stream).await?,
    };

    Ok(ApiOptions {
        businesses,
        streams,
    })
}

/// Maps a store failure to a response: validation to 422, the rest to 500.
fn store_error(action: &str, e: &StoreError) -> HttpResponse {
    if let Some(validation) = e.as_validation() {
        log::warn!("Rejected entry: {validation}");
        return HttpResponse::UnprocessableEntity()
            .json(ApiError::for_field(validation.to_string(), validation.field()));
    }

    log::error!("Failed to {action}: {e}");
    HttpResponse::InternalServerError().json(ApiError::new(format!("Failed to {action}")))
}
