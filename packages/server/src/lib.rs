#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the waste tracker.
//!
//! Accepts new waste entries (HTML form or JSON), serves the monthly
//! summary view model and the entry form options as JSON, and streams the
//! stored records as a CSV attachment. All state lives in the `SQLite`
//! record store opened once at startup.

pub mod config;
mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use waste_tracker_analytics_models::SummaryOptions;
use waste_tracker_database::RecordStore;

pub use config::ServerConfig;
pub use handlers::{SUMMARY_PATH, label_options};

/// Shared application state.
pub struct AppState {
    /// The record store, opened once at startup.
    pub store: Arc<RecordStore>,
    /// Limit, warning threshold and label lists for summaries.
    pub summary_options: SummaryOptions,
}

/// Registers every route of the API.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/summary", web::get().to(handlers::summary))
            .route("/options", web::get().to(handlers::options))
            .route("/entries", web::post().to(handlers::create_entry_json)),
    )
    .route("/entries", web::post().to(handlers::create_entry_form))
    .route("/export.csv", web::get().to(handlers::export_csv));
}

/// Starts the waste tracker API server.
///
/// Opens the record store, then starts the Actix-Web HTTP server. The
/// caller is responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`) and for initializing logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the record store cannot be opened,
/// or if the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!(
        "Opening waste database at {}...",
        config.store.db_path.display()
    );
    let store = RecordStore::open(&config.store).await.map_err(|e| {
        log::error!("Cannot start without a record store: {e}");
        std::io::Error::other(e)
    })?;

    let state = web::Data::new(AppState {
        store: Arc::new(store),
        summary_options: config.summary,
    });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
