#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the waste tracker.
//!
//! Records entries, prints monthly summaries, exports CSV, and starts the
//! API server. Without a subcommand it falls back to an interactive menu.

mod commands;
mod interactive;

use std::io::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use waste_tracker_database::RecordStore;
use waste_tracker_database_models::WasteEntryInput;
use waste_tracker_server::{ServerConfig, label_options};

#[derive(Parser)]
#[command(name = "waste_tracker", about = "Hazardous waste disposal tracker")]
struct Cli {
    /// `SQLite` database file (overrides `WASTE_DB_PATH`)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a disposal
    Add {
        /// Generating business or unit
        #[arg(long)]
        business: String,
        /// Waste stream
        #[arg(long)]
        stream: String,
        /// Quantity in kilograms
        #[arg(long)]
        quantity: String,
        /// Disposal date (`YYYY-MM-DD`), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Print the monthly summary
    Summary {
        /// Month (`YYYY-MM`), defaults to the current month
        #[arg(long)]
        month: Option<String>,
    },
    /// Export records as CSV
    Export {
        /// Only this month (`YYYY-MM`)
        #[arg(long)]
        month: Option<String>,
        /// Output file or directory; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List known business and stream labels
    Options,
    /// Start the HTTP API server
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(db_path) = cli.db_path {
        config.store.db_path = db_path;
    }

    let Some(command) = cli.command else {
        return interactive::run(config).await;
    };

    match command {
        Commands::Add {
            business,
            stream,
            quantity,
            date,
            notes,
        } => {
            let store = RecordStore::open(&config.store).await?;
            let input = WasteEntryInput {
                date,
                business,
                stream,
                quantity,
                notes,
            };
            let record = commands::add(&store, &input).await?;
            println!(
                "#{} {} {} {} {} kg",
                record.id, record.date, record.business, record.stream, record.quantity
            );
        }
        Commands::Summary { month } => {
            let store = RecordStore::open(&config.store).await?;
            let summary = commands::summary(&store, month.as_deref(), &config.summary).await?;
            print!("{}", commands::render_summary(&summary));
        }
        Commands::Export { month, output } => {
            let store = RecordStore::open(&config.store).await?;
            if let Some(csv) =
                commands::export(&store, month.as_deref(), output.as_deref()).await?
            {
                std::io::stdout().write_all(csv.as_bytes())?;
            }
        }
        Commands::Options => {
            let store = RecordStore::open(&config.store).await?;
            let options = label_options(&store, &config.summary).await?;
            println!("Businesses:");
            for business in &options.businesses {
                println!("  {business}");
            }
            println!("Streams:");
            for stream in &options.streams {
                println!("  {stream}");
            }
        }
        Commands::Serve => serve(config, false).await?,
    }

    Ok(())
}

/// Runs the API server on its own actix system.
///
/// The server uses actix-web's runtime, so it runs in a blocking task to
/// avoid nesting tokio runtimes.
async fn serve(config: ServerConfig, prompt: bool) -> Result<(), Box<dyn std::error::Error>> {
    tokio::task::spawn_blocking(move || {
        let system = actix_web::rt::System::new();
        if prompt {
            system.block_on(waste_tracker_server::interactive::run(config))
        } else {
            system.block_on(waste_tracker_server::run_server(config))
        }
    })
    .await??;

    Ok(())
}
