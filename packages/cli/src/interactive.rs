//! Menu-driven mode, used when no subcommand is given.

use dialoguer::{Confirm, Input, Select};
use waste_tracker_database::RecordStore;
use waste_tracker_database_models::WasteEntryInput;
use waste_tracker_server::{ServerConfig, label_options};

use crate::commands;

/// Top-level action selection.
enum Action {
    AddEntry,
    Summary,
    Export,
    Serve,
}

impl Action {
    const ALL: &[Self] = &[Self::AddEntry, Self::Summary, Self::Export, Self::Serve];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::AddEntry => "Record a waste entry",
            Self::Summary => "Show monthly summary",
            Self::Export => "Export CSV",
            Self::Serve => "Start server",
        }
    }
}

/// Prompts for an action and runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the chosen action fails.
pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Waste Tracker");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::AddEntry => {
            let store = RecordStore::open(&config.store).await?;
            let input = prompt_entry(&store, &config).await?;
            let record = commands::add(&store, &input).await?;
            println!("Saved entry #{}", record.id);
        }
        Action::Summary => {
            let store = RecordStore::open(&config.store).await?;
            let month: String = Input::new()
                .with_prompt("Month (YYYY-MM)")
                .default(store.calendar().current_month().to_string())
                .interact_text()?;
            let summary = commands::summary(&store, Some(&month), &config.summary).await?;
            print!("{}", commands::render_summary(&summary));
        }
        Action::Export => {
            let store = RecordStore::open(&config.store).await?;
            let whole = Confirm::new()
                .with_prompt("Export every month?")
                .default(false)
                .interact()?;
            let month = if whole {
                None
            } else {
                Some(
                    Input::<String>::new()
                        .with_prompt("Month (YYYY-MM)")
                        .default(store.calendar().current_month().to_string())
                        .interact_text()?,
                )
            };
            let output: String = Input::new()
                .with_prompt("Write to (file or directory)")
                .default(".".to_string())
                .interact_text()?;
            commands::export(
                &store,
                month.as_deref(),
                Some(std::path::Path::new(&output)),
            )
            .await?;
        }
        Action::Serve => crate::serve(config, true).await?,
    }

    Ok(())
}

/// Prompts for each field of a new entry, offering known labels.
async fn prompt_entry(
    store: &RecordStore,
    config: &ServerConfig,
) -> Result<WasteEntryInput, Box<dyn std::error::Error>> {
    let options = label_options(store, &config.summary).await?;

    let date: String = Input::new()
        .with_prompt("Date (YYYY-MM-DD)")
        .default(store.calendar().today().to_string())
        .interact_text()?;
    let business = select_or_type("Business", &options.businesses)?;
    let stream = select_or_type("Stream", &options.streams)?;
    let quantity: String = Input::new()
        .with_prompt("Quantity (kg)")
        .interact_text()?;
    let notes: String = Input::new()
        .with_prompt("Notes")
        .allow_empty(true)
        .interact_text()?;

    Ok(WasteEntryInput {
        date: Some(date),
        business,
        stream,
        quantity,
        notes: Some(notes),
    })
}

/// Offers `known` labels plus a free-text option.
fn select_or_type(prompt: &str, known: &[String]) -> Result<String, dialoguer::Error> {
    if known.is_empty() {
        return Input::new().with_prompt(prompt).interact_text();
    }

    let mut items: Vec<&str> = known.iter().map(String::as_str).collect();
    items.push("Other...");

    let idx = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;

    match known.get(idx) {
        Some(label) => Ok(label.clone()),
        None => Input::new().with_prompt(prompt).interact_text(),
    }
}
