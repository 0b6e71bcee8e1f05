mod app;
mod client;
mod config;
mod error;
mod parse;
mod photo;
mod record;
mod render;
mod season;
mod store;
mod submit;
#[cfg(test)]
mod testing;
mod view;

use crate::app::{Controller, Event, Settings};
use crate::client::{ImageHostClient, SheetClient};
use crate::config::Config;
use crate::error::Result;
use crate::parse::{Args, CONSOLE_HELP, Command, ConsoleCommand};
use crate::record::HuntRecord;
use crate::season::SeasonFilter;
use crate::store::{HistoryStore, save_to_csv};
use crate::submit::{HuntForm, SubmitOutcome};
use crate::view::TerminalView;
use chrono::{Local, NaiveDate};
use clap::Parser;
use log::{error, info};
use std::path::Path;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};

type App = Controller<SheetClient, ImageHostClient, TerminalView>;

/// Summary line for a set of exported hunts
pub fn summarize(records: &[&HuntRecord]) -> String {
    if records.is_empty() {
        return "No hunts to export".to_string();
    }
    let ducks: u64 = records.iter().map(|r| u64::from(r.ducks)).sum();
    let geese: u64 = records.iter().map(|r| u64::from(r.geese)).sum();
    format!("{} hunts, {} ducks, {} geese", records.len(), ducks, geese)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn read_photo(config: &Config, path: &Path) -> Result<Vec<u8>> {
    config.image_key()?;
    Ok(tokio::fs::read(path).await?)
}

fn build_app(endpoint: SheetClient, config: &Config) -> Result<App> {
    Ok(Controller::new(
        endpoint,
        ImageHostClient::new(config)?,
        TerminalView::new(),
        Settings::from(config),
        today(),
    ))
}

async fn export(endpoint: &SheetClient, output: &Path, season: SeasonFilter) -> Result<ExitCode> {
    let mut store = HistoryStore::new();
    store.load(endpoint).await?;

    let selected = render::select(store.records(), season);
    save_to_csv(selected.iter().copied(), output)?;
    println!("Exported {} to {}", summarize(&selected), output.display());
    Ok(ExitCode::SUCCESS)
}

async fn watch(mut app: App, config: &Config) -> Result<ExitCode> {
    app.handle(Event::Load).await;
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<ConsoleCommand>() {
            Ok(ConsoleCommand::Event(event)) => app.handle(event).await,
            Ok(ConsoleCommand::Photo(path)) => match read_photo(config, &path).await {
                Ok(bytes) => app.handle(Event::PhotoSelected(bytes)).await,
                Err(e) => error!("Could not use photo {}: {}", path.display(), e),
            },
            Ok(ConsoleCommand::Help) => println!("{CONSOLE_HELP}"),
            Ok(ConsoleCommand::Quit) => break,
            Err(e) => println!("{e}"),
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    // Initialize logger
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = Config::from_args(&args)?;
    let endpoint = SheetClient::new(&config)?;

    match args.command {
        Command::History { season } => {
            let mut app = build_app(endpoint, &config)?.with_filter(season);
            let loaded = app.load().await;
            Ok(if loaded { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Command::Submit {
            date,
            blind,
            ducks,
            geese,
            weather,
            notes,
            photo,
            season,
        } => {
            let mut app = build_app(endpoint, &config)?.with_filter(season);
            if let Some(path) = &photo {
                let bytes = read_photo(&config, path).await?;
                app.select_photo(&bytes).await;
            }
            let form = HuntForm {
                hunt_date: date.unwrap_or_else(|| today().format("%Y-%m-%d").to_string()),
                blind_location: blind,
                ducks,
                geese,
                photo_link: String::new(),
                weather,
                notes,
            };
            let outcome = app.submit(form).await;
            info!("Submission finished: {:?}", outcome);
            Ok(match outcome {
                SubmitOutcome::Committed => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            })
        }
        Command::Export { output, season } => export(&endpoint, &output, season).await,
        Command::Watch => watch(build_app(endpoint, &config)?, &config).await,
    }
}
