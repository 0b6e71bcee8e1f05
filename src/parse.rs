use crate::app::Event;
use crate::config::DEFAULT_IMAGE_HOST;
use crate::render::Column;
use crate::season::SeasonFilter;
use crate::submit::HuntForm;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "flyway")]
#[command(about = "A CLI client for logging waterfowl hunts to a spreadsheet endpoint")]
#[command(version = "1.0")]
pub(crate) struct Args {
    /// Spreadsheet web-app URL that stores the hunt log
    #[arg(short, long, env = "FLYWAY_ENDPOINT")]
    pub endpoint: String,

    /// Image host upload URL
    #[arg(long, env = "FLYWAY_IMAGE_HOST", default_value = DEFAULT_IMAGE_HOST)]
    pub image_host: String,

    /// Image host access key
    #[arg(long, env = "FLYWAY_IMAGE_KEY", hide_env_values = true)]
    pub image_key: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "30")]
    pub timeout: u64,

    /// Delay before reloading after the client becomes visible, in milliseconds
    #[arg(long, default_value = "300")]
    pub reload_delay: u64,

    /// Photos wider than this are scaled down before upload
    #[arg(long, default_value = "1200")]
    pub max_photo_width: u32,

    /// JPEG quality for uploaded photos (1-100)
    #[arg(long, default_value = "70")]
    pub jpeg_quality: u8,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Show logged hunts with season totals
    History {
        /// Season to show, e.g. 2025-2026, or "all"
        #[arg(short, long)]
        season: Option<SeasonFilter>,
    },

    /// Record a hunt
    Submit {
        /// Hunt date (YYYY-MM-DD); defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// Blind or spot hunted
        #[arg(short, long)]
        blind: String,

        #[arg(long, default_value = "0")]
        ducks: String,

        #[arg(long, default_value = "0")]
        geese: String,

        #[arg(short, long, default_value = "")]
        weather: String,

        #[arg(short, long, default_value = "")]
        notes: String,

        /// Photo to upload with the entry
        #[arg(short, long)]
        photo: Option<PathBuf>,

        /// Season to show after the hunt is recorded
        #[arg(short, long)]
        season: Option<SeasonFilter>,
    },

    /// Export logged hunts to CSV
    Export {
        /// Output CSV filename
        #[arg(short, long, default_value = "hunts.csv")]
        output: PathBuf,

        #[arg(short, long, default_value = "all")]
        season: SeasonFilter,
    },

    /// Interactive session reading commands from stdin
    Watch,
}

/// One line typed into `flyway watch`.
#[derive(Debug, PartialEq)]
pub(crate) enum ConsoleCommand {
    Event(Event),
    Photo(PathBuf),
    Help,
    Quit,
}

pub(crate) const CONSOLE_HELP: &str = "\
commands:
  season <YYYY-YYYY|all>        change the season filter
  reload                        reload the log (as if the window regained focus)
  expand <row> <weather|notes>  show a cell's full text
  photo <path>                  upload a photo for the next entry
  clear-photo                   drop the selected photo
  submit date|blind|ducks|geese|weather|notes
  help
  quit";

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match word {
            "season" => rest
                .parse::<SeasonFilter>()
                .map(|f| ConsoleCommand::Event(Event::SeasonChanged(f)))
                .map_err(|e| e.to_string()),
            "reload" => Ok(ConsoleCommand::Event(Event::VisibilityRegained)),
            "expand" => {
                let (row, column) = rest
                    .split_once(' ')
                    .ok_or("usage: expand <row> <weather|notes>")?;
                let row: usize = row
                    .parse()
                    .map_err(|_| format!("not a row number: {row}"))?;
                if row == 0 {
                    return Err("rows are numbered from 1".into());
                }
                let column: Column = column.parse()?;
                Ok(ConsoleCommand::Event(Event::Expand {
                    row: row - 1,
                    column,
                }))
            }
            "photo" if !rest.is_empty() => Ok(ConsoleCommand::Photo(PathBuf::from(rest))),
            "clear-photo" => Ok(ConsoleCommand::Event(Event::PhotoCleared)),
            "submit" => parse_form(rest).map(|f| ConsoleCommand::Event(Event::Submit(f))),
            "help" | "?" => Ok(ConsoleCommand::Help),
            "quit" | "exit" => Ok(ConsoleCommand::Quit),
            _ => Err(format!("unknown command: {line}")),
        }
    }
}

fn parse_form(fields: &str) -> Result<HuntForm, String> {
    let parts: Vec<&str> = fields.split('|').map(str::trim).collect();
    if parts.len() != 6 {
        return Err("usage: submit date|blind|ducks|geese|weather|notes".into());
    }
    Ok(HuntForm {
        hunt_date: parts[0].to_string(),
        blind_location: parts[1].to_string(),
        ducks: parts[2].to_string(),
        geese: parts[3].to_string(),
        photo_link: String::new(),
        weather: parts[4].to_string(),
        notes: parts[5].to_string(),
    })
}
