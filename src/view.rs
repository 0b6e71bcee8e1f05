use crate::app::View;
use crate::photo::UploadStatus;
use crate::render::{NO_VALUE, RenderedTable, SeasonOption, TextCell};
use crate::season::SeasonFilter;
use crate::submit::{Notice, ProvisionalRow, RowStatus, SUBMIT_LABEL, SubmitControl};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::time::Duration;

const TEXT_WIDTH: usize = 24;

/// Prints render instructions to stdout.
#[derive(Default)]
pub struct TerminalView {
    spinner: Option<ProgressBar>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    fn start_spinner(&mut self, message: &'static str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(spinner);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

/// Cut `text` to `width` characters, marking the cut with an ellipsis.
pub fn clip(text: &str, width: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

fn text_cell(cell: &TextCell) -> String {
    if cell.is_expandable() {
        clip(&cell.text, TEXT_WIDTH)
    } else {
        String::new()
    }
}

fn header() -> String {
    format!(
        "{:>3}  {:<8} {:<18} {:>5} {:>5}  {:<6} {:<24} {:<24}",
        "#", "Date", "Blind", "Ducks", "Geese", "Photo", "Weather", "Notes"
    )
}

pub fn format_table(table: &RenderedTable) -> String {
    let mut lines = vec![header()];
    for (index, row) in table.rows.iter().enumerate() {
        lines.push(format!(
            "{:>3}  {:<8} {:<18} {:>5} {:>5}  {:<6} {:<24} {:<24}",
            index + 1,
            row.date,
            clip(&row.blind, 18),
            row.ducks,
            row.geese,
            if row.photo.is_some() { "📸" } else { NO_VALUE },
            text_cell(&row.weather),
            text_cell(&row.notes),
        ));
        if let Some(link) = &row.photo {
            lines.push(format!("     {link}"));
        }
    }
    lines.push(format!(
        "     {:<27} {:>5} {:>5}",
        "TOTALS", table.totals.ducks, table.totals.geese
    ));
    lines.join("\n")
}

pub fn format_provisional(row: &ProvisionalRow) -> String {
    let tag = match row.status {
        RowStatus::Pending => "pending",
        RowStatus::Errored => "FAILED",
    };
    format!(
        "[{tag}] {:<8} {:<18} {:>5} {:>5}  {:<6} {:<24} {:<24}",
        row.date,
        clip(&row.blind, 18),
        row.ducks,
        row.geese,
        row.photo,
        clip(&row.weather, TEXT_WIDTH),
        clip(&row.notes, TEXT_WIDTH),
    )
}

impl View for TerminalView {
    fn show_season_options(&mut self, options: &[SeasonOption], selected: SeasonFilter) {
        let labels: Vec<String> = options
            .iter()
            .map(|o| {
                if o.value == selected {
                    format!("[{}]", o.label)
                } else {
                    o.label.clone()
                }
            })
            .collect();
        println!("Seasons: {}", labels.join(" | "));
    }

    fn show_table(&mut self, table: &RenderedTable) {
        println!("\n{}", format_table(table));
    }

    fn show_load_failure(&mut self, message: &str) {
        println!("\n{message}");
    }

    fn show_provisional(&mut self, row: &ProvisionalRow) {
        if let Some(spinner) = &self.spinner {
            spinner.println(format_provisional(row));
        } else {
            println!("{}", format_provisional(row));
        }
    }

    fn clear_provisional(&mut self) {
        debug!("Provisional row cleared");
    }

    fn set_submit_control(&mut self, control: SubmitControl) {
        if control.enabled {
            self.stop_spinner();
            if control.label != SUBMIT_LABEL {
                println!("{}", control.label);
            }
        } else {
            self.start_spinner(control.label);
        }
    }

    fn set_upload_status(&mut self, status: &UploadStatus) {
        println!("Photo: {status}");
    }

    fn reset_form(&mut self) {
        debug!("Form reset");
    }

    fn notice(&mut self, notice: &Notice) {
        match &self.spinner {
            Some(spinner) => spinner.println(notice.to_string()),
            None => println!("{notice}"),
        }
    }

    fn show_full_text(&mut self, text: &str) {
        println!("\n{text}\n");
    }
}
