use crate::record::HuntRecord;
use crate::season::{Season, SeasonFilter, current_season, parse_calendar_date, season};
use chrono::{Datelike, NaiveDate};
use std::str::FromStr;

pub const NO_VALUE: &str = "—";
pub const LOAD_FAILED_PLACEHOLDER: &str = "Failed to load logs. Check your Spreadsheet ID.";
pub const ALL_TIME_LABEL: &str = "All Time (Grand Total)";

/// A free-text cell. Only cells with text can be expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCell {
    pub text: String,
}

impl TextCell {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    pub fn is_expandable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub date: String,
    pub blind: String,
    pub ducks: u32,
    pub geese: u32,
    pub photo: Option<String>,
    pub weather: TextCell,
    pub notes: TextCell,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub ducks: u64,
    pub geese: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub filter: SeasonFilter,
    pub rows: Vec<TableRow>,
    pub totals: Totals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Weather,
    Notes,
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weather" => Ok(Column::Weather),
            "notes" => Ok(Column::Notes),
            other => Err(format!("unknown column {other:?} (expected weather or notes)")),
        }
    }
}

impl RenderedTable {
    /// Full text of an expandable cell; `None` for empty cells or bad indexes.
    pub fn expand(&self, row: usize, column: Column) -> Option<&str> {
        let row = self.rows.get(row)?;
        let cell = match column {
            Column::Weather => &row.weather,
            Column::Notes => &row.notes,
        };
        cell.is_expandable().then_some(cell.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonOption {
    pub value: SeasonFilter,
    pub label: String,
}

impl SeasonOption {
    pub fn for_filter(value: SeasonFilter) -> Self {
        let label = match value {
            SeasonFilter::All => ALL_TIME_LABEL.to_string(),
            SeasonFilter::Only(s) => format!("{s} Season"),
        };
        Self { value, label }
    }
}

/// `M/D/YY` from the date's own calendar components.
pub fn format_display_date(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "N/A".to_string();
    };
    match parse_calendar_date(raw) {
        Some(day) => format!(
            "{}/{}/{:02}",
            day.month(),
            day.day(),
            day.year().rem_euclid(100)
        ),
        None => raw.to_string(),
    }
}

/// Records passing `filter`, newest first. Undated records sort last.
pub fn select(records: &[HuntRecord], filter: SeasonFilter) -> Vec<&HuntRecord> {
    let mut selected: Vec<&HuntRecord> = records
        .iter()
        .filter(|r| filter.matches(r.hunt_date.as_deref()))
        .collect();
    selected.sort_by_cached_key(|r| {
        std::cmp::Reverse(r.hunt_date.as_deref().and_then(parse_calendar_date))
    });
    selected
}

pub fn render(records: &[HuntRecord], filter: SeasonFilter) -> RenderedTable {
    let selected = select(records, filter);

    let mut totals = Totals::default();
    let rows = selected
        .into_iter()
        .map(|record| {
            totals.ducks += u64::from(record.ducks);
            totals.geese += u64::from(record.geese);
            TableRow {
                date: format_display_date(record.hunt_date.as_deref()),
                blind: record
                    .blind_location
                    .clone()
                    .unwrap_or_else(|| "N/A".to_string()),
                ducks: record.ducks,
                geese: record.geese,
                photo: record.photo_link.clone(),
                weather: TextCell::new(&record.weather),
                notes: TextCell::new(&record.notes),
            }
        })
        .collect();

    RenderedTable {
        filter,
        rows,
        totals,
    }
}

/// Valid seasons present in `records`, newest first.
pub fn distinct_seasons(records: &[HuntRecord]) -> Vec<Season> {
    let mut seasons: Vec<Season> = records
        .iter()
        .map(|r| season(r.hunt_date.as_deref()))
        .filter(Season::is_valid)
        .collect();
    seasons.sort_unstable_by(|a, b| b.cmp(a));
    seasons.dedup();
    seasons
}

pub fn season_options(records: &[HuntRecord]) -> Vec<SeasonOption> {
    let mut options = vec![SeasonOption::for_filter(SeasonFilter::All)];
    options.extend(
        distinct_seasons(records)
            .into_iter()
            .map(|s| SeasonOption::for_filter(SeasonFilter::Only(s))),
    );
    options
}

/// Filter selected on first load: today's season if logged, else the
/// newest logged season, else everything.
pub fn default_filter(records: &[HuntRecord], today: NaiveDate) -> SeasonFilter {
    let seasons = distinct_seasons(records);
    let current = current_season(today);
    if seasons.contains(&current) {
        SeasonFilter::Only(current)
    } else {
        seasons
            .first()
            .copied()
            .map(SeasonFilter::Only)
            .unwrap_or(SeasonFilter::All)
    }
}
