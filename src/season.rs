use crate::error::FlywayError;
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// A September-to-August hunting season, or the reason a date has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Season {
    /// Season starting in September of the given year.
    Span(i32),
    InvalidDate,
    Unknown,
}

impl Season {
    pub fn containing(date: NaiveDate) -> Self {
        let start = if date.month0() >= 8 {
            date.year()
        } else {
            date.year() - 1
        };
        Season::Span(start)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Season::Span(_))
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Span(start) => write!(f, "{}-{}", start, start + 1),
            Season::InvalidDate => f.write_str("Invalid Date"),
            Season::Unknown => f.write_str("Unknown"),
        }
    }
}

impl FromStr for Season {
    type Err = FlywayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FlywayError::InvalidSeason(s.to_string());
        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;
        let start: i32 = start.parse().map_err(|_| invalid())?;
        let end: i32 = end.parse().map_err(|_| invalid())?;
        if start.checked_add(1) != Some(end) {
            return Err(invalid());
        }
        Ok(Season::Span(start))
    }
}

/// Which records the history table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeasonFilter {
    All,
    Only(Season),
}

impl SeasonFilter {
    pub fn matches(&self, date: Option<&str>) -> bool {
        match self {
            SeasonFilter::All => true,
            SeasonFilter::Only(wanted) => season(date) == *wanted,
        }
    }
}

impl fmt::Display for SeasonFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonFilter::All => f.write_str("all"),
            SeasonFilter::Only(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for SeasonFilter {
    type Err = FlywayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(SeasonFilter::All)
        } else {
            s.parse::<Season>().map(SeasonFilter::Only)
        }
    }
}

/// Parse the calendar part of a date string as a local date.
///
/// Anything after a `T` or a space is dropped, and `/` and `.` are treated
/// like `-`, so `2025/09/15`, `2025-09-15T05:00:00.000Z` and `09/15/2025`
/// all name the same day. No timezone is ever applied.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().split(['T', ' ']).next()?;
    let normalized: String = day
        .chars()
        .map(|c| if c == '/' || c == '.' { '-' } else { c })
        .collect();

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&normalized, "%m-%d-%Y"))
        .ok()
}

pub fn season(date: Option<&str>) -> Season {
    let Some(raw) = date.map(str::trim).filter(|s| !s.is_empty()) else {
        return Season::Unknown;
    };
    match parse_calendar_date(raw) {
        Some(day) => Season::containing(day),
        None => Season::InvalidDate,
    }
}

pub fn current_season(today: NaiveDate) -> Season {
    Season::containing(today)
}
