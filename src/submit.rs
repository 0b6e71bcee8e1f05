use crate::render::{NO_VALUE, format_display_date};
use std::fmt;

pub const SUBMIT_LABEL: &str = "Submit Hunt to Log";
pub const SUBMITTING_LABEL: &str = "Submitting to Log...";
pub const RETRY_LABEL: &str = "Retry Submission";

/// The hunt form exactly as typed. Counts stay raw text until the log
/// endpoint stores them; the table coerces them on the next load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HuntForm {
    pub hunt_date: String,
    pub blind_location: String,
    pub ducks: String,
    pub geese: String,
    /// Hidden field, filled in by the photo uploader.
    pub photo_link: String,
    pub weather: String,
    pub notes: String,
}

impl HuntForm {
    /// Form-encoded body, in the column order of the log sheet.
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("huntDate", self.hunt_date.as_str()),
            ("blindLocation", self.blind_location.as_str()),
            ("ducks", self.ducks.as_str()),
            ("geese", self.geese.as_str()),
            ("photoLink", self.photo_link.as_str()),
            ("weather", self.weather.as_str()),
            ("notes", self.notes.as_str()),
        ]
    }

    pub fn provisional_row(&self) -> ProvisionalRow {
        let date = if self.hunt_date.trim().is_empty() {
            format_display_date(None)
        } else {
            format_display_date(Some(&self.hunt_date))
        };
        ProvisionalRow {
            date,
            blind: self.blind_location.clone(),
            ducks: self.ducks.clone(),
            geese: self.geese.clone(),
            photo: if self.photo_link.is_empty() {
                NO_VALUE
            } else {
                "📸 Uploading..."
            },
            weather: self.weather.clone(),
            notes: self.notes.clone(),
            status: RowStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Pending,
    Errored,
}

/// Not-yet-confirmed entry shown above the table while a submission runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionalRow {
    pub date: String,
    pub blind: String,
    pub ducks: String,
    pub geese: String,
    pub photo: &'static str,
    pub weather: String,
    pub notes: String,
    pub status: RowStatus,
}

/// The hidden photo link plus whether a file was picked for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoField {
    selected: bool,
    link: Option<String>,
}

impl PhotoField {
    pub fn select(&mut self) {
        self.selected = true;
        self.link = None;
    }

    pub fn attach(&mut self, url: String) {
        self.link = Some(url);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    /// A file was chosen but its upload has not produced a link.
    pub fn is_pending(&self) -> bool {
        self.selected && self.link.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Committed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitControl {
    pub enabled: bool,
    pub label: &'static str,
}

impl SubmissionState {
    pub fn control(&self) -> SubmitControl {
        match self {
            SubmissionState::Idle | SubmissionState::Committed => SubmitControl {
                enabled: true,
                label: SUBMIT_LABEL,
            },
            SubmissionState::Submitting => SubmitControl {
                enabled: false,
                label: SUBMITTING_LABEL,
            },
            SubmissionState::Failed => SubmitControl {
                enabled: true,
                label: RETRY_LABEL,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    InFlight,
    PhotoPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Committed,
    Failed,
    Blocked,
    Ignored,
}

/// Messages surfaced to the user as dismissable alerts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Recorded,
    SubmissionFailed,
    PhotoPending,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Recorded => f.write_str("Hunt Recorded Successfully!"),
            Notice::SubmissionFailed => {
                f.write_str("Submission Failed. Check your cellular signal.")
            }
            Notice::PhotoPending => f.write_str(
                "Please wait for the photo to finish uploading (look for the Ready message).",
            ),
        }
    }
}

/// Idle -> Submitting -> Committed | Failed.
///
/// Holds at most one provisional row. A new submission replaces an errored
/// row left behind by a failed one.
#[derive(Debug)]
pub struct SubmissionFlow {
    state: SubmissionState,
    provisional: Option<ProvisionalRow>,
}

impl Default for SubmissionFlow {
    fn default() -> Self {
        Self {
            state: SubmissionState::Idle,
            provisional: None,
        }
    }
}

impl SubmissionFlow {
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn provisional(&self) -> Option<&ProvisionalRow> {
        self.provisional.as_ref()
    }

    pub fn begin(
        &mut self,
        form: &HuntForm,
        photo: &PhotoField,
    ) -> Result<&ProvisionalRow, Refusal> {
        if self.state == SubmissionState::Submitting {
            return Err(Refusal::InFlight);
        }
        if photo.is_pending() {
            return Err(Refusal::PhotoPending);
        }
        self.state = SubmissionState::Submitting;
        Ok(self.provisional.insert(form.provisional_row()))
    }

    pub fn commit(&mut self) {
        self.state = SubmissionState::Committed;
        self.provisional = None;
    }

    pub fn fail(&mut self) -> Option<&ProvisionalRow> {
        self.state = SubmissionState::Failed;
        if let Some(row) = self.provisional.as_mut() {
            row.status = RowStatus::Errored;
        }
        self.provisional.as_ref()
    }
}
