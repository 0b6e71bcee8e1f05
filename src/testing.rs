//! In-memory stand-ins for the log endpoint, the image host and the view.

use crate::app::View;
use crate::client::{LogEndpoint, PhotoHost, SubmitReceipt};
use crate::error::{TransportError, UploadError};
use crate::photo::UploadStatus;
use crate::render::{RenderedTable, SeasonOption};
use crate::season::SeasonFilter;
use crate::submit::{HuntForm, Notice, ProvisionalRow, SubmitControl};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    Offline,
}

/// Serves a canned history. Accepted submissions are appended to it, the way
/// the real sheet grows a row.
pub struct FakeEndpoint {
    history: Mutex<Reply>,
    offline_submissions: bool,
    fetches: AtomicUsize,
    submissions: Mutex<Vec<HuntForm>>,
}

impl FakeEndpoint {
    pub fn with_history(history: Value) -> Self {
        Self {
            history: Mutex::new(Reply::Json(history)),
            offline_submissions: false,
            fetches: AtomicUsize::new(0),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn offline_submissions(mut self) -> Self {
        self.offline_submissions = true;
        self
    }

    pub fn set_history(&self, reply: Reply) {
        *self.history.lock().unwrap() = reply;
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<HuntForm> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogEndpoint for FakeEndpoint {
    async fn fetch_history(&self) -> Result<Value, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.history.lock().unwrap().clone() {
            Reply::Json(value) => Ok(value),
            Reply::Status(code) => Err(TransportError::Status(code)),
            Reply::Offline => Err(TransportError::Network("connection refused".into())),
        }
    }

    async fn submit(&self, entry: &HuntForm) -> Result<SubmitReceipt, TransportError> {
        self.submissions.lock().unwrap().push(entry.clone());
        if self.offline_submissions {
            return Err(TransportError::Network("connection reset".into()));
        }

        if let Reply::Json(Value::Array(rows)) = &mut *self.history.lock().unwrap() {
            let row: Map<String, Value> = entry
                .params()
                .into_iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect();
            rows.push(Value::Object(row));
        }
        Ok(SubmitReceipt { status: 200 })
    }
}

enum HostReply {
    Url(String),
    Rejected,
    Offline,
}

pub struct FakeHost {
    reply: HostReply,
    uploads: AtomicUsize,
}

impl FakeHost {
    fn new(reply: HostReply) -> Self {
        Self {
            reply,
            uploads: AtomicUsize::new(0),
        }
    }

    pub fn ready(url: &str) -> Self {
        Self::new(HostReply::Url(url.to_string()))
    }

    pub fn rejecting() -> Self {
        Self::new(HostReply::Rejected)
    }

    pub fn offline() -> Self {
        Self::new(HostReply::Offline)
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhotoHost for FakeHost {
    async fn upload(&self, jpeg: Vec<u8>) -> Result<String, UploadError> {
        assert!(!jpeg.is_empty());
        self.uploads.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            HostReply::Url(url) => Ok(url.clone()),
            HostReply::Rejected => Err(UploadError::Rejected),
            HostReply::Offline => Err(TransportError::Network("timed out".into()).into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    Options(Vec<SeasonOption>, SeasonFilter),
    Table(RenderedTable),
    LoadFailure(String),
    Provisional(ProvisionalRow),
    ClearProvisional,
    Control(SubmitControl),
    Upload(UploadStatus),
    ResetForm,
    Notice(Notice),
    FullText(String),
}

impl ViewCall {
    pub fn is_table(&self) -> bool {
        matches!(self, ViewCall::Table(_))
    }
}

#[derive(Default)]
pub struct RecordingView {
    pub calls: Vec<ViewCall>,
}

impl RecordingView {
    pub fn last_options(&self) -> Option<(Vec<SeasonOption>, SeasonFilter)> {
        self.calls.iter().rev().find_map(|c| match c {
            ViewCall::Options(options, selected) => Some((options.clone(), *selected)),
            _ => None,
        })
    }
}

impl View for RecordingView {
    fn show_season_options(&mut self, options: &[SeasonOption], selected: SeasonFilter) {
        self.calls.push(ViewCall::Options(options.to_vec(), selected));
    }

    fn show_table(&mut self, table: &RenderedTable) {
        self.calls.push(ViewCall::Table(table.clone()));
    }

    fn show_load_failure(&mut self, message: &str) {
        self.calls.push(ViewCall::LoadFailure(message.to_string()));
    }

    fn show_provisional(&mut self, row: &ProvisionalRow) {
        self.calls.push(ViewCall::Provisional(row.clone()));
    }

    fn clear_provisional(&mut self) {
        self.calls.push(ViewCall::ClearProvisional);
    }

    fn set_submit_control(&mut self, control: SubmitControl) {
        self.calls.push(ViewCall::Control(control));
    }

    fn set_upload_status(&mut self, status: &UploadStatus) {
        self.calls.push(ViewCall::Upload(status.clone()));
    }

    fn reset_form(&mut self) {
        self.calls.push(ViewCall::ResetForm);
    }

    fn notice(&mut self, notice: &Notice) {
        self.calls.push(ViewCall::Notice(notice.clone()));
    }

    fn show_full_text(&mut self, text: &str) {
        self.calls.push(ViewCall::FullText(text.to_string()));
    }
}
