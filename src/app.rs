use crate::client::{LogEndpoint, PhotoHost};
use crate::config::Config;
use crate::photo::{UploadStatus, prepare_photo};
use crate::render::{
    Column, LOAD_FAILED_PLACEHOLDER, RenderedTable, SeasonOption, default_filter, render,
    season_options,
};
use crate::season::SeasonFilter;
use crate::store::HistoryStore;
use crate::submit::{
    HuntForm, Notice, PhotoField, ProvisionalRow, Refusal, SubmissionFlow, SubmitControl,
    SubmitOutcome,
};
use chrono::NaiveDate;
use log::{debug, error, info};
use std::time::Duration;

/// Input events the controller understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Load,
    SeasonChanged(SeasonFilter),
    PhotoSelected(Vec<u8>),
    PhotoCleared,
    Submit(HuntForm),
    VisibilityRegained,
    Expand { row: usize, column: Column },
}

/// Presentation surface. Every call replaces what it names; nothing is
/// diffed.
pub trait View {
    fn show_season_options(&mut self, options: &[SeasonOption], selected: SeasonFilter);
    fn show_table(&mut self, table: &RenderedTable);
    fn show_load_failure(&mut self, message: &str);
    fn show_provisional(&mut self, row: &ProvisionalRow);
    fn clear_provisional(&mut self);
    fn set_submit_control(&mut self, control: SubmitControl);
    fn set_upload_status(&mut self, status: &UploadStatus);
    fn reset_form(&mut self);
    fn notice(&mut self, notice: &Notice);
    fn show_full_text(&mut self, text: &str);
}

#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub reload_delay: Duration,
    pub max_photo_width: u32,
    pub jpeg_quality: u8,
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            reload_delay: config.reload_delay,
            max_photo_width: config.max_photo_width,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

/// Owns the hunt list, the form's photo field and the submission state, and
/// is their only writer. Events are handled one at a time; a submission's
/// reload runs only after the submission itself has finished.
pub struct Controller<E, P, V> {
    endpoint: E,
    photos: P,
    view: V,
    settings: Settings,
    today: NaiveDate,
    store: HistoryStore,
    filter: Option<SeasonFilter>,
    /// Whether `filter` came from the user rather than `default_filter`.
    chosen: bool,
    table: Option<RenderedTable>,
    photo: PhotoField,
    submission: SubmissionFlow,
}

impl<E: LogEndpoint, P: PhotoHost, V: View> Controller<E, P, V> {
    pub fn new(endpoint: E, photos: P, view: V, settings: Settings, today: NaiveDate) -> Self {
        Self {
            endpoint,
            photos,
            view,
            settings,
            today,
            store: HistoryStore::new(),
            filter: None,
            chosen: false,
            table: None,
            photo: PhotoField::default(),
            submission: SubmissionFlow::default(),
        }
    }

    /// Use `filter` instead of picking one on first load.
    pub fn with_filter(mut self, filter: Option<SeasonFilter>) -> Self {
        self.chosen = filter.is_some();
        self.filter = filter;
        self
    }

    pub async fn handle(&mut self, event: Event) {
        match event {
            Event::Load => {
                self.load().await;
            }
            Event::SeasonChanged(filter) => self.select_season(filter),
            Event::PhotoSelected(bytes) => {
                self.select_photo(&bytes).await;
            }
            Event::PhotoCleared => self.clear_photo(),
            Event::Submit(form) => {
                self.submit(form).await;
            }
            Event::VisibilityRegained => self.visibility_regained().await,
            Event::Expand { row, column } => {
                self.expand(row, column);
            }
        }
    }

    /// Reload the log and redraw. Returns false when the failure placeholder
    /// is shown instead of the table.
    pub async fn load(&mut self) -> bool {
        match self.store.load(&self.endpoint).await {
            Ok(_) => {
                let records = self.store.records();
                let mut options = season_options(records);
                let listed = |filter: &SeasonFilter| options.iter().any(|o| o.value == *filter);

                let filter = match self.filter {
                    Some(filter) if self.chosen || listed(&filter) => filter,
                    _ => default_filter(records, self.today),
                };
                if !listed(&filter) {
                    // A season picked by hand stays selectable after its
                    // records are gone.
                    options.push(SeasonOption::for_filter(filter));
                }
                self.filter = Some(filter);
                self.view.show_season_options(&options, filter);
                self.render();
                true
            }
            Err(e) => {
                error!("Error loading history: {}", e);
                self.table = None;
                self.view.show_load_failure(LOAD_FAILED_PLACEHOLDER);
                false
            }
        }
    }

    pub fn select_season(&mut self, filter: SeasonFilter) {
        debug!("Season filter changed to {}", filter);
        self.filter = Some(filter);
        self.chosen = true;
        self.render();
    }

    fn render(&mut self) {
        let filter = self.filter.unwrap_or(SeasonFilter::All);
        let table = render(self.store.records(), filter);
        self.view.show_table(&table);
        self.table = Some(table);
    }

    pub async fn visibility_regained(&mut self) {
        tokio::time::sleep(self.settings.reload_delay).await;
        self.load().await;
    }

    pub fn expand(&mut self, row: usize, column: Column) -> bool {
        match self.table.as_ref().and_then(|t| t.expand(row, column)) {
            Some(text) => {
                self.view.show_full_text(text);
                true
            }
            None => false,
        }
    }

    /// Resize and upload a freshly picked photo. The link lands in the
    /// hidden form field only on success.
    pub async fn select_photo(&mut self, bytes: &[u8]) -> bool {
        self.photo.select();
        self.view.set_upload_status(&UploadStatus::Processing);

        let jpeg = match prepare_photo(
            bytes,
            self.settings.max_photo_width,
            self.settings.jpeg_quality,
        ) {
            Ok(jpeg) => jpeg,
            Err(e) => {
                error!("Photo processing failed: {}", e);
                self.view.set_upload_status(&UploadStatus::from_error(&e));
                return false;
            }
        };

        self.view.set_upload_status(&UploadStatus::Uploading);
        match self.photos.upload(jpeg).await {
            Ok(url) => {
                info!("Photo uploaded: {}", url);
                self.view.set_upload_status(&UploadStatus::Ready(url.clone()));
                self.photo.attach(url);
                true
            }
            Err(e) => {
                error!("Photo upload failed: {}", e);
                self.view.set_upload_status(&UploadStatus::from_error(&e));
                false
            }
        }
    }

    pub fn clear_photo(&mut self) {
        self.photo.clear();
    }

    pub async fn submit(&mut self, mut form: HuntForm) -> SubmitOutcome {
        form.photo_link = self.photo.link().unwrap_or_default().to_string();

        let row = match self.submission.begin(&form, &self.photo) {
            Ok(row) => row.clone(),
            Err(Refusal::PhotoPending) => {
                self.view.notice(&Notice::PhotoPending);
                return SubmitOutcome::Blocked;
            }
            Err(Refusal::InFlight) => {
                debug!("Ignoring submit while another is in flight");
                return SubmitOutcome::Ignored;
            }
        };
        self.view.set_submit_control(self.submission.state().control());
        self.view.show_provisional(&row);

        match self.endpoint.submit(&form).await {
            Ok(receipt) => {
                debug!("Submission completed with status {}", receipt.status);
                self.submission.commit();
                self.view.notice(&Notice::Recorded);
                self.photo.clear();
                self.view.reset_form();
                self.view.set_submit_control(self.submission.state().control());
                self.view.clear_provisional();
                self.load().await;
                SubmitOutcome::Committed
            }
            Err(e) => {
                error!("Submission error: {}", e);
                self.view.notice(&Notice::SubmissionFailed);
                if let Some(row) = self.submission.fail() {
                    self.view.show_provisional(row);
                }
                self.view.set_submit_control(self.submission.state().control());
                SubmitOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
impl<E, P, V> Controller<E, P, V> {
    pub fn table(&self) -> Option<&RenderedTable> {
        self.table.as_ref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn photos(&self) -> &P {
        &self.photos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Totals;
    use crate::submit::{RETRY_LABEL, RowStatus, SUBMITTING_LABEL};
    use crate::testing::{FakeEndpoint, FakeHost, RecordingView, Reply, ViewCall};
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 24).unwrap()
    }

    fn settings() -> Settings {
        Settings {
            reload_delay: Duration::from_millis(1),
            max_photo_width: 1200,
            jpeg_quality: 70,
        }
    }

    fn controller(
        endpoint: FakeEndpoint,
        host: FakeHost,
    ) -> Controller<FakeEndpoint, FakeHost, RecordingView> {
        Controller::new(endpoint, host, RecordingView::default(), settings(), today())
    }

    fn two_seasons() -> FakeEndpoint {
        FakeEndpoint::with_history(json!([
            {"huntDate": "2024-11-15", "blindLocation": "Levee", "ducks": 6, "geese": 0},
            {"huntDate": "2025-09-10", "blindLocation": "Pond", "ducks": 3, "geese": 1},
            {"huntDate": "2025-12-01", "blindLocation": "Pond", "ducks": "2", "geese": ""}
        ]))
    }

    fn form() -> HuntForm {
        HuntForm {
            hunt_date: "2025-12-20".into(),
            blind_location: "Flooded timber".into(),
            ducks: "5".into(),
            geese: "0".into(),
            photo_link: String::new(),
            weather: "Overcast".into(),
            notes: String::new(),
        }
    }

    fn png() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(32, 16, image::Rgb([10, 20, 30]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_first_load_selects_current_season() {
        let mut app = controller(two_seasons(), FakeHost::ready("https://i.example/a.jpg"));
        assert!(app.load().await);

        let table = app.table().unwrap();
        assert_eq!(table.filter, "2025-2026".parse().unwrap());
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.totals, Totals { ducks: 5, geese: 1 });

        let (options, selected) = app.view().last_options().unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(selected, table.filter);
    }

    #[tokio::test]
    async fn test_default_season_follows_reload() {
        let mut app = controller(two_seasons(), FakeHost::ready("https://i.example/a.jpg"));
        app.load().await;
        assert_eq!(app.table().unwrap().filter, "2025-2026".parse().unwrap());

        app.endpoint().set_history(Reply::Json(json!([
            {"huntDate": "2024-11-15", "blindLocation": "Levee", "ducks": 6}
        ])));
        app.load().await;

        let (options, selected) = app.view().last_options().unwrap();
        assert_eq!(selected, "2024-2025".parse().unwrap());
        assert!(options.iter().any(|o| o.value == selected));
        assert_eq!(app.table().unwrap().totals, Totals { ducks: 6, geese: 0 });
    }

    #[tokio::test]
    async fn test_chosen_season_without_records_stays_selected() {
        let mut app = controller(two_seasons(), FakeHost::ready("https://i.example/a.jpg"))
            .with_filter(Some("2019-2020".parse().unwrap()));
        app.load().await;

        let (options, selected) = app.view().last_options().unwrap();
        assert_eq!(selected, "2019-2020".parse().unwrap());
        assert_eq!(options.last().unwrap().label, "2019-2020 Season");
        assert!(app.table().unwrap().rows.is_empty());
    }

    #[tokio::test]
    async fn test_season_change_rerenders_without_fetch() {
        let mut app = controller(two_seasons(), FakeHost::ready("https://i.example/a.jpg"));
        app.load().await;
        app.handle(Event::SeasonChanged(SeasonFilter::All)).await;

        assert_eq!(app.endpoint().fetches(), 1);
        assert_eq!(app.table().unwrap().totals, Totals { ducks: 11, geese: 1 });
    }

    #[tokio::test]
    async fn test_non_array_shows_placeholder() {
        let endpoint = FakeEndpoint::with_history(json!({"result": "error"}));
        let mut app = controller(endpoint, FakeHost::ready("https://i.example/a.jpg"));

        assert!(!app.load().await);
        assert!(app.table().is_none());
        assert_eq!(
            app.view().calls.last(),
            Some(&ViewCall::LoadFailure(LOAD_FAILED_PLACEHOLDER.to_string()))
        );
    }

    #[tokio::test]
    async fn test_commit_reloads_with_selected_filter() {
        let mut app = controller(two_seasons(), FakeHost::ready("https://i.example/a.jpg"));
        app.load().await;
        app.select_season("2024-2025".parse().unwrap());

        let outcome = app.submit(form()).await;
        assert_eq!(outcome, SubmitOutcome::Committed);

        let calls = &app.view().calls;
        assert!(calls.contains(&ViewCall::Control(SubmitControl {
            enabled: false,
            label: SUBMITTING_LABEL
        })));
        assert!(calls.contains(&ViewCall::Notice(Notice::Recorded)));
        assert!(calls.contains(&ViewCall::ResetForm));
        assert!(calls.contains(&ViewCall::ClearProvisional));

        // The reload keeps the season the user picked.
        assert_eq!(app.endpoint().fetches(), 2);
        assert_eq!(app.table().unwrap().filter, "2024-2025".parse().unwrap());
        app.select_season("2025-2026".parse().unwrap());
        assert_eq!(app.table().unwrap().rows.len(), 3);
    }

    #[tokio::test]
    async fn test_network_failure_marks_row_errored() {
        let endpoint = two_seasons().offline_submissions();
        let mut app = controller(endpoint, FakeHost::ready("https://i.example/a.jpg"));
        app.load().await;

        assert_eq!(app.submit(form()).await, SubmitOutcome::Failed);

        let calls = &app.view().calls;
        let errored = calls.iter().rev().find_map(|c| match c {
            ViewCall::Provisional(row) => Some(row),
            _ => None,
        });
        assert_eq!(errored.unwrap().status, RowStatus::Errored);
        assert_eq!(
            calls.last(),
            Some(&ViewCall::Control(SubmitControl {
                enabled: true,
                label: RETRY_LABEL
            }))
        );
        assert!(calls.contains(&ViewCall::Notice(Notice::SubmissionFailed)));
        assert!(!calls.contains(&ViewCall::ResetForm));
        // No automatic retry and no reload.
        assert_eq!(app.endpoint().submissions().len(), 1);
        assert_eq!(app.endpoint().fetches(), 1);
    }

    #[tokio::test]
    async fn test_pending_photo_blocks_submission() {
        let mut app = controller(two_seasons(), FakeHost::offline());
        assert!(!app.select_photo(&png()).await);

        let outcome = app.submit(form()).await;
        assert_eq!(outcome, SubmitOutcome::Blocked);

        let calls = &app.view().calls;
        assert!(calls.contains(&ViewCall::Upload(UploadStatus::NetworkError)));
        assert_eq!(calls.last(), Some(&ViewCall::Notice(Notice::PhotoPending)));
        assert!(!calls.iter().any(|c| matches!(c, ViewCall::Provisional(_))));
        assert!(app.endpoint().submissions().is_empty());
    }

    #[tokio::test]
    async fn test_clearing_photo_unblocks_submission() {
        let mut app = controller(two_seasons(), FakeHost::rejecting());
        app.handle(Event::PhotoSelected(png())).await;
        assert!(app.view().calls.contains(&ViewCall::Upload(UploadStatus::ApiError)));

        app.handle(Event::PhotoCleared).await;
        assert_eq!(app.submit(form()).await, SubmitOutcome::Committed);
    }

    #[tokio::test]
    async fn test_uploaded_photo_link_is_posted() {
        let mut app = controller(two_seasons(), FakeHost::ready("https://i.example/mallard.jpg"));
        assert!(app.select_photo(&png()).await);
        assert_eq!(app.photos().uploads(), 1);

        app.submit(form()).await;
        let posted = app.endpoint().submissions();
        assert_eq!(posted[0].photo_link, "https://i.example/mallard.jpg");

        // The link belongs to one entry only.
        app.submit(form()).await;
        assert!(app.endpoint().submissions()[1].photo_link.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_photo() {
        let mut app = controller(two_seasons(), FakeHost::ready("https://i.example/a.jpg"));
        assert!(!app.select_photo(b"GIF? no").await);
        assert_eq!(app.photos().uploads(), 0);
        assert_eq!(
            app.view().calls.last(),
            Some(&ViewCall::Upload(UploadStatus::Unreadable))
        );
    }

    #[tokio::test]
    async fn test_visibility_regained_reloads() {
        let endpoint = two_seasons();
        let mut app = controller(endpoint, FakeHost::ready("https://i.example/a.jpg"));
        app.load().await;

        app.endpoint()
            .set_history(Reply::Json(json!([{"huntDate": "2025-10-04", "ducks": 1}])));
        app.handle(Event::VisibilityRegained).await;

        assert_eq!(app.endpoint().fetches(), 2);
        assert_eq!(app.table().unwrap().totals, Totals { ducks: 1, geese: 0 });
    }

    #[tokio::test]
    async fn test_expand_only_filled_cells() {
        let endpoint = FakeEndpoint::with_history(json!([
            {"huntDate": "2025-10-04", "weather": "", "notes": "Limited out by 8am on greenheads"}
        ]));
        let mut app = controller(endpoint, FakeHost::ready("https://i.example/a.jpg"));
        app.load().await;

        assert!(app.expand(0, Column::Notes));
        assert!(!app.expand(0, Column::Weather));
        assert_eq!(
            app.view().calls.last(),
            Some(&ViewCall::FullText("Limited out by 8am on greenheads".into()))
        );
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_records_for_filtering() {
        let endpoint = two_seasons();
        let mut app = controller(endpoint, FakeHost::ready("https://i.example/a.jpg"));
        app.load().await;

        app.endpoint().set_history(Reply::Status(502));
        assert!(!app.load().await);

        app.select_season(SeasonFilter::All);
        assert_eq!(app.table().unwrap().rows.len(), 3);
        assert_eq!(app.view().calls.last().map(ViewCall::is_table), Some(true));
    }
}
