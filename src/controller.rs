use std::sync::Arc;

use crate::api::{PanelApi, UploadObserver};
use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::types::UploadProgress;
use crate::view::{category_options, FormId, PanelView};

/// Where an upload submission stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Refused before any request (no file, or file too large).
    Rejected,
    /// The metadata record was not created; nothing was uploaded.
    CreateFailed,
    /// The record exists at `path` but the file transfer failed.
    UploadFailed { path: String },
    Uploaded { path: String },
}

impl UploadOutcome {
    pub fn is_uploaded(&self) -> bool { matches!(self, Self::Uploaded { .. }) }
}

/// Drives the view's progress bar from upload byte counts.
struct ProgressBar<V>(Arc<V>);

impl<V: PanelView> UploadObserver for ProgressBar<V> {
    fn progress(&self, progress: UploadProgress) {
        if let Some(percent) = progress.percent() {
            self.0.set_progress_width(percent);
        }
    }
}

/// The admin panel: form handlers wired to an API client and a view.
///
/// Handlers take `&self` and never coordinate with each other, so a shared
/// `Arc<Panel<_, _>>` can serve concurrent submissions.
pub struct Panel<A, V> {
    api: A,
    view: Arc<V>,
    max_upload_bytes: u64,
}

impl<A: PanelApi, V: PanelView + 'static> Panel<A, V> {
    pub fn new(api: A, view: Arc<V>) -> Self {
        Self { api, view, max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES }
    }

    pub fn with_max_upload_bytes(mut self, max: u64) -> Self {
        self.max_upload_bytes = max;
        self
    }

    pub fn api(&self) -> &A { &self.api }
    pub fn view(&self) -> &Arc<V> { &self.view }

    /// Initial data load.
    pub async fn init(&self) -> bool { self.update_categories().await }

    /// Refill every category select from the backend. Returns false if the fetch failed.
    pub async fn update_categories(&self) -> bool {
        self.view.set_loading(FormId::Upload, true);
        self.view.set_loading(FormId::CreateCategory, true);

        let ok = match self.api.list_categories().await {
            Ok(categories) => {
                let options = category_options(&categories);
                for select in self.view.category_selects() {
                    self.view.clear_select(select);
                    for option in &options {
                        self.view.add_option(select, option.clone());
                    }
                }
                tracing::info!(count = categories.len(), "categories loaded");
                true
            }
            Err(e) => {
                tracing::error!("loading categories failed: {e:#}");
                false
            }
        };

        self.view.set_loading(FormId::Upload, false);
        self.view.set_loading(FormId::CreateCategory, false);
        ok
    }

    pub fn on_metadata_add(&self) {
        self.view.add_metadata_row();
    }

    /// Create the screenshot record, then upload its file.
    pub async fn on_upload_submit(&self) -> UploadOutcome {
        self.view.set_loading(FormId::Upload, true);

        let fields = self.view.upload_fields();
        let req = fields.to_request(&self.view.metadata_rows());

        let file = match fields.file {
            Some(f) if f.len() > self.max_upload_bytes => {
                tracing::error!(file = %f.file_name, size = f.len(), max = self.max_upload_bytes, "file too large");
                self.view.set_loading(FormId::Upload, false);
                return UploadOutcome::Rejected;
            }
            Some(f) => f,
            None => {
                tracing::error!("no file selected");
                self.view.set_loading(FormId::Upload, false);
                return UploadOutcome::Rejected;
            }
        };

        let created = self.api.create_screenshot(&req).await.and_then(|r| r.into_result());
        let path = match created.map(|r| r.path) {
            Ok(Some(path)) => path,
            Ok(None) => {
                tracing::error!("create screenshot: response has no path");
                self.view.set_loading(FormId::Upload, false);
                return UploadOutcome::CreateFailed;
            }
            Err(e) => {
                tracing::error!("create screenshot failed: {e:#}");
                self.view.set_loading(FormId::Upload, false);
                return UploadOutcome::CreateFailed;
            }
        };
        tracing::debug!(%path, "screenshot record created");

        self.view.set_progress_visible(true);
        self.view.set_loading(FormId::Upload, true);
        let observer: Arc<dyn UploadObserver> = Arc::new(ProgressBar(self.view.clone()));
        let uploaded = self.api.upload_screenshot(&path, file, observer).await.and_then(|r| r.into_result());
        self.view.set_progress_visible(false);
        self.view.set_loading(FormId::Upload, false);

        match uploaded {
            Ok(_) => {
                tracing::info!(%path, "screenshot uploaded");
                UploadOutcome::Uploaded { path }
            }
            Err(e) => {
                tracing::error!(%path, "upload failed: {e:#}");
                UploadOutcome::UploadFailed { path }
            }
        }
    }

    /// Create a category and refresh the selects on success.
    pub async fn on_create_category_submit(&self) -> bool {
        self.view.set_loading(FormId::CreateCategory, true);
        let req = self.view.category_fields().to_request();

        match self.api.create_category(&req).await.and_then(|r| r.into_result()) {
            Ok(res) => {
                tracing::info!(name = %req.name, path = res.path.as_deref().unwrap_or(""), "category created");
                self.view.set_loading(FormId::CreateCategory, false);
                self.update_categories().await;
                true
            }
            Err(e) => {
                tracing::error!("create category failed: {e:#}");
                self.view.set_loading(FormId::CreateCategory, false);
                false
            }
        }
    }
}
