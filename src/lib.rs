pub mod api;
pub mod config;
pub mod controller;
pub mod form;
pub mod types;
pub mod view;

/// Types needed to drive a `Panel` from another program.
pub mod prelude {
    pub use crate::api::{HttpApi, PanelApi, UploadObserver};
    pub use crate::config::PanelConfig;
    pub use crate::controller::{Panel, UploadOutcome};
    pub use crate::form::{CategoryFields, MetadataRow, UploadFields};
    pub use crate::types::{ApiResponse, Category, Metadata, UploadFile, UploadProgress};
    pub use crate::view::{FormId, MemoryView, PanelView, SelectId, SelectOption};
}

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::api::HttpApi;
use crate::config::PanelConfig;
use crate::controller::Panel;
use crate::types::UploadFile;
use crate::view::MemoryView;

/// A panel talking HTTP to the backend, backed by an in-memory form model.
pub type HttpPanel = Panel<HttpApi, MemoryView>;

/// Build a panel from configuration. Does not contact the backend.
pub fn connect(cfg: &PanelConfig) -> Result<HttpPanel> {
    let api = HttpApi::new(cfg)?;
    tracing::debug!(base = %api.base_url(), "panel configured");
    Ok(Panel::new(api, Arc::new(MemoryView::new())).with_max_upload_bytes(cfg.max_upload_bytes))
}

/// Read a file from disk for the upload form, refusing files over `max_bytes`
/// before any of it is loaded.
pub async fn read_upload_file(path: &Path, max_bytes: u64) -> Result<UploadFile> {
    let meta = tokio::fs::metadata(path).await.with_context(|| format!("reading {}", path.display()))?;
    if meta.len() > max_bytes {
        bail!("{} is {} bytes, over the {} byte upload limit", path.display(), meta.len(), max_bytes);
    }
    let bytes = tokio::fs::read(path).await.with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());
    Ok(UploadFile::new(file_name, bytes))
}
