use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use url::Url;

use crate::config::PanelConfig;
use crate::types::{ApiResponse, Category, CategoryList, CreateCategoryRequest, CreateScreenshotRequest, UploadFile, UploadProgress};

/// Bytes handed to the transport per progress event.
const UPLOAD_CHUNK: usize = 64 * 1024;

/// Receives byte counts while an upload body is being sent.
pub trait UploadObserver: Send + Sync {
    fn progress(&self, progress: UploadProgress);
}

/// The four backend operations the panel uses.
#[async_trait]
pub trait PanelApi: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn create_category(&self, req: &CreateCategoryRequest) -> Result<ApiResponse>;
    async fn create_screenshot(&self, req: &CreateScreenshotRequest) -> Result<ApiResponse>;
    async fn upload_screenshot(&self, path: &str, file: UploadFile, observer: Arc<dyn UploadObserver>) -> Result<ApiResponse>;
}

/// `PanelApi` over HTTP with reqwest.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
    key: String,
}

impl HttpApi {
    pub fn new(cfg: &PanelConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(cfg.user_agent.clone());
        if let Some(secs) = cfg.timeout_secs { builder = builder.timeout(Duration::from_secs(secs)); }
        let client = builder.build().context("building http client")?;
        Ok(Self { client, base: cfg.base_url()?, key: cfg.api_key.clone().unwrap_or_default() })
    }

    pub fn base_url(&self) -> &Url { &self.base }

    /// Resolve an API path, adding `?key=` when the endpoint is keyed.
    pub(crate) fn endpoint(&self, path: &str, keyed: bool) -> Result<Url> {
        let mut url = self.base.join(path).with_context(|| format!("joining endpoint {path}"))?;
        if keyed { url.query_pairs_mut().append_pair("key", &self.key); }
        Ok(url)
    }

    async fn post_json<T: serde::Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        let url = self.endpoint(path, true)?;
        tracing::debug!(endpoint = path, "POST");
        let resp = self.client.post(url).json(body).send().await.with_context(|| format!("POST {path}"))?;
        resp.json::<ApiResponse>().await.with_context(|| format!("decoding response of {path}"))
    }
}

#[async_trait]
impl PanelApi for HttpApi {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let url = self.endpoint("api/categories", false)?;
        tracing::debug!(endpoint = "api/categories", "GET");
        let resp = self.client.get(url).send().await.context("GET api/categories")?;
        let list: CategoryList = resp.json().await.context("decoding category list")?;
        Ok(list.categories)
    }

    async fn create_category(&self, req: &CreateCategoryRequest) -> Result<ApiResponse> {
        self.post_json("api/categories/create", req).await
    }

    async fn create_screenshot(&self, req: &CreateScreenshotRequest) -> Result<ApiResponse> {
        self.post_json("api/screenshot/create", req).await
    }

    async fn upload_screenshot(&self, path: &str, file: UploadFile, observer: Arc<dyn UploadObserver>) -> Result<ApiResponse> {
        let url = self.endpoint("api/screenshot/upload", true)?;
        let total = file.len();
        let mime = file.mime();
        let part = Part::stream_with_length(progress_body(file.bytes, observer), total)
            .file_name(file.file_name)
            .mime_str(mime)
            .context("setting upload mime type")?;
        let form = Form::new().text("path", path.to_string()).part("file", part);
        tracing::debug!(endpoint = "api/screenshot/upload", %path, total, "POST multipart");
        let resp = self.client.post(url).multipart(form).send().await.context("POST api/screenshot/upload")?;
        resp.json::<ApiResponse>().await.context("decoding upload response")
    }
}

/// Streams `bytes` in chunks, reporting the running total as each chunk is pulled.
///
/// Progress counts bytes handed to the transport, so 100% can be reported
/// slightly before the last bytes leave the socket.
fn progress_body(bytes: Vec<u8>, observer: Arc<dyn UploadObserver>) -> Body {
    Body::wrap_stream(progress_stream(bytes, observer))
}

fn progress_stream(
    bytes: Vec<u8>,
    observer: Arc<dyn UploadObserver>,
) -> impl futures::Stream<Item = std::io::Result<Bytes>> + Send + Sync + 'static {
    let buf = Bytes::from(bytes);
    let total = buf.len() as u64;
    let offsets: Vec<usize> = (0..buf.len()).step_by(UPLOAD_CHUNK).collect();
    futures::stream::iter(offsets).map(move |start| {
        let end = (start + UPLOAD_CHUNK).min(buf.len());
        observer.progress(UploadProgress { loaded: end as u64, total });
        Ok(buf.slice(start..end))
    })
}
