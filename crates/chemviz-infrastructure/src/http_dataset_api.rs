//! HttpDatasetApi - REST client for the dataset backend.
//!
//! Every request carries HTTP Basic credentials from the caller's
//! [`AuthConfig`] snapshot and a per-request timeout.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chemviz_core::auth::AuthConfig;
use chemviz_core::config::{RequestTimeouts, SessionConfig};
use chemviz_core::dataset::{Dataset, DatasetApi, DatasetId, HistoryEntry, UploadFile};
use chemviz_core::error::{ChemvizError, Result};
use chemviz_core::report::ReportDocument;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

const DEFAULT_UPLOAD_MIME: &str = "text/csv";

/// [`DatasetApi`] implementation over HTTP.
#[derive(Clone)]
pub struct HttpDatasetApi {
    client: Client,
    base_url: String,
    timeouts: RequestTimeouts,
}

/// Error body returned by the backend on rejected uploads.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    #[serde(default)]
    missing: Vec<String>,
}

impl HttpDatasetApi {
    /// Creates a client for the given base URL (e.g. `http://127.0.0.1:8000/api`).
    pub fn new(base_url: impl Into<String>, timeouts: RequestTimeouts) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeouts,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.api_url.clone(), config.timeouts)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn get(&self, auth: &AuthConfig, path: &str, timeout: Duration) -> RequestBuilder {
        let url = self.endpoint(path);
        tracing::debug!("[Http] GET {}", url);
        self.client
            .get(url)
            .basic_auth(auth.username(), Some(auth.password()))
            .timeout(timeout)
    }

    /// Sends the request and maps non-success statuses to [`ChemvizError`].
    async fn send(
        &self,
        request: RequestBuilder,
        entity_type: &'static str,
        id: String,
    ) -> Result<Response> {
        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!("[Http] {} {} failed with {}", entity_type, id, status);
        Err(classify_failure(status.as_u16(), &body, entity_type, id))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await.map_err(transport_error)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl DatasetApi for HttpDatasetApi {
    async fn fetch_history(&self, auth: &AuthConfig) -> Result<Vec<HistoryEntry>> {
        let request = self.get(auth, "history/", self.timeouts.read);
        let response = self.send(request, "History", String::new()).await?;
        Self::decode(response).await
    }

    async fn fetch_latest(&self, auth: &AuthConfig) -> Result<Option<Dataset>> {
        let request = self.get(auth, "datasets/latest/", self.timeouts.read);
        match self.send(request, "Dataset", "latest".to_string()).await {
            Ok(response) => Self::decode(response).await.map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch_dataset(&self, auth: &AuthConfig, id: DatasetId) -> Result<Dataset> {
        let request = self.get(auth, &format!("datasets/{id}/"), self.timeouts.read);
        let response = self.send(request, "Dataset", id.to_string()).await?;
        Self::decode(response).await
    }

    async fn upload(&self, auth: &AuthConfig, file: &UploadFile) -> Result<Dataset> {
        let mime = mime_guess::from_path(&file.name)
            .first()
            .map(|mime| mime.to_string())
            .unwrap_or_else(|| DEFAULT_UPLOAD_MIME.to_string());
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&mime)
            .map_err(|e| ChemvizError::validation(format!("Invalid content type {mime}: {e}")))?;
        let form = Form::new().part("file", part);

        let url = self.endpoint("upload/");
        tracing::debug!("[Http] POST {} ({} bytes)", url, file.bytes.len());
        let request = self
            .client
            .post(url)
            .basic_auth(auth.username(), Some(auth.password()))
            .multipart(form)
            .timeout(self.timeouts.upload);

        let response = self.send(request, "Upload", file.name.clone()).await?;
        Self::decode(response).await
    }

    async fn fetch_report(&self, auth: &AuthConfig, id: DatasetId) -> Result<ReportDocument> {
        let request = self.get(auth, &format!("report/{id}/"), self.timeouts.report);
        let response = self.send(request, "Report", id.to_string()).await?;

        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_content_disposition);
        let bytes = response.bytes().await.map_err(transport_error)?;

        Ok(ReportDocument::new(id, file_name, bytes.to_vec()))
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn transport_error(err: reqwest::Error) -> ChemvizError {
    if err.is_timeout() {
        ChemvizError::network(format!("request timed out: {err}"))
    } else if err.is_decode() {
        ChemvizError::Serialization {
            format: "HTTP body".to_string(),
            message: err.to_string(),
        }
    } else {
        ChemvizError::network(err.to_string())
    }
}

/// Maps a non-success status and its body to an error.
///
/// 401/403 become `Auth`, 404 becomes `NotFound`, anything else is a
/// `Server` error carrying the body's `error` text when there is one.
fn classify_failure(
    status: u16,
    body: &str,
    entity_type: &'static str,
    id: impl Into<String>,
) -> ChemvizError {
    match status {
        401 | 403 => ChemvizError::Auth { status },
        404 => ChemvizError::not_found(entity_type, id),
        _ => ChemvizError::server(status, server_message(body)),
    }
}

fn server_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let error = parsed.error.filter(|text| !text.trim().is_empty())?;
    if parsed.missing.is_empty() {
        Some(error)
    } else {
        Some(format!("{}: {}", error, parsed.missing.join(", ")))
    }
}

/// Extracts the `filename` parameter of a `Content-Disposition` header.
///
/// Only the final path component is kept.
fn filename_from_content_disposition(header: &str) -> Option<String> {
    let raw = header.split(';').map(str::trim).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("filename")
            .then(|| value.trim().trim_matches('"'))
    })?;

    Path::new(raw)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
