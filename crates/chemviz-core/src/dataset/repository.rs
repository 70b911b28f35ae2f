//! Backend API trait.
//!
//! Defines the interface the session controller uses to reach the backend.

use async_trait::async_trait;

use super::model::{Dataset, DatasetId, HistoryEntry};
use super::upload::UploadFile;
use crate::auth::AuthConfig;
use crate::error::Result;
use crate::report::ReportDocument;

/// An abstract client for the dataset backend.
///
/// This trait decouples the session controller from the transport (HTTP in
/// production, in-memory mocks in tests). Every call carries the
/// authorization snapshot taken when the request was issued.
#[async_trait]
pub trait DatasetApi: Send + Sync {
    /// Lists recent uploads, in the backend's order.
    async fn fetch_history(&self, auth: &AuthConfig) -> Result<Vec<HistoryEntry>>;

    /// Fetches the most recent dataset.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Dataset))`: A dataset exists
    /// - `Ok(None)`: The backend has no dataset yet (not-found)
    /// - `Err(_)`: Any other failure
    async fn fetch_latest(&self, auth: &AuthConfig) -> Result<Option<Dataset>>;

    /// Fetches one dataset by id.
    async fn fetch_dataset(&self, auth: &AuthConfig, id: DatasetId) -> Result<Dataset>;

    /// Uploads a CSV file and returns the dataset the backend built from it.
    async fn upload(&self, auth: &AuthConfig, file: &UploadFile) -> Result<Dataset>;

    /// Fetches the generated PDF report for a dataset.
    async fn fetch_report(&self, auth: &AuthConfig, id: DatasetId) -> Result<ReportDocument>;
}
