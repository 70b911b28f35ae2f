use std::sync::Arc;

use crate::auth::Credentials;
use crate::dataset::{Dataset, UploadPhase};
use crate::history::HistoryStore;
use crate::report::ExportReceipt;

/// Fixed status lines shown to the user.
pub mod status {
    pub const HISTORY_FAILED: &str = "Unable to fetch history. Check credentials and backend.";
    pub const NO_FILE_SELECTED: &str = "Select a CSV file before uploading.";
    pub const UPLOADING: &str = "Uploading...";
    pub const UPLOAD_SUCCEEDED: &str = "Upload successful.";
    pub const UPLOAD_FAILED: &str = "Upload failed.";
    pub const UPLOAD_IN_PROGRESS: &str = "An upload is already in progress.";
    pub const DATASET_LOADED: &str = "Loaded dataset.";
    pub const DATASET_FAILED: &str = "Unable to load dataset.";
    pub const REPORT_SAVED: &str = "Report saved.";
    pub const REPORT_FAILED: &str = "Failed to download report.";
}

/// Read snapshot of a dataset session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub credentials: Credentials,
    /// Complete dataset or nothing.
    pub current_dataset: Option<Arc<Dataset>>,
    pub history: HistoryStore,
    pub upload_phase: UploadPhase,
    pub status_message: String,
    /// Where the most recent report was saved.
    pub last_report: Option<ExportReceipt>,
}
