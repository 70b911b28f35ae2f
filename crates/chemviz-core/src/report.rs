//! Generated report documents and the platform capability that saves them.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::dataset::DatasetId;
use crate::error::Result;

/// A binary report returned by the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub dataset_id: DatasetId,
    /// Suggested file name for saving.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ReportDocument {
    pub fn new(dataset_id: DatasetId, file_name: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            dataset_id,
            file_name: file_name.unwrap_or_else(|| default_report_file_name(dataset_id)),
            bytes,
        }
    }
}

impl fmt::Debug for ReportDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportDocument")
            .field("dataset_id", &self.dataset_id)
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// `dataset-report-{id}.pdf`
pub fn default_report_file_name(dataset_id: DatasetId) -> String {
    format!("dataset-report-{dataset_id}.pdf")
}

/// Where an exported report ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub location: PathBuf,
    pub bytes_written: u64,
}

/// Saves a report on the current platform.
///
/// Implementations own any transient resource they create while saving
/// (temporary files, handles) and must release it whether the save succeeds
/// or fails.
#[async_trait]
pub trait ReportExporter: Send + Sync {
    async fn export(&self, report: ReportDocument) -> Result<ExportReceipt>;
}
