//! Report exporter that writes PDFs into a directory.
//!
//! The report is written to a temporary file in the target directory,
//! synced, then renamed into place. The temporary file is removed when it
//! is dropped, so a failed save leaves nothing behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chemviz_core::error::{ChemvizError, Result};
use chemviz_core::report::{ExportReceipt, ReportDocument, ReportExporter, default_report_file_name};
use tempfile::NamedTempFile;

/// Saves reports as files under a directory.
#[derive(Debug, Clone)]
pub struct FileReportExporter {
    directory: PathBuf,
}

impl FileReportExporter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl ReportExporter for FileReportExporter {
    async fn export(&self, report: ReportDocument) -> Result<ExportReceipt> {
        let directory = self.directory.clone();
        tokio::task::spawn_blocking(move || write_report(&directory, &report))
            .await
            .map_err(|e| ChemvizError::export(format!("Report writer task failed: {e}")))?
    }
}

fn write_report(directory: &Path, report: &ReportDocument) -> Result<ExportReceipt> {
    std::fs::create_dir_all(directory)?;

    let file_name = Path::new(&report.file_name)
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| default_report_file_name(report.dataset_id).into());
    let target = directory.join(file_name);

    let mut staging = NamedTempFile::new_in(directory)?;
    staging.write_all(&report.bytes)?;
    staging.as_file().sync_all()?;
    staging.persist(&target).map_err(|e| {
        ChemvizError::export(format!("Failed to save {}: {}", target.display(), e.error))
    })?;

    tracing::info!("[Export] Saved report to {}", target.display());
    Ok(ExportReceipt {
        location: target,
        bytes_written: report.bytes.len() as u64,
    })
}
