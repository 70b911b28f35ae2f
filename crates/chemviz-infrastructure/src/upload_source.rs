use std::path::Path;

use chemviz_core::dataset::UploadFile;
use chemviz_core::error::{ChemvizError, Result};

/// Reads a CSV file from disk into an [`UploadFile`].
///
/// The upload name is the file's base name; contents are not inspected.
pub async fn load_upload_file(path: &Path) -> Result<UploadFile> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ChemvizError::validation(format!("Not a file: {}", path.display())))?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ChemvizError::io(format!("Failed to read {}: {}", path.display(), e)))?;

    Ok(UploadFile::new(name, bytes))
}
