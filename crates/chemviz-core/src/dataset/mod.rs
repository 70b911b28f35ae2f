//! Dataset domain: wire model, upload payload and the backend API seam.

mod model;
mod repository;
mod upload;

pub use model::{Dataset, DatasetId, HistoryEntry, Row, Summary, TypeDistribution};
pub use repository::DatasetApi;
pub use upload::{UploadFile, UploadPhase};
