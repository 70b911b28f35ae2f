//! Infrastructure layer for chemviz.
//!
//! Concrete implementations of the core traits: the HTTP backend client,
//! the filesystem report exporter, and configuration loading.

pub mod config_service;
pub mod file_report_exporter;
pub mod http_dataset_api;
pub mod paths;
pub mod upload_source;

pub use config_service::ConfigService;
pub use file_report_exporter::FileReportExporter;
pub use http_dataset_api::HttpDatasetApi;
pub use paths::ChemvizPaths;
pub use upload_source::load_upload_file;
