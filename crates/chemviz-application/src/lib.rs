//! Application layer for chemviz.
//!
//! Hosts the dataset session controller, which coordinates the backend API,
//! the authorization context and the report exporter on behalf of a UI.

pub mod session;

pub use session::DatasetSessionController;
