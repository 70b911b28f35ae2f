//! Domain layer for the chemical equipment visualizer client.
//!
//! Holds the data model, the authorization context, the read projections
//! and the traits the application layer talks to (`DatasetApi`,
//! `ReportExporter`). Nothing in this crate performs I/O.

pub mod auth;
pub mod config;
pub mod dataset;
pub mod error;
pub mod history;
pub mod projection;
pub mod report;
pub mod session;

pub use error::ChemvizError;
