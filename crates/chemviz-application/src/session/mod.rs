//! Session application services.
//!
//! The controller owns the authoritative session state. Generation counters
//! keep out-of-order responses from overwriting newer state, and the upload
//! guard keeps at most one upload in flight.

mod controller;
mod generation;
mod upload_guard;

pub use controller::DatasetSessionController;
pub use generation::{Generation, GenerationCounter};
