//! Session state shared between the controller and its readers.

mod outcome;
mod state;

pub use outcome::Outcome;
pub use state::{SessionState, status};
