pub mod dataset;
pub mod history;
pub mod report;
pub mod shell;

use anyhow::Result;
use chemviz_core::session::Outcome;

/// Turns a failed outcome into an error whose context is the status line.
pub(crate) fn ensure_success(outcome: &Outcome, status_message: &str) -> Result<()> {
    match outcome.error() {
        Some(err) => Err(anyhow::Error::new(err.clone()).context(status_message.to_string())),
        None => Ok(()),
    }
}
