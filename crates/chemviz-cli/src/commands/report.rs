use anyhow::{Result, bail};
use chemviz_application::DatasetSessionController;
use chemviz_core::dataset::DatasetId;
use chemviz_core::session::Outcome;

use super::ensure_success;
use crate::render;

pub async fn run(controller: &DatasetSessionController, id: Option<DatasetId>) -> Result<()> {
    let loaded = match id {
        Some(id) => controller.select_history_entry(id).await,
        None => controller.initialize().await.1,
    };
    ensure_success(&loaded, &controller.status_message().await)?;

    save(controller).await
}

/// Downloads the report of the current dataset and prints where it went.
pub async fn save(controller: &DatasetSessionController) -> Result<()> {
    let outcome = controller.download_report().await;
    if outcome == Outcome::Skipped {
        bail!("No dataset loaded; nothing to report");
    }

    let state = controller.snapshot().await;
    ensure_success(&outcome, &state.status_message)?;

    let line = render::status_line(&outcome, &state.status_message);
    match state.last_report {
        Some(receipt) => println!("{} {}", line, receipt.location.display()),
        None => println!("{line}"),
    }
    Ok(())
}
