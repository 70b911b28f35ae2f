use anyhow::Result;
use chemviz_application::DatasetSessionController;
use colored::Colorize;

use super::ensure_success;
use crate::render;

pub async fn run(controller: &DatasetSessionController) -> Result<()> {
    let outcome = controller.refresh_history().await;
    ensure_success(&outcome, &controller.status_message().await)?;

    print_history(controller).await;
    Ok(())
}

/// Prints the cached history without fetching it again.
pub async fn print_history(controller: &DatasetSessionController) {
    let history = controller.history().await;
    if history.is_empty() {
        println!("{}", "No uploads yet.".bright_black());
    } else {
        println!("{}", render::history_table(&history));
    }
}
