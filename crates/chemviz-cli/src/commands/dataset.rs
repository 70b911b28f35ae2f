use std::path::Path;

use anyhow::{Context, Result};
use chemviz_application::DatasetSessionController;
use chemviz_core::dataset::DatasetId;
use chemviz_infrastructure::load_upload_file;
use colored::Colorize;

use super::ensure_success;
use crate::render;

/// Rows shown by default before the table is cut off.
pub const PREVIEW_ROWS: usize = 20;

pub async fn latest(controller: &DatasetSessionController) -> Result<()> {
    let (_, latest) = controller.initialize().await;
    ensure_success(&latest, "Unable to load the latest dataset.")?;

    print_dataset(controller, Some(PREVIEW_ROWS)).await;
    Ok(())
}

pub async fn show(controller: &DatasetSessionController, id: DatasetId) -> Result<()> {
    let outcome = controller.select_history_entry(id).await;
    ensure_success(&outcome, &controller.status_message().await)?;

    print_dataset(controller, Some(PREVIEW_ROWS)).await;
    Ok(())
}

pub async fn upload(controller: &DatasetSessionController, path: &Path) -> Result<()> {
    let file = load_upload_file(path)
        .await
        .with_context(|| format!("Cannot upload {}", path.display()))?;

    let outcome = controller.upload(Some(file)).await;
    let status = controller.status_message().await;
    ensure_success(&outcome, &status)?;

    println!("{}", render::status_line(&outcome, &status));
    print_dataset(controller, Some(PREVIEW_ROWS)).await;
    Ok(())
}

/// Prints the current dataset: summary cards, type chart and rows.
pub async fn print_dataset(controller: &DatasetSessionController, row_limit: Option<usize>) {
    let Some(dataset) = controller.current_dataset().await else {
        println!("{}", "No dataset uploaded yet.".bright_black());
        return;
    };

    println!("{} {} (id {})", "Dataset".bold(), dataset.name, dataset.id);
    println!("{}", render::summary_table(&controller.summary_view().await));

    let chart = controller.chart().await;
    if !chart.is_empty() {
        println!("{}", "Equipment types".bold());
        println!("{}", render::bar_chart(&chart, render::BAR_WIDTH).cyan());
    }

    let table = controller.table().await;
    if table.is_empty() {
        return;
    }
    println!("{}", render::data_table(&table, row_limit));
    if let Some(limit) = row_limit
        && table.rows.len() > limit
    {
        let hidden = table.rows.len() - limit;
        println!(
            "{}",
            format!("... {hidden} more rows (use `table` in the shell to see all)").bright_black()
        );
    }
}
