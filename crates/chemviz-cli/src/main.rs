use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chemviz_application::DatasetSessionController;
use chemviz_core::config::{ConfigOverrides, SessionConfig};
use chemviz_core::dataset::DatasetId;
use chemviz_infrastructure::{ConfigService, FileReportExporter, HttpDatasetApi};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

#[derive(Parser, Debug)]
#[command(name = "chemviz", version)]
#[command(about = "Chemviz - browse, upload and report on chemical equipment datasets", long_about = None)]
struct Cli {
    /// Backend API base URL (overrides config file and CHEMVIZ_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Username for HTTP Basic authentication
    #[arg(long, short = 'u', global = true)]
    username: Option<String>,

    /// Password for HTTP Basic authentication
    #[arg(long, global = true)]
    password: Option<String>,

    /// Directory where downloaded reports are saved
    #[arg(long, global = true, value_name = "DIR")]
    report_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// List recent uploads
    History,
    /// Show the most recently uploaded dataset
    Latest,
    /// Load and show a dataset by id
    Show { id: DatasetId },
    /// Upload a CSV file
    Upload { path: PathBuf },
    /// Save the PDF report of a dataset (latest if no id is given)
    Report { id: Option<DatasetId> },
    /// Start an interactive session
    Shell,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_url: self.api_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            report_dir: self.report_dir.clone(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ConfigService::new()
        .load(&cli.overrides())
        .context("Failed to load configuration")?;
    tracing::info!("[Bootstrap] Using backend at {}", config.api_url);
    let controller = build_controller(&config);

    match cli.command {
        Commands::History => commands::history::run(&controller).await,
        Commands::Latest => commands::dataset::latest(&controller).await,
        Commands::Show { id } => commands::dataset::show(&controller, id).await,
        Commands::Upload { path } => commands::dataset::upload(&controller, &path).await,
        Commands::Report { id } => commands::report::run(&controller, id).await,
        Commands::Shell => commands::shell::run(&controller, &config).await,
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn build_controller(config: &SessionConfig) -> DatasetSessionController {
    let api = Arc::new(HttpDatasetApi::from_config(config));
    let exporter = Arc::new(FileReportExporter::new(config.report_dir.clone()));
    DatasetSessionController::from_config(config, api, exporter)
}
