//! Interactive session on top of the dataset controller.
//!
//! Credentials entered with `login` are published to the controller's
//! [`AuthContext`](chemviz_core::auth::AuthContext); the controller observes
//! the change and reloads history and the latest dataset.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;

use anyhow::Result;
use chemviz_application::DatasetSessionController;
use chemviz_core::auth::Credentials;
use chemviz_core::config::SessionConfig;
use chemviz_core::dataset::DatasetId;
use chemviz_core::session::Outcome;
use chemviz_infrastructure::load_upload_file;
use colored::{ColoredString, Colorize};
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use super::{dataset, history, report};
use crate::render;

const COMMANDS: &[(&str, &str)] = &[
    ("login", "login <user> <password>   switch credentials and reload"),
    ("upload", "upload <path>             upload a CSV file"),
    ("history", "history                   list recent uploads"),
    ("select", "select <n>                load history entry number n"),
    ("open", "open <id>                 load a dataset by id"),
    ("show", "show                      summary, chart and preview of the current dataset"),
    ("table", "table                     all rows of the current dataset"),
    ("report", "report                    save the PDF report of the current dataset"),
    ("refresh", "refresh                   reload the history"),
    ("status", "status                    session status"),
    ("help", "help                      this list"),
    ("quit", "quit                      leave the shell"),
];

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq)]
enum ShellCommand {
    Login { username: String, password: String },
    /// `None` when no path was given; the controller reports it.
    Upload(Option<PathBuf>),
    History,
    /// 1-based position in the history listing.
    Select(usize),
    Open(DatasetId),
    Show,
    Table,
    Report,
    Refresh,
    Status,
    Help,
    Quit,
}

impl ShellCommand {
    fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let (name, rest) = line
            .split_once(char::is_whitespace)
            .map(|(name, rest)| (name, rest.trim()))
            .unwrap_or((line, ""));

        let command = match name {
            "login" => {
                let mut args = rest.split_whitespace();
                match (args.next(), args.next(), args.next()) {
                    (Some(username), Some(password), None) => Self::Login {
                        username: username.to_string(),
                        password: password.to_string(),
                    },
                    _ => return Err("usage: login <user> <password>".to_string()),
                }
            }
            "upload" => Self::Upload((!rest.is_empty()).then(|| PathBuf::from(rest))),
            "select" => {
                let position = rest
                    .parse::<usize>()
                    .ok()
                    .filter(|position| *position >= 1)
                    .ok_or_else(|| "usage: select <n> (n starts at 1)".to_string())?;
                Self::Select(position)
            }
            "open" => {
                let id = rest
                    .parse::<DatasetId>()
                    .map_err(|_| "usage: open <id>".to_string())?;
                Self::Open(id)
            }
            "history" => Self::History,
            "show" => Self::Show,
            "table" => Self::Table,
            "report" => Self::Report,
            "refresh" => Self::Refresh,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("Unknown command '{other}'. Type 'help'.")),
        };

        let takes_args = matches!(
            command,
            Self::Login { .. } | Self::Upload(_) | Self::Select(_) | Self::Open(_)
        );
        if !takes_args && !rest.is_empty() {
            return Err(format!("'{name}' takes no arguments"));
        }
        Ok(command)
    }
}

/// rustyline helper: command completion and hints, file completion for
/// `upload`.
struct ShellHelper {
    files: FilenameCompleter,
}

impl ShellHelper {
    fn new() -> Self {
        Self {
            files: FilenameCompleter::new(),
        }
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];

        if prefix.starts_with("upload ") {
            return self.files.complete(line, pos, ctx);
        }

        if prefix.contains(' ') {
            return Ok((pos, Vec::new()));
        }

        let candidates = COMMANDS
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, _)| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let name = line.split_whitespace().next().unwrap_or("");
        if COMMANDS.iter().any(|(command, _)| *command == name) {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let prefix = &line[..pos];
        if prefix.is_empty() || prefix.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|(name, _)| name.starts_with(prefix) && name.len() > prefix.len())
            .map(|(name, _)| name[prefix.len()..].to_string())
    }
}

impl Validator for ShellHelper {}

pub async fn run(controller: &DatasetSessionController, config: &SessionConfig) -> Result<()> {
    let mut rl: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ShellHelper::new()));

    println!("{}", "=== Chemviz Shell ===".bright_magenta().bold());
    println!(
        "{}",
        format!(
            "Backend {} as '{}'. Type 'help' for commands, 'quit' to exit.",
            config.api_url,
            controller.auth().snapshot().username()
        )
        .bright_black()
    );
    println!();

    let (history_outcome, _) = controller.initialize().await;
    if let Outcome::Failed(_) = history_outcome {
        println!(
            "{}",
            render::status_line(&history_outcome, &controller.status_message().await)
        );
    }

    loop {
        match rl.readline("chemviz> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match ShellCommand::parse(&line) {
                    Ok(ShellCommand::Quit) => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Ok(command) => {
                        if let Err(e) = execute(controller, command).await {
                            eprintln!("{}", format!("Error: {e:#}").red());
                        }
                    }
                    Err(message) => println!("{}", message.yellow()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    Ok(())
}

async fn execute(controller: &DatasetSessionController, command: ShellCommand) -> Result<()> {
    match command {
        ShellCommand::Login { username, password } => {
            controller.set_credentials(Credentials::new(username.clone(), password));
            match controller.on_credentials_changed().await {
                Some((history_outcome, _)) => {
                    let message = controller.status_message().await;
                    println!("{}", login_summary(&history_outcome, &message, &username));
                    if history_outcome.error().is_none() {
                        history::print_history(controller).await;
                    }
                }
                None => println!("{}", "Credentials unchanged.".bright_black()),
            }
        }
        ShellCommand::Upload(path) => {
            let file = match path {
                Some(path) => Some(load_upload_file(&path).await?),
                None => None,
            };
            let outcome = controller.upload(file).await;
            print_status(controller, &outcome).await;
            if outcome.is_applied() {
                dataset::print_dataset(controller, Some(dataset::PREVIEW_ROWS)).await;
            }
        }
        ShellCommand::History => history::print_history(controller).await,
        ShellCommand::Select(position) => {
            let outcome = controller.select_history_item(position - 1).await;
            print_status(controller, &outcome).await;
            if outcome.is_applied() {
                dataset::print_dataset(controller, Some(dataset::PREVIEW_ROWS)).await;
            }
        }
        ShellCommand::Open(id) => {
            let outcome = controller.select_history_entry(id).await;
            print_status(controller, &outcome).await;
            if outcome.is_applied() {
                dataset::print_dataset(controller, Some(dataset::PREVIEW_ROWS)).await;
            }
        }
        ShellCommand::Show => {
            dataset::print_dataset(controller, Some(dataset::PREVIEW_ROWS)).await;
        }
        ShellCommand::Table => {
            let table = controller.table().await;
            if table.is_empty() {
                println!("{}", "No rows to show.".bright_black());
            } else {
                println!("{}", render::data_table(&table, None));
            }
        }
        ShellCommand::Report => report::save(controller).await?,
        ShellCommand::Refresh => {
            let outcome = controller.refresh_history().await;
            if outcome.error().is_some() {
                print_status(controller, &outcome).await;
            } else {
                history::print_history(controller).await;
            }
        }
        ShellCommand::Status => print_session(controller).await,
        ShellCommand::Help => print_help(),
        ShellCommand::Quit => {}
    }
    Ok(())
}

async fn print_status(controller: &DatasetSessionController, outcome: &Outcome) {
    let message = controller.status_message().await;
    if !message.is_empty() {
        println!("{}", render::status_line(outcome, &message));
    }
}

async fn print_session(controller: &DatasetSessionController) {
    let state = controller.snapshot().await;
    let dataset = state
        .current_dataset
        .as_ref()
        .map(|dataset| format!("{} (id {})", dataset.name, dataset.id))
        .unwrap_or_else(|| "none".to_string());

    println!("{:<10} {}", "User".bold(), state.credentials.username);
    println!("{:<10} {}", "Dataset".bold(), dataset);
    println!("{:<10} {} entries", "History".bold(), state.history.len());
    println!("{:<10} {:?}", "Upload".bold(), state.upload_phase);
    if !state.status_message.is_empty() {
        println!("{:<10} {}", "Status".bold(), state.status_message);
    }
    if let Some(receipt) = &state.last_report {
        println!("{:<10} {}", "Report".bold(), receipt.location.display());
    }
}

fn print_help() {
    println!("{}", "Commands:".bold());
    for (_, usage) in COMMANDS {
        println!("  {usage}");
    }
}

/// Line shown after a login, based on how the history reload ended.
fn login_summary(history: &Outcome, status_message: &str, username: &str) -> ColoredString {
    match history {
        Outcome::Failed(_) => render::status_line(history, status_message),
        _ => format!("Logged in as '{username}'.").green(),
    }
}
