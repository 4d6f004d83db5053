// noteit - note synchronization client
// Entry point and command line handling

use anyhow::Context;
use clap::{Parser, Subcommand};
use noteit::app;
use noteit::config;
use noteit::database::Category;
use noteit::render::console::{ConsoleFormat, ConsoleSink};
use noteit::render::format::unescape_html;
use noteit::services::{ActionOutcome, NotesOrchestrator, SettingsService};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "noteit", version, about = "Manage active, archived and trashed notes")]
struct Cli {
    /// Data directory holding settings and local databases
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Settings file (defaults to <data-dir>/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print frames as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the notes of a category
    List {
        #[arg(long, short, default_value = "active")]
        category: Category,
    },
    /// Create a note in the active category
    Create { title: String, content: String },
    /// Replace a note's title and content
    Edit {
        id: String,
        title: String,
        content: String,
    },
    /// Move a note to another category
    Move { id: String, category: Category },
    /// Permanently delete a note
    Delete {
        id: String,
        /// Category to show afterwards
        #[arg(long, short, default_value = "trash")]
        category: Category,
    },
    /// Show one note in detail
    Show {
        id: String,
        #[arg(long, short, default_value = "active")]
        category: Category,
    },
    /// Write the default settings file
    InitConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so stdout only carries rendered notes
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "noteit=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let data_dir = match cli.data_dir.clone() {
        Some(dir) => dir,
        None => app::default_data_dir()?,
    };
    let settings_service = match &cli.config {
        Some(path) => SettingsService::from_file(path.clone()),
        None => SettingsService::new(data_dir.clone()),
    };

    if let Command::InitConfig = cli.command {
        let settings = settings_service.load().await?;
        settings_service.save(&settings).await?;
        println!("{}", settings_service.path().display());
        return Ok(ExitCode::SUCCESS);
    }

    let settings = settings_service
        .load()
        .await
        .with_context(|| format!("loading settings from {:?}", settings_service.path()))?;

    let format = if cli.json {
        ConsoleFormat::Json
    } else {
        ConsoleFormat::Text
    };
    let orchestrator = app::setup(&settings, &data_dir, Arc::new(ConsoleSink::new(format)))
        .await
        .context("initializing note sources")?;

    tracing::info!("Starting noteit");

    run(&orchestrator, cli.command, cli.json).await
}

async fn run(
    orchestrator: &NotesOrchestrator,
    command: Command,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let outcome = match command {
        Command::List { category } => {
            orchestrator.state().categories.set(category);
            orchestrator.refresh().await;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Create { title, content } => orchestrator.create(&title, &content).await,
        Command::Edit { id, title, content } => orchestrator.edit(&id, &title, &content).await,
        Command::Move { id, category } => {
            // Follow the note into its new category
            orchestrator.state().categories.set(category);
            orchestrator.change_category(&id, category).await
        }
        Command::Delete { id, category } => {
            orchestrator.state().categories.set(category);
            orchestrator.delete(&id).await
        }
        Command::Show { id, category } => {
            orchestrator.state().categories.set(category);
            orchestrator.refresh().await;
            return match orchestrator.open_note(&id) {
                Some(view) if json => {
                    println!("{}", serde_json::to_string_pretty(&view)?);
                    Ok(ExitCode::SUCCESS)
                }
                Some(view) => {
                    println!("{}\n", unescape_html(&view.title_html));
                    let lines: Vec<String> = view
                        .content_html
                        .split(config::LINE_BREAK_MARKUP)
                        .map(unescape_html)
                        .collect();
                    println!("{}\n", lines.join("\n"));
                    println!("{}", view.created_label);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("Note {} is not in {}", id, category);
                    Ok(ExitCode::FAILURE)
                }
            };
        }
        Command::InitConfig => return Ok(ExitCode::SUCCESS),
    };

    Ok(match outcome {
        ActionOutcome::Completed(_) => ExitCode::SUCCESS,
        ActionOutcome::WriteFailed(_) | ActionOutcome::ValidationFailed => ExitCode::FAILURE,
    })
}
