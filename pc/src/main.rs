//! precode - interactive product ideation wizard
//!
//! CLI entry point: wizard runs, one-shot normalize/render, and saved-session
//! inspection.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::info;

use precode::cli::{Cli, Command, SessionsCommand, generate_after_help, get_log_path};
use precode::config::Config;
use precode::diagram::{DiagramRenderer, MmdcRenderer, normalize};
use precode::llm::create_client;
use precode::persist::SessionSaver;
use precode::wizard::WizardSession;
use sessionstore::SessionStore;

fn setup_logging(level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    if let Some(dir) = log_path.parent() {
        fs::create_dir_all(dir).context("Failed to create log directory")?;
    }

    // CLI flag wins over config; INFO is the floor
    let level = level.unwrap_or("info");
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    let directive = level.parse().unwrap_or(tracing::Level::INFO.into());

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .init();

    info!("Logging initialized (level: {})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Build command with dynamic after_help that shows tool status
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // CLI flag wins; otherwise peek at the config chain before the full load
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| Config::load_log_level(cli.config.as_ref()));
    setup_logging(log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!(
        "precode loaded config: provider={}, model={}",
        config.generation.provider, config.generation.model
    );

    match cli.command {
        Some(Command::Run { idea }) => cmd_run(&config, idea).await,
        Some(Command::Normalize { file }) => cmd_normalize(&file),
        Some(Command::Render { file, output }) => cmd_render(&config, &file, output).await,
        Some(Command::Sessions { command }) => cmd_sessions(&config, command).await,
        None => print_help_with_status(),
    }
}

/// Print help with external tool status
fn print_help_with_status() -> Result<()> {
    let mut cmd = Cli::command();
    cmd.print_help()?;
    println!();
    println!();
    print!("{}", generate_after_help());
    Ok(())
}

/// Run the interactive wizard
async fn cmd_run(config: &Config, idea: Option<String>) -> Result<()> {
    // Fail fast on missing secrets before any interaction
    config.validate()?;

    let llm = create_client(&config.generation).map_err(|e| eyre::eyre!("Failed to create generation client: {}", e))?;
    let mut session = WizardSession::new(config, Arc::clone(&llm))?;
    session.run(idea).await
}

/// Normalize flowchart markup from a file or stdin
fn cmd_normalize(file: &str) -> Result<()> {
    let input = if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(file).context(format!("Failed to read {}", file))?
    };

    println!("{}", normalize(&input));
    Ok(())
}

/// Render flowchart markup to SVG
async fn cmd_render(config: &Config, file: &PathBuf, output: Option<PathBuf>) -> Result<()> {
    let input = fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;
    let markup = normalize(&input);

    let renderer = MmdcRenderer::from_config(&config.render);
    let svg = renderer
        .render(&markup)
        .await
        .map_err(|e| eyre::eyre!("Render failed: {}", e))?;

    let output = output.unwrap_or_else(|| file.with_extension("svg"));
    fs::write(&output, svg).context(format!("Failed to write {}", output.display()))?;
    println!("Rendered to {}", output.display());
    Ok(())
}

/// Inspect saved sessions
///
/// List and delete operate on the local store only; show prefers the remote
/// copy when one is configured, since a remote save skips the local store.
async fn cmd_sessions(config: &Config, command: SessionsCommand) -> Result<()> {
    let store = SessionStore::open(&config.storage.store_dir)?;

    match command {
        SessionsCommand::List => {
            let sessions = store.list()?;
            if sessions.is_empty() {
                println!("No saved sessions.");
                return Ok(());
            }
            for id in sessions {
                println!("{}", id);
            }
        }
        SessionsCommand::Show { session_id } => {
            let saver = SessionSaver::from_config(&config.storage)?;
            let record = saver.load(&session_id).await?;
            println!("{} {}", "Session:".bright_cyan(), record.session_id);
            println!(
                "Messages: {} ({} user, {} assistant)",
                record.summary.total_messages, record.summary.user_messages, record.summary.assistant_messages
            );
            if let Some(vm) = &record.vision_mission {
                println!("{} {}", "Vision:".bright_cyan(), vm.vision);
                println!("{} {}", "Mission:".bright_cyan(), vm.mission);
            }
            if !record.selected_features.is_empty() {
                println!("{} {}", "Features:".bright_cyan(), record.selected_features.join(", "));
            }
            println!();
            for msg in &record.transcript {
                let role = if msg.role == "user" {
                    msg.role.bright_green()
                } else {
                    msg.role.bright_blue()
                };
                println!("{}: {}", role, msg.text);
            }
            if let Some(diagram) = &record.diagram {
                println!();
                println!("{}", "Diagram:".bright_cyan());
                println!("{}", diagram);
            }
        }
        SessionsCommand::Delete { session_id } => {
            store.delete(&session_id)?;
            println!("Deleted session {}", session_id);
        }
    }

    Ok(())
}
