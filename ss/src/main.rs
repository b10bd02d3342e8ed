use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use sessionstore::SessionStore;
use sessionstore::cli::Cli;
use sessionstore::config::Config;

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("sessionstore starting");

    match cli.command {
        sessionstore::cli::Command::List => {
            let store = SessionStore::open(&config.store_path)?;
            let sessions = store.list()?;
            if sessions.is_empty() {
                println!("No sessions found");
            } else {
                for session in sessions {
                    println!("{}", session);
                }
            }
        }
        sessionstore::cli::Command::Show { session_id } => {
            let store = SessionStore::open(&config.store_path)?;
            let record = store.load(&session_id)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        sessionstore::cli::Command::Stats { session_id } => {
            let store = SessionStore::open(&config.store_path)?;
            let record = store.load(&session_id)?;
            println!("Session: {}", record.session_id.cyan());
            println!("  Messages: {}", record.summary.total_messages);
            println!("  User: {}", record.summary.user_messages);
            println!("  Assistant: {}", record.summary.assistant_messages);
            println!("  Features selected: {}", record.summary.features_selected);
            println!("  Vision/mission: {}", record.summary.has_vision_mission);
            println!("  Diagram: {}", record.summary.has_diagram);
        }
        sessionstore::cli::Command::Delete { session_id } => {
            let store = SessionStore::open(&config.store_path)?;
            store.delete(&session_id)?;
            println!("{} Deleted session: {}", "✓".green(), session_id);
        }
    }

    Ok(())
}
