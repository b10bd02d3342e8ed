//! CLI argument parsing for sessionstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sessionstore")]
#[command(author, version, about = "Local blob store for precode wizard sessions", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all sessions
    List,

    /// Show a session record as JSON
    Show {
        /// Session ID to show
        #[arg(required = true)]
        session_id: String,
    },

    /// Show summary counts for a session
    Stats {
        /// Session ID
        #[arg(required = true)]
        session_id: String,
    },

    /// Delete a session
    Delete {
        /// Session ID to delete
        #[arg(required = true)]
        session_id: String,
    },
}
