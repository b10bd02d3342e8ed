//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// precode - interactive product ideation wizard
#[derive(Parser)]
#[command(
    name = "pc",
    about = "Turn a raw product idea into a vision, a feature set, and a flowchart",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level override (error, warn, info, debug, trace)
    #[arg(short, long, global = true, help = "Log level override")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run the interactive wizard
    Run {
        /// Initial product idea to seed the brainstorm
        idea: Option<String>,
    },

    /// Normalize flowchart markup from a file (or stdin with -)
    Normalize {
        /// Input file; "-" reads stdin
        #[arg(default_value = "-")]
        file: String,
    },

    /// Render flowchart markup to SVG via the mermaid CLI
    Render {
        /// Input file containing flowchart markup
        file: PathBuf,

        /// Output SVG path (defaults to the input path with .svg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect saved sessions
    Sessions {
        #[command(subcommand)]
        command: SessionsCommand,
    },
}

/// Session inspection subcommands
#[derive(Subcommand)]
pub enum SessionsCommand {
    /// List saved session ids
    List,

    /// Show one saved session
    Show {
        /// Session id
        session_id: String,
    },

    /// Delete a saved session
    Delete {
        /// Session id
        session_id: String,
    },
}

/// Path of the wizard log file
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("precode")
        .join("logs")
        .join("precode.log")
}

/// Check whether an external binary is runnable
fn tool_available(bin: &str) -> bool {
    std::process::Command::new(bin)
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok()
}

/// Build the dynamic after-help text: external tool status plus log path
pub fn generate_after_help() -> String {
    let mmdc = if tool_available("mmdc") {
        "found"
    } else {
        "missing (diagrams shown as markup only; npm install -g @mermaid-js/mermaid-cli)"
    };

    format!(
        "External tools:\n  mmdc: {}\n\nLogs are written to: {}\n",
        mmdc,
        get_log_path().display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["pc"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_run_with_idea() {
        let cli = Cli::parse_from(["pc", "run", "A fitness app"]);
        if let Some(Command::Run { idea }) = cli.command {
            assert_eq!(idea.as_deref(), Some("A fitness app"));
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_parse_normalize_defaults_to_stdin() {
        let cli = Cli::parse_from(["pc", "normalize"]);
        if let Some(Command::Normalize { file }) = cli.command {
            assert_eq!(file, "-");
        } else {
            panic!("Expected Normalize command");
        }
    }

    #[test]
    fn test_cli_parse_render_with_output() {
        let cli = Cli::parse_from(["pc", "render", "flow.mmd", "-o", "flow.svg"]);
        if let Some(Command::Render { file, output }) = cli.command {
            assert_eq!(file, PathBuf::from("flow.mmd"));
            assert_eq!(output, Some(PathBuf::from("flow.svg")));
        } else {
            panic!("Expected Render command");
        }
    }

    #[test]
    fn test_cli_parse_sessions_list() {
        let cli = Cli::parse_from(["pc", "sessions", "list"]);
        assert!(matches!(
            cli.command,
            Some(Command::Sessions {
                command: SessionsCommand::List
            })
        ));
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["pc", "-c", "/path/to/precode.yml", "sessions", "list"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/precode.yml")));
    }
}
