//! Command-line interface definition for Tallykeeper
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tallykeeper - named counters with an optional reference photo
///
/// Sessions are stored locally; each one holds a count you can bump,
/// reset and rename.
#[derive(Parser, Debug, Clone)]
#[command(name = "tallykeeper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/tallykeeper.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Override the session database location
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Tallykeeper
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List sessions, most recently updated first
    List {
        /// Print summaries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new session
    Create {
        /// Session name
        name: String,
    },

    /// Show one session
    Show {
        /// Session ID
        id: String,

        /// Print the session as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add one to a session's count
    Increment {
        /// Session ID
        id: String,
    },

    /// Reset a session's count to zero
    Reset {
        /// Session ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Rename a session
    Rename {
        /// Session ID
        id: String,

        /// New name
        name: String,
    },

    /// Attach a photo to a session
    Image {
        /// Session ID
        id: String,

        /// Image file; prompted for when omitted
        path: Option<PathBuf>,
    },

    /// Delete a session
    Delete {
        /// Session ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Check that the stored session data is readable
    Verify,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_list() {
        let cli = Cli::try_parse_from(["tallykeeper", "list"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("config/tallykeeper.yaml"));
        assert!(matches!(cli.command, Commands::List { json: false }));
    }

    #[test]
    fn test_cli_parse_list_json() {
        let cli = Cli::try_parse_from(["tallykeeper", "list", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::List { json: true }));
    }

    #[test]
    fn test_cli_parse_create() {
        let cli = Cli::try_parse_from(["tallykeeper", "create", "Morning Laps"]).unwrap();
        if let Commands::Create { name } = cli.command {
            assert_eq!(name, "Morning Laps");
        } else {
            panic!("Expected Create command");
        }
    }

    #[test]
    fn test_cli_parse_reset_with_yes() {
        let cli = Cli::try_parse_from(["tallykeeper", "reset", "abc", "--yes"]).unwrap();
        if let Commands::Reset { id, yes } = cli.command {
            assert_eq!(id, "abc");
            assert!(yes);
        } else {
            panic!("Expected Reset command");
        }
    }

    #[test]
    fn test_cli_parse_image_without_path() {
        let cli = Cli::try_parse_from(["tallykeeper", "image", "abc"]).unwrap();
        if let Commands::Image { id, path } = cli.command {
            assert_eq!(id, "abc");
            assert!(path.is_none());
        } else {
            panic!("Expected Image command");
        }
    }

    #[test]
    fn test_cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "tallykeeper",
            "--storage-path",
            "/tmp/s.db",
            "--verbose",
            "--json-logs",
            "verify",
        ])
        .unwrap();
        assert_eq!(cli.storage_path.as_deref(), Some("/tmp/s.db"));
        assert!(cli.verbose);
        assert!(cli.json_logs);
        assert!(matches!(cli.command, Commands::Verify));
    }

    #[test]
    fn test_cli_rename_requires_name() {
        assert!(Cli::try_parse_from(["tallykeeper", "rename", "abc"]).is_err());
    }
}
