//! Command-line interface definition for gymwatch
//!
//! This module defines the CLI structure using clap's derive API. The
//! subcommands mirror the screens of the original app: the exercise
//! list, the detail view, and the session log.

use clap::{Parser, Subcommand};

/// gymwatch - local workout logging
///
/// Track exercises, log sessions of weight/rep sets, and review
/// history. Everything is stored locally; there is no account and no
/// sync.
#[derive(Parser, Debug, Clone)]
#[command(name = "gymwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "gymwatch.yaml")]
    pub config: Option<String>,

    /// Database path override (also via GYMWATCH_DB)
    #[arg(long, env = "GYMWATCH_DB")]
    pub db: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for gymwatch
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List all exercises
    List,

    /// Create a new exercise
    Add {
        /// Display title, e.g. "Bench Press"
        title: String,
    },

    /// Rename an exercise
    Rename {
        /// Exercise id (or unique prefix)
        id: String,

        /// New title
        title: String,
    },

    /// Delete an exercise and all its sessions
    Delete {
        /// Exercise id (or unique prefix)
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Log a session of sets against an exercise
    Log {
        /// Exercise id (or unique prefix)
        id: String,

        /// Set spec WxR[@difficulty], e.g. 60x5, 60x5@high, x12 (bodyweight)
        #[arg(short, long = "set", value_name = "WxR[@difficulty]")]
        sets: Vec<String>,
    },

    /// Show session history for an exercise
    Sessions {
        /// Exercise id (or unique prefix)
        id: String,
    },

    /// Delete one session from an exercise
    DeleteSession {
        /// Exercise id (or unique prefix)
        id: String,

        /// Session id (or unique prefix)
        session_id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("gymwatch.yaml".to_string()),
            db: None,
            verbose: false,
            command: Commands::List,
        }
    }
}
