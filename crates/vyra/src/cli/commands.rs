//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::alert::AlertStatus;

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to bind (overrides configuration)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides configuration and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Trusted contact commands.
#[derive(Debug, Subcommand)]
pub enum ContactsCommand {
    /// List trusted contacts
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Register a trusted contact
    Add {
        /// Contact name
        name: String,
        /// Phone number
        phone: String,
    },

    /// Remove every trusted contact
    Clear,
}

/// Alert history commands.
#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// List alerts, oldest first
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Set the status of an alert
    Ack {
        /// Alert id
        id: String,

        /// New status
        #[arg(short, long, value_enum, default_value = "ack")]
        status: StatusArg,
    },

    /// Remove every alert
    Clear,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Alert status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusArg {
    /// Raised, not yet seen
    Open,
    /// Seen by an operator
    #[default]
    Ack,
    /// Handled
    Closed,
}

impl From<StatusArg> for AlertStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Open => Self::Open,
            StatusArg::Ack => Self::Ack,
            StatusArg::Closed => Self::Closed,
        }
    }
}
