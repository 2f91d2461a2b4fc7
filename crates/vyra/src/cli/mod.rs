//! Command-line interface for vyra.
//!
//! This module provides the CLI structure for the `vyra` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{AlertsCommand, ConfigCommand, ContactsCommand, ServeCommand, StatusArg};

use crate::logging::Verbosity;

/// vyra - Panic button for drivers
///
/// Serves the driver and dashboard API, and manages the stored trusted
/// contacts and alerts from the command line.
#[derive(Debug, Parser)]
#[command(name = "vyra")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeCommand),

    /// Manage trusted contacts
    #[command(subcommand)]
    Contacts(ContactsCommand),

    /// Manage the alert history
    #[command(subcommand)]
    Alerts(AlertsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
