//! Shared types for the monthcal application.
//!
//! This module contains the crate-wide Result alias and the CLI subcommands.
use std::path::PathBuf;

use clap::Subcommand;

use crate::CalError;

/// A specialized Result type for monthcal operations.
pub type Result<T> = std::result::Result<T, CalError>;

/// Available subcommands for the monthcal application
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a month grid with event counts
    Show {
        /// Month to show as YYYY-MM (defaults to the current month)
        #[clap(short, long)]
        month: Option<String>,
    },

    /// List the events of one day
    Day {
        /// Day as YYYY-MM-DD
        date: String,

        /// Only show events whose name contains this text
        #[clap(short, long)]
        search: Option<String>,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Add an event to a day
    Add {
        /// Day as YYYY-MM-DD
        date: String,

        /// Title of the event
        #[clap(short = 'n', long)]
        name: String,

        /// Start time as HH:MM
        #[clap(short, long)]
        start: String,

        /// End time as HH:MM
        #[clap(short, long)]
        end: String,

        /// Free-text description
        #[clap(short, long)]
        description: Option<String>,

        /// Category of the event
        #[clap(short = 't', long = "type", value_parser = ["work", "personal", "others"], default_value = "others")]
        event_type: String,

        /// Write the description in an editor
        #[clap(long)]
        edit: bool,
    },

    /// Edit an existing event by ID
    Edit {
        /// ID of the event to edit
        id: String,

        /// New title
        #[clap(short = 'n', long)]
        name: Option<String>,

        /// New start time as HH:MM
        #[clap(short, long)]
        start: Option<String>,

        /// New end time as HH:MM
        #[clap(short, long)]
        end: Option<String>,

        /// New description
        #[clap(short, long)]
        description: Option<String>,

        /// New category
        #[clap(short = 't', long = "type", value_parser = ["work", "personal", "others"])]
        event_type: Option<String>,
    },

    /// Delete an event by ID
    Delete {
        /// ID of the event to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Export one month of events as JSON
    Export {
        /// Month to export as YYYY-MM
        #[clap(short, long)]
        month: String,

        /// Directory to write the export into (default uses config setting)
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },
}
