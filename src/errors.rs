//! Error types for the monthcal application.
//!
//! This module defines custom error types that categorize the failures
//! that can occur while managing calendar events.

use std::{io, path::PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the monthcal application.
#[derive(Error, Debug)]
pub enum CalError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An event was added without a day being selected first.
    #[error("Please select a day before adding an event")]
    NoDaySelected,

    /// The event title is empty after trimming.
    #[error("Event title cannot be empty")]
    EmptyTitle,

    /// The start time is not strictly before the end time.
    #[error("End time ({end}) must be after start time ({start})")]
    InvalidTimeRange { start: String, end: String },

    /// Another event with the same name already exists on that day.
    #[error("An event named '{name}' already exists on {day}")]
    DuplicateEvent { name: String, day: String },

    /// A time value could not be parsed as HH:MM.
    #[error("Invalid time '{value}', expected HH:MM")]
    InvalidTime { value: String },

    /// A day number does not exist in the displayed month.
    #[error("Day {day} does not exist in {month}/{year}")]
    InvalidDay { day: u32, month: u32, year: i32 },

    /// Event was not found when performing an operation.
    #[error("Event not found: {id}")]
    EventNotFound { id: String },

    /// Invalid input format.
    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// The stored collection changed between our read and our write.
    #[error("Concurrent modification detected for key '{key}'")]
    ConcurrentModification { key: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },

    #[error("{message}")]
    EditorError { message: String },
}

impl CalError {
    /// Whether this error is an input validation failure that should be
    /// shown to the user rather than treated as a fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CalError::NoDaySelected
                | CalError::EmptyTitle
                | CalError::InvalidTimeRange { .. }
                | CalError::DuplicateEvent { .. }
                | CalError::InvalidTime { .. }
                | CalError::InvalidDay { .. }
        )
    }

    pub(crate) fn duplicate(name: &str, day: NaiveDate) -> Self {
        CalError::DuplicateEvent {
            name: name.trim().to_string(),
            day: crate::format_day_label(day),
        }
    }
}
