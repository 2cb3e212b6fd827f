use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while computing MTTR.
#[derive(Error, Debug)]
pub enum MttrError {
    /// The month token could not be parsed as a calendar month.
    #[error("Invalid month format: {0}")]
    InvalidMonthFormat(String),

    /// The owner directory file is missing or not a `{label: [team]}` object.
    #[error("Failed to load owner directory {path}: {reason}")]
    OwnerDirectoryLoad { path: PathBuf, reason: String },

    /// The ticket search endpoint could not be reached or returned garbage.
    #[error("Failed to fetch tickets: {0}")]
    Fetch(String),

    /// A ticket's `created` or `resolved` field is not a recognised timestamp.
    #[error("Invalid timestamp in {field} of ticket {ticket}: {value:?}")]
    TimestampParse {
        ticket: String,
        field: &'static str,
        value: String,
    },

    /// No resolved ticket fell inside the measurement window.
    #[error("No ticket resolved within {window}")]
    NoTicketsInWindow { window: String },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the mttr crates.
pub type Result<T> = std::result::Result<T, MttrError>;
