//! Core types for Jira MTTR reporting.
//!
//! Holds the ticket model and Jira wire shapes, the month-long measurement
//! window, timestamp parsing, the label → owner directory, CLI settings and
//! display helpers. The aggregation itself lives in `mttr-data`.

pub mod error;
pub mod formatting;
pub mod models;
pub mod owners;
pub mod settings;
pub mod time_utils;
pub mod window;

pub use error::{MttrError, Result};
pub use models::{ParseScope, Ticket};
pub use owners::OwnerDirectory;
pub use window::TimeWindow;
