//! Data layer for Jira MTTR reporting.
//!
//! Fetches tickets from the Jira search API page by page, folds them into
//! per-team and overall resolution-time totals, and produces the month's
//! report.

pub mod aggregator;
pub mod analysis;
pub mod diagnostics;
pub mod fetcher;
pub mod report;

pub use aggregator::{compute_mttr, MttrAggregator};
pub use mttr_core as core;
pub use report::MttrReport;
