//! Per-ticket diagnostic events.
//!
//! The aggregator reports what it did with each ticket through a
//! [`DiagnosticSink`] instead of printing, so callers decide how (or whether)
//! to render it.

use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;
use mttr_core::formatting::{format_days, format_duration};
use tracing::{debug, info, warn};

// ── Events ────────────────────────────────────────────────────────────────────

/// A ticket that reached the duration step.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketMeasurement {
    pub id: String,
    pub key: String,
    /// `resolved - created`, negative when upstream data is inconsistent.
    pub duration_seconds: f64,
    pub created: DateTime<Tz>,
    pub resolved: DateTime<Tz>,
    pub labels: Vec<String>,
    /// Resolved owners, duplicates kept. Empty for unowned tickets.
    pub owners: Vec<String>,
}

impl fmt::Display for TicketMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} took {} days, ({} - {}). [{}] has owners {}",
            self.key,
            format_days(self.duration_seconds),
            self.created.format("%Y-%m-%d"),
            self.resolved.format("%Y-%m-%d"),
            self.labels.join(","),
            self.owners.join(",")
        )
    }
}

/// What happened to one ticket of the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum TicketEvent {
    /// No resolution timestamp; skipped.
    Unresolved { key: String },
    /// Resolved outside the measurement window; skipped.
    OutsideWindow { key: String, resolved: DateTime<Tz> },
    /// No label mapped to a team. Counted in the overall mean only.
    Unowned {
        id: String,
        key: String,
        labels: Vec<String>,
    },
    /// Duration computed and folded into the totals.
    Measured(TicketMeasurement),
}

impl fmt::Display for TicketEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketEvent::Unresolved { key } => write!(f, "{} is not resolved yet", key),
            TicketEvent::OutsideWindow { key, resolved } => write!(
                f,
                "{} was resolved on {}, outside the window",
                key,
                resolved.format("%Y-%m-%d")
            ),
            TicketEvent::Unowned { key, labels, .. } => {
                write!(f, "{} [{}] does not have an owner!", key, labels.join(","))
            }
            TicketEvent::Measured(m) => fmt::Display::fmt(m, f),
        }
    }
}

// ── Sinks ─────────────────────────────────────────────────────────────────────

/// Receives ticket events in feed order.
pub trait DiagnosticSink {
    fn record(&mut self, event: &TicketEvent);
}

impl DiagnosticSink for Vec<TicketEvent> {
    fn record(&mut self, event: &TicketEvent) {
        self.push(event.clone());
    }
}

impl<F> DiagnosticSink for F
where
    F: FnMut(&TicketEvent),
{
    fn record(&mut self, event: &TicketEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&mut self, _event: &TicketEvent) {}
}

/// Forwards events to `tracing`: measured tickets at `info`, unowned ones at
/// `warn`, skipped ones at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&mut self, event: &TicketEvent) {
        match event {
            TicketEvent::Measured(m) => info!(
                ticket = %m.key,
                duration_seconds = m.duration_seconds,
                elapsed = %format_duration(m.duration_seconds),
                "{}",
                m
            ),
            TicketEvent::Unowned { key, .. } => warn!(ticket = %key, "{}", event),
            TicketEvent::Unresolved { key } | TicketEvent::OutsideWindow { key, .. } => {
                debug!(ticket = %key, "{}", event)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
