//! Mean-time-to-resolution aggregation over one month.
//!
//! [`MttrAggregator`] folds tickets, in feed order, into per-team and overall
//! duration totals and turns them into an [`MttrReport`] once the feed is
//! exhausted. An aggregator belongs to exactly one run; build a fresh one for
//! every run.

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono_tz::Tz;
use mttr_core::error::{MttrError, Result};
use mttr_core::models::{ParseScope, Ticket};
use mttr_core::owners::OwnerDirectory;
use mttr_core::time_utils::TimezoneHandler;
use mttr_core::window::TimeWindow;
use serde::Serialize;
use tracing::debug;

use crate::diagnostics::{DiagnosticSink, TicketEvent, TicketMeasurement};
use crate::report::{MeanResolution, MttrReport};

// ── TeamAccumulator ───────────────────────────────────────────────────────────

/// Running duration total for one team (or for every ticket).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TeamAccumulator {
    pub sum_seconds: f64,
    pub count: u64,
}

impl TeamAccumulator {
    /// Add one ticket's duration.
    pub fn add(&mut self, duration_seconds: f64) {
        self.sum_seconds += duration_seconds;
        self.count += 1;
    }

    /// `sum / count`, `None` before the first ticket.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum_seconds / self.count as f64)
    }

    fn to_mean_resolution(self) -> Option<MeanResolution> {
        self.mean().map(|mean_seconds| MeanResolution {
            mean_seconds,
            tickets: self.count,
        })
    }
}

// ── AggregationStats ──────────────────────────────────────────────────────────

/// How the tickets of a feed were accounted for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    /// Every ticket pushed.
    pub seen: u64,
    /// Skipped for lack of a resolution timestamp.
    pub unresolved: u64,
    /// Resolved before or after the window.
    pub outside_window: u64,
    /// Durations folded into the overall mean.
    pub measured: u64,
    /// Measured tickets with no owning team.
    pub unowned: u64,
}

// ── MttrAggregator ────────────────────────────────────────────────────────────

/// Single-pass reducer from tickets to an [`MttrReport`].
pub struct MttrAggregator<'a> {
    window: &'a TimeWindow,
    owners: &'a OwnerDirectory,
    timestamps: TimezoneHandler,
    parse_scope: ParseScope,
    teams: BTreeMap<String, TeamAccumulator>,
    total: TeamAccumulator,
    stats: AggregationStats,
}

impl<'a> MttrAggregator<'a> {
    /// Aggregator for `window`, attributing tickets through `owners`.
    ///
    /// Naive timestamps are read in the window's timezone.
    pub fn new(window: &'a TimeWindow, owners: &'a OwnerDirectory) -> Self {
        Self {
            window,
            owners,
            timestamps: TimezoneHandler::new(window.timezone()),
            parse_scope: ParseScope::default(),
            teams: BTreeMap::new(),
            total: TeamAccumulator::default(),
            stats: AggregationStats::default(),
        }
    }

    /// Choose which resolved tickets must carry parseable timestamps.
    pub fn with_parse_scope(mut self, parse_scope: ParseScope) -> Self {
        self.parse_scope = parse_scope;
        self
    }

    /// Fold one ticket into the totals.
    ///
    /// Open tickets and tickets resolved outside the window are skipped. A
    /// timestamp that does not parse fails with [`MttrError::TimestampParse`];
    /// the aggregator must not be used after such an error.
    pub fn push<S>(&mut self, ticket: &Ticket, sink: &mut S) -> Result<()>
    where
        S: DiagnosticSink + ?Sized,
    {
        self.stats.seen += 1;

        let Some(resolved_raw) = ticket.resolution() else {
            self.stats.unresolved += 1;
            sink.record(&TicketEvent::Unresolved {
                key: ticket.display_key().to_string(),
            });
            return Ok(());
        };

        let resolved = self.parse(ticket, "resolved", resolved_raw)?;
        let created = match self.parse_scope {
            ParseScope::All => Some(self.parse(ticket, "created", &ticket.created)?),
            ParseScope::InWindow => None,
        };

        if !self.window.contains(&resolved) {
            self.stats.outside_window += 1;
            sink.record(&TicketEvent::OutsideWindow {
                key: ticket.display_key().to_string(),
                resolved,
            });
            return Ok(());
        }

        let created = match created {
            Some(created) => created,
            None => self.parse(ticket, "created", &ticket.created)?,
        };

        let duration_seconds = (resolved - created).num_milliseconds() as f64 / 1000.0;
        let owners = self.owners.owners_of(&ticket.labels);

        self.stats.measured += 1;
        self.total.add(duration_seconds);

        if owners.is_empty() {
            self.stats.unowned += 1;
            sink.record(&TicketEvent::Unowned {
                id: ticket.id.clone(),
                key: ticket.display_key().to_string(),
                labels: ticket.labels.clone(),
            });
        } else {
            for team in &owners {
                self.teams.entry(team.clone()).or_default().add(duration_seconds);
            }
        }

        sink.record(&TicketEvent::Measured(TicketMeasurement {
            id: ticket.id.clone(),
            key: ticket.display_key().to_string(),
            duration_seconds,
            created,
            resolved,
            labels: ticket.labels.clone(),
            owners,
        }));

        Ok(())
    }

    /// Running per-team totals.
    pub fn teams(&self) -> &BTreeMap<String, TeamAccumulator> {
        &self.teams
    }

    /// Running total over every measured ticket.
    pub fn total(&self) -> &TeamAccumulator {
        &self.total
    }

    pub fn stats(&self) -> &AggregationStats {
        &self.stats
    }

    /// Turn the totals into means.
    ///
    /// Fails with [`MttrError::NoTicketsInWindow`] when no ticket was
    /// measured.
    pub fn finish(self) -> Result<MttrReport> {
        let overall =
            self.total
                .to_mean_resolution()
                .ok_or_else(|| MttrError::NoTicketsInWindow {
                    window: self.window.label(),
                })?;

        let teams = self
            .teams
            .into_iter()
            .filter_map(|(team, acc)| acc.to_mean_resolution().map(|mean| (team, mean)))
            .collect();

        debug!(
            seen = self.stats.seen,
            measured = self.stats.measured,
            unowned = self.stats.unowned,
            "aggregation finished"
        );

        Ok(MttrReport {
            month: self.window.label(),
            teams,
            overall,
            stats: self.stats,
        })
    }

    fn parse(&self, ticket: &Ticket, field: &'static str, value: &str) -> Result<DateTime<Tz>> {
        self.timestamps
            .parse_timestamp(value)
            .ok_or_else(|| MttrError::TimestampParse {
                ticket: ticket.display_key().to_string(),
                field,
                value: value.to_string(),
            })
    }
}

// ── compute_mttr ──────────────────────────────────────────────────────────────

/// Aggregate a whole ticket feed.
///
/// The first error in the feed, or the first malformed timestamp, aborts the
/// run and is returned unchanged.
pub fn compute_mttr<I, S>(
    tickets: I,
    window: &TimeWindow,
    owners: &OwnerDirectory,
    sink: &mut S,
) -> Result<MttrReport>
where
    I: IntoIterator<Item = Result<Ticket>>,
    S: DiagnosticSink + ?Sized,
{
    let mut aggregator = MttrAggregator::new(window, owners);
    for ticket in tickets {
        aggregator.push(&ticket?, sink)?;
    }
    aggregator.finish()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
