//! The final MTTR report and its text / JSON renderings.

use std::collections::BTreeMap;

use mttr_core::formatting::{format_days, whole_seconds};
use serde::Serialize;

use crate::aggregator::AggregationStats;

/// Mean resolution time of one group of tickets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanResolution {
    pub mean_seconds: f64,
    /// Tickets that contributed to the mean.
    pub tickets: u64,
}

impl MeanResolution {
    pub fn mean_days(&self) -> f64 {
        mttr_core::formatting::seconds_to_days(self.mean_seconds)
    }
}

/// Per-team and overall MTTR for one month.
///
/// `overall` is the grand total of in-window durations over the number of
/// in-window tickets, so a ticket owned by several teams counts once there
/// while contributing fully to each of its teams.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MttrReport {
    /// `YYYY-MM` label of the measured month.
    pub month: String,
    /// Teams in name order.
    pub teams: BTreeMap<String, MeanResolution>,
    pub overall: MeanResolution,
    pub stats: AggregationStats,
}

impl MttrReport {
    /// Mean seconds per team.
    pub fn per_team_mean_seconds(&self) -> BTreeMap<&str, f64> {
        self.teams
            .iter()
            .map(|(team, mean)| (team.as_str(), mean.mean_seconds))
            .collect()
    }

    /// Mean seconds over every in-window ticket.
    pub fn overall_mean_seconds(&self) -> f64 {
        self.overall.mean_seconds
    }

    /// Mean seconds for `team`, `None` when no ticket was attributed to it.
    pub fn team_mean_seconds(&self, team: &str) -> Option<f64> {
        self.teams.get(team).map(|m| m.mean_seconds)
    }

    /// One line per team followed by the overall line.
    ///
    /// ```text
    /// In 2018-08: Alpha's MTTR is 172800 seconds, 2.0 days
    /// In 2018-08: overall MTTR is 129600 seconds, 1.5 days
    /// ```
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for (team, mean) in &self.teams {
            out.push_str(&format!(
                "In {}: {}'s MTTR is {} seconds, {} days\n",
                self.month,
                team,
                whole_seconds(mean.mean_seconds),
                format_days(mean.mean_seconds)
            ));
        }
        out.push_str(&format!(
            "In {}: overall MTTR is {} seconds, {} days\n",
            self.month,
            whole_seconds(self.overall.mean_seconds),
            format_days(self.overall.mean_seconds)
        ));
        out
    }

    /// Pretty-printed JSON document.
    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
