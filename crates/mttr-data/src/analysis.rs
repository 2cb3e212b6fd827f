//! Fetch → aggregate pipeline for one month.

use std::time::Instant;

use mttr_core::error::Result;
use mttr_core::models::ParseScope;
use mttr_core::owners::OwnerDirectory;
use mttr_core::window::TimeWindow;
use tracing::{debug, info};

use crate::aggregator::MttrAggregator;
use crate::diagnostics::DiagnosticSink;
use crate::fetcher::IssueFetcher;
use crate::report::MttrReport;

/// Run the full pipeline.
///
/// 1. Walk the search results page by page.
/// 2. Fold every ticket of a page into the aggregator before requesting the
///    next one.
/// 3. Turn the totals into an [`MttrReport`].
///
/// A fetch failure or malformed timestamp ends the run with that error; no
/// partial report is produced.
pub async fn analyze_month<S>(
    fetcher: &IssueFetcher,
    window: &TimeWindow,
    owners: &OwnerDirectory,
    parse_scope: ParseScope,
    sink: &mut S,
) -> Result<MttrReport>
where
    S: DiagnosticSink + ?Sized,
{
    let started = Instant::now();
    let mut aggregator = MttrAggregator::new(window, owners).with_parse_scope(parse_scope);
    let mut pages = fetcher.pages();
    let mut page_count = 0usize;
    debug!(
        url = fetcher.url(),
        page_size = fetcher.page_size(),
        "searching tickets for {}",
        window.label()
    );

    while let Some(tickets) = pages.next_page().await? {
        page_count += 1;
        debug!(page = page_count, tickets = tickets.len(), "aggregating page");
        for ticket in &tickets {
            aggregator.push(ticket, sink)?;
        }
    }

    let stats = *aggregator.stats();
    info!(
        pages = page_count,
        seen = stats.seen,
        unresolved = stats.unresolved,
        outside_window = stats.outside_window,
        measured = stats.measured,
        unowned = stats.unowned,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "processed tickets for {}",
        window.label()
    );

    aggregator.finish()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
