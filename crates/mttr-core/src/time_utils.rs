use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::error::{MttrError, Result};

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve a `--timezone` value into a [`Tz`].
///
/// `"auto"` (or an empty string) selects the system timezone. Any other value
/// must be a valid IANA identifier.
pub fn resolve_timezone(name: &str) -> Result<Tz> {
    let name = name.trim();
    if name.is_empty() || name.eq_ignore_ascii_case("auto") {
        let system = get_system_timezone();
        return Ok(system.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "system timezone \"{}\" is not a known IANA zone, using UTC",
                system
            );
            Tz::UTC
        }));
    }
    name.parse::<Tz>()
        .map_err(|_| MttrError::Config(format!("unknown timezone \"{}\"", name)))
}

/// Attach `tz` to a wall-clock time.
///
/// Ambiguous times (DST fold) resolve to the earlier instant. Times that fall
/// into a DST gap move forward to the first valid instant after the gap.
pub fn localize(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            // Gaps are at most a few hours wide.
            let mut probe = naive;
            for _ in 0..(4 * 60) {
                probe += chrono::Duration::minutes(1);
                if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
                    return Some(dt);
                }
            }
            None
        }
    }
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Parses tracker timestamps into the run's local timezone.
///
/// Timestamps with an explicit offset keep their instant; naive timestamps are
/// read as wall-clock time in the handler's zone.
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    tz: Tz,
}

impl TimezoneHandler {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Parse a timestamp string in any of the formats a tracker emits.
    ///
    /// Handles Jira's `2018-08-01T10:20:30.000+1000`, RFC 3339 (including the
    /// `Z` suffix), RFC 2822, and naive date-times or bare dates.
    /// Returns `None` for empty strings or unrecognised formats.
    pub fn parse_timestamp(&self, s: &str) -> Option<DateTime<Tz>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&self.tz));
        }

        // Offset without a colon, as Jira writes it.
        const OFFSET_FMTS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f%z",
            "%Y-%m-%dT%H:%M:%S%z",
            "%Y-%m-%d %H:%M:%S%.f%z",
            "%Y-%m-%d %H:%M:%S%z",
        ];
        for fmt in OFFSET_FMTS {
            if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
                return Some(dt.with_timezone(&self.tz));
            }
        }

        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.with_timezone(&self.tz));
        }

        const NAIVE_FMTS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M",
        ];
        for fmt in NAIVE_FMTS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return localize(self.tz, naive);
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return localize(self.tz, date.and_hms_opt(0, 0, 0)?);
        }

        debug!("TimezoneHandler: could not parse timestamp \"{}\"", s);
        None
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
