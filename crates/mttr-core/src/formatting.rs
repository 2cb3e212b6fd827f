//! Display helpers for durations.

/// Seconds in one day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Convert a duration in seconds to fractional days.
///
/// # Examples
///
/// ```
/// use mttr_core::formatting::seconds_to_days;
///
/// assert_eq!(seconds_to_days(172_800.0), 2.0);
/// assert_eq!(seconds_to_days(-43_200.0), -0.5);
/// ```
pub fn seconds_to_days(seconds: f64) -> f64 {
    seconds / SECONDS_PER_DAY
}

/// Format a duration in seconds as days with one decimal place.
///
/// # Examples
///
/// ```
/// use mttr_core::formatting::format_days;
///
/// assert_eq!(format_days(129_600.0), "1.5");
/// assert_eq!(format_days(0.0), "0.0");
/// ```
pub fn format_days(seconds: f64) -> String {
    format!("{:.1}", seconds_to_days(seconds))
}

/// Whole seconds, truncated toward zero.
///
/// # Examples
///
/// ```
/// use mttr_core::formatting::whole_seconds;
///
/// assert_eq!(whole_seconds(129_600.9), 129_600);
/// assert_eq!(whole_seconds(-1.5), -1);
/// ```
pub fn whole_seconds(seconds: f64) -> i64 {
    seconds.trunc() as i64
}

/// Format a duration in seconds as `"2d 3h"`, `"5h 12m"` or `"45m"`.
///
/// Negative durations keep their sign in front.
///
/// # Examples
///
/// ```
/// use mttr_core::formatting::format_duration;
///
/// assert_eq!(format_duration(183_600.0), "2d 3h");
/// assert_eq!(format_duration(18_720.0), "5h 12m");
/// assert_eq!(format_duration(2_700.0), "45m");
/// assert_eq!(format_duration(-3_600.0), "-1h 0m");
/// ```
pub fn format_duration(seconds: f64) -> String {
    let sign = if seconds < 0.0 { "-" } else { "" };
    let total_mins = (seconds.abs() / 60.0).round() as i64;
    let days = total_mins / (24 * 60);
    let hours = (total_mins / 60) % 24;
    let mins = total_mins % 60;
    if days > 0 {
        format!("{}{}d {}h", sign, days, hours)
    } else if hours > 0 {
        format!("{}{}h {}m", sign, hours, mins)
    } else {
        format!("{}{}m", sign, mins)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
