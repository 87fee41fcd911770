//! Timer display formatting.
//!
//! All timer text shown by the overlay goes through this module so the
//! stopwatch and the countdown render identically.

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_HOUR: i64 = 3_600_000;

/// Seconds field (0-59) of a non-negative millisecond value.
#[inline]
fn seconds_field(ms: i64) -> i64 {
    (ms / MS_PER_SECOND) % 60
}

/// Format a stopwatch/countdown value for the timer display.
///
/// - Values >= 0: `H:MM:SS` (hours unpadded, minutes and seconds two digits)
/// - Values < 0: the fixed form `-0:00:SS`, where `SS` is the seconds field of
///   `|ms| + 1000`. Only the seconds digit counts down; the countdown lead is
///   always under a minute.
///
/// # Examples
/// ```
/// use actnotes_types::formatting::format_timer;
/// assert_eq!(format_timer(0), "0:00:00");
/// assert_eq!(format_timer(3_661_000), "1:01:01");
/// assert_eq!(format_timer(59_999), "0:00:59");
/// assert_eq!(format_timer(-500), "-0:00:01");
/// assert_eq!(format_timer(-4_999), "-0:00:05");
/// ```
pub fn format_timer(ms: i64) -> String {
    if ms < 0 {
        let secs = seconds_field(ms.saturating_abs().saturating_add(MS_PER_SECOND));
        return format!("-0:00:{:02}", secs);
    }

    let hours = ms / MS_PER_HOUR;
    let minutes = (ms / MS_PER_MINUTE) % 60;
    let seconds = seconds_field(ms);
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}
