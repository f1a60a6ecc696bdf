use std::fmt::Write;

use chrono::DateTime;

/// Format an episode countdown as `m:ss` with cumulative minutes.
pub fn format_countdown(total_secs: i64) -> String {
    let mut out = String::with_capacity(5);
    write_countdown(&mut out, total_secs);
    out
}

pub fn write_countdown(buf: &mut String, total_secs: i64) {
    buf.clear();
    let secs = total_secs.max(0);
    let minutes = secs / 60;
    let seconds = secs % 60;
    let _ = write!(buf, "{minutes}:{seconds:02}");
}

/// Calendar date (UTC) for a unix timestamp, `None` when out of range.
pub fn format_date(unix_secs: i64) -> Option<String> {
    DateTime::from_timestamp(unix_secs, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}
