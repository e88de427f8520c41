//! Small string helpers used when rendering the chat message

use chrono::TimeDelta;

/// Length of the abbreviated commit SHA shown in the fallback text
pub const SHORT_SHA_LEN: usize = 8;

/// Prefix `value` with `prefix` unless it already starts with it.
pub fn prepend(prefix: &str, value: &str) -> String {
    if value.starts_with(prefix) {
        value.to_string()
    } else {
        format!("{}{}", prefix, value)
    }
}

/// First eight characters of a commit SHA, or the whole SHA when shorter
pub fn short_sha(sha: &str) -> &str {
    match sha.char_indices().nth(SHORT_SHA_LEN) {
        Some((idx, _)) => &sha[..idx],
        None => sha,
    }
}

/// Slack link markup: `<url|text>`.
///
/// Neither part is escaped; values are passed through as the host gave them.
pub fn link(url: &str, text: &str) -> String {
    format!("<{}|{}>", url, text)
}

/// Render a duration at second precision, e.g. `0s`, `45s`, `1m32s`, `2h0m5s`.
/// Negative durations render as `0s`.
pub fn format_duration(elapsed: TimeDelta) -> String {
    let total = elapsed.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
