//! # Display Labels
//!
//! Human-readable date labels for the contact card and the recent-calls
//! list. Day differences are whole 24-hour periods, in either direction.

use chrono::{DateTime, Utc};

use crate::parse_timestamp;

/// Label for a contact's "last call" line.
///
/// `Today`, `Yesterday`, `N days ago` below a week, `N weeks ago` below
/// thirty days, `N months ago` (thirty-day months) beyond. `Unknown` when
/// the timestamp does not parse.
#[must_use]
pub fn last_spoken_label(last_spoken: &str, now: DateTime<Utc>) -> String {
    let Some(days) = days_between(last_spoken, now) else {
        return "Unknown".to_string();
    };
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{} days ago", days),
        7..=29 => format!("{} weeks ago", days / 7),
        _ => format!("{} months ago", days / 30),
    }
}

/// Label for a call history timestamp: `Today`, `Yesterday`, otherwise
/// the calendar date.
#[must_use]
pub fn history_label(timestamp: &str, now: DateTime<Utc>) -> String {
    let Some(at) = parse_timestamp(timestamp) else {
        return "Unknown".to_string();
    };
    match (now - at).num_days().unsigned_abs() {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        _ => at.format("%Y-%m-%d").to_string(),
    }
}

fn days_between(timestamp: &str, now: DateTime<Utc>) -> Option<u64> {
    parse_timestamp(timestamp).map(|at| (now - at).num_days().unsigned_abs())
}
