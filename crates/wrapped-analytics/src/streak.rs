//! Consecutive-day activity streaks.

use std::collections::BTreeSet;

use chrono::NaiveDate;

/// Longest run of consecutive calendar days in `days`.
///
/// One distinct day is a streak of 1; no days is 0.
pub fn longest_streak(days: &BTreeSet<NaiveDate>) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<NaiveDate> = None;

    for &day in days {
        current = match previous.and_then(|p| p.succ_opt()) {
            Some(next) if next == day => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        previous = Some(day);
    }

    longest
}
