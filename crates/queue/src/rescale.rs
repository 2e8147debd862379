//! Budget enforcement for low-priority messages.
//!
//! When the combined on-screen time of everything at or below the
//! low-priority threshold exceeds the budget, every participating duration is
//! shrunk by the same coefficient so relative lengths are preserved. Queued
//! items never drop below [`MIN_DURATION`]; items above the threshold are
//! never touched.

use std::time::Duration;

use crate::item::{QueueItem, MIN_DURATION};

/// Sum of the low-priority durations that count against the budget.
///
/// `current_remaining` is the on-screen item's remaining time, already
/// filtered by the caller to `None` when that item is not low-priority.
pub fn low_priority_load<'a>(
    items: impl IntoIterator<Item = &'a QueueItem>,
    current_remaining: Option<Duration>,
    threshold: i64,
) -> Duration {
    items
        .into_iter()
        .filter(|item| item.priority <= threshold)
        .map(|item| item.duration)
        .fold(current_remaining.unwrap_or(Duration::ZERO), |acc, d| {
            acc.saturating_add(d)
        })
}

/// Shrink factor needed to bring `total` within `budget`, or `None` if it
/// already fits.
pub fn budget_coefficient(total: Duration, budget: Duration) -> Option<f64> {
    if total <= budget || total.is_zero() {
        return None;
    }
    Some(budget.as_millis() as f64 / total.as_millis() as f64)
}

/// Scale a duration by `coef`, truncated to whole milliseconds.
pub fn scale(duration: Duration, coef: f64) -> Duration {
    let ms = (duration.as_millis() as f64 * coef).floor();
    Duration::from_millis(ms as u64)
}

/// Apply `coef` to every low-priority item, clamping at [`MIN_DURATION`].
pub fn shrink_pending<'a>(
    items: impl IntoIterator<Item = &'a mut QueueItem>,
    threshold: i64,
    coef: f64,
) {
    for item in items {
        if item.priority > threshold {
            continue;
        }
        item.duration = scale(item.duration, coef).max(MIN_DURATION);
    }
}
