//! Queue entries and display bookkeeping.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

/// Shortest duration a rescaled item may be shrunk to.
pub const MIN_DURATION: Duration = Duration::from_millis(100);

/// Priority used by `show_now`; outranks everything.
pub const MAX_PRIORITY: i64 = i64::MAX;

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// A message waiting for the display surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueItem {
    pub message: String,
    /// Requested on-screen time. May be shrunk by the rescale pass while pending.
    pub duration: Duration,
    /// Higher displays first.
    pub priority: i64,
}

impl QueueItem {
    pub fn new(message: impl Into<String>, duration: Duration, priority: i64) -> Self {
        Self {
            message: message.into(),
            duration,
            priority,
        }
    }
}

/// Outcome of an enqueue call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    Queued,
    /// Same text already pending and duplicate suppression is on.
    Duplicate,
}

/// The item currently on screen.
///
/// `total` and `started_at` are rebased whenever the rescale pass shrinks the
/// item, so `remaining` is always measured from the latest rescale.
#[derive(Debug, Clone)]
pub(crate) struct CurrentDisplay {
    pub message: String,
    pub priority: i64,
    pub total: Duration,
    pub started_at: Instant,
}

impl CurrentDisplay {
    pub fn new(item: &QueueItem, now: Instant) -> Self {
        Self {
            message: item.message.clone(),
            priority: item.priority,
            total: item.duration,
            started_at: now,
        }
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.total
            .saturating_sub(now.saturating_duration_since(self.started_at))
    }
}

/// Read-only view of the item on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentSnapshot {
    pub message: String,
    pub priority: i64,
    pub remaining: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_saturate_instead_of_truncating() {
        assert_eq!(saturating_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(saturating_millis(Duration::MAX), u64::MAX);
        assert_eq!(
            saturating_millis(Duration::from_secs(18_446_744_073_709_552)),
            u64::MAX
        );
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_counts_down_and_saturates() {
        let item = QueueItem::new("hello", Duration::from_millis(500), 0);
        let current = CurrentDisplay::new(&item, Instant::now());
        assert_eq!(current.remaining(Instant::now()), Duration::from_millis(500));

        tokio::time::advance(Duration::from_millis(200)).await;
        assert_eq!(current.remaining(Instant::now()), Duration::from_millis(300));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(current.remaining(Instant::now()), Duration::ZERO);
    }
}
