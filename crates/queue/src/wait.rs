//! Renewable, shrink-only wait used to pace the display loop.
//!
//! [`dynamic_wait`] splits a wait into a [`WaitHandle`], kept by whoever may
//! need to shorten or abandon it, and a [`Wait`] future awaited by the display
//! loop. The two sides share a `watch` channel carrying the current deadline;
//! the future re-reads it every time it wakes, so a superseded deadline can
//! never complete the wait.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::item::saturating_millis;

/// How a [`Wait`] finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The (possibly rescaled) deadline passed.
    Elapsed,
    /// [`WaitHandle::resolve`] completed it early.
    Resolved,
    /// [`WaitHandle::cancel`] was called or the handle was dropped.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Until(Instant),
    Resolved,
    Cancelled,
}

/// Deadline used when `duration` cannot be represented past `start`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

fn deadline_after(start: Instant, duration: Duration) -> Instant {
    start
        .checked_add(duration)
        .unwrap_or_else(|| start + FAR_FUTURE)
}

/// Start a wait of `duration` measured from now.
pub fn dynamic_wait(duration: Duration) -> (WaitHandle, Wait) {
    let started_at = Instant::now();
    let (tx, rx) = watch::channel(Signal::Until(deadline_after(started_at, duration)));
    (
        WaitHandle {
            started_at,
            original: duration,
            tx,
        },
        Wait { rx },
    )
}

/// Control side of an outstanding wait.
#[derive(Debug)]
pub struct WaitHandle {
    started_at: Instant,
    original: Duration,
    tx: watch::Sender<Signal>,
}

impl WaitHandle {
    /// Move the deadline to `new_duration` from now, bounded by the original
    /// end time. The latest call wins.
    ///
    /// Returns the duration actually applied, or `None` if the wait already
    /// finished.
    pub fn rescale(&self, new_duration: Duration) -> Option<Duration> {
        let now = Instant::now();
        let remaining = self
            .original
            .saturating_sub(now.saturating_duration_since(self.started_at));
        let adjusted = new_duration.min(remaining);

        let applied = self.tx.send_if_modified(|signal| match signal {
            Signal::Until(_) => {
                *signal = Signal::Until(deadline_after(now, adjusted));
                true
            }
            _ => false,
        });
        if applied {
            tracing::debug!(adjusted_ms = saturating_millis(adjusted), "wait rescaled");
            Some(adjusted)
        } else {
            None
        }
    }

    /// Complete the wait immediately.
    pub fn resolve(&self) {
        self.finish(Signal::Resolved);
    }

    /// Abandon the wait; the awaiting side sees [`WaitOutcome::Cancelled`].
    pub fn cancel(&self) {
        self.finish(Signal::Cancelled);
    }

    /// Whether the wait has neither elapsed nor been resolved or cancelled.
    pub fn is_outstanding(&self) -> bool {
        match *self.tx.borrow() {
            Signal::Until(deadline) => deadline > Instant::now(),
            _ => false,
        }
    }

    /// Current deadline, if the wait is still armed.
    pub fn deadline(&self) -> Option<Instant> {
        match *self.tx.borrow() {
            Signal::Until(deadline) => Some(deadline),
            _ => None,
        }
    }

    pub fn original_duration(&self) -> Duration {
        self.original
    }

    fn finish(&self, outcome: Signal) {
        self.tx.send_if_modified(|signal| match signal {
            Signal::Until(_) => {
                *signal = outcome;
                true
            }
            _ => false,
        });
    }
}

/// Awaiting side of a wait.
#[derive(Debug)]
pub struct Wait {
    rx: watch::Receiver<Signal>,
}

impl Wait {
    /// Suspend until the deadline passes, or the handle resolves or cancels it.
    pub async fn wait(mut self) -> WaitOutcome {
        loop {
            let signal = *self.rx.borrow_and_update();
            let deadline = match signal {
                Signal::Until(deadline) => deadline,
                Signal::Resolved => return WaitOutcome::Resolved,
                Signal::Cancelled => return WaitOutcome::Cancelled,
            };

            tokio::select! {
                biased;
                changed = self.rx.changed() => {
                    if changed.is_err() {
                        return WaitOutcome::Cancelled;
                    }
                }
                _ = tokio::time::sleep_until(deadline) => {
                    match self.rx.has_changed() {
                        Ok(false) => return WaitOutcome::Elapsed,
                        Ok(true) => continue,
                        Err(_) => return WaitOutcome::Cancelled,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn assert_near(actual: Duration, expected: Duration) {
        let tolerance = ms(5);
        assert!(
            actual >= expected && actual <= expected + tolerance,
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn elapses_after_duration() {
        let start = Instant::now();
        let (_handle, wait) = dynamic_wait(ms(1000));
        assert_eq!(wait.wait().await, WaitOutcome::Elapsed);
        assert_near(start.elapsed(), ms(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn rescale_shortens_from_now() {
        let start = Instant::now();
        let (handle, wait) = dynamic_wait(ms(1000));
        let task = tokio::spawn(wait.wait());

        tokio::time::sleep(ms(200)).await;
        assert_eq!(handle.rescale(ms(300)), Some(ms(300)));

        assert_eq!(task.await.unwrap(), WaitOutcome::Elapsed);
        assert_near(start.elapsed(), ms(500));
    }

    #[tokio::test(start_paused = true)]
    async fn rescale_never_extends_past_original_end() {
        let start = Instant::now();
        let (handle, wait) = dynamic_wait(ms(1000));
        let task = tokio::spawn(wait.wait());

        tokio::time::sleep(ms(200)).await;
        assert_eq!(handle.rescale(ms(5000)), Some(ms(800)));

        assert_eq!(task.await.unwrap(), WaitOutcome::Elapsed);
        assert_near(start.elapsed(), ms(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn latest_rescale_wins() {
        let start = Instant::now();
        let (handle, wait) = dynamic_wait(ms(1000));
        let task = tokio::spawn(wait.wait());

        tokio::time::sleep(ms(100)).await;
        handle.rescale(ms(100));
        handle.rescale(ms(400));

        assert_eq!(task.await.unwrap(), WaitOutcome::Elapsed);
        assert_near(start.elapsed(), ms(500));
    }

    #[tokio::test(start_paused = true)]
    async fn resolve_completes_immediately() {
        let start = Instant::now();
        let (handle, wait) = dynamic_wait(ms(10_000));
        handle.resolve();
        assert_eq!(wait.wait().await, WaitOutcome::Resolved);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(!handle.is_outstanding());
        assert_eq!(handle.rescale(ms(10)), None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_wait_never_elapses() {
        let (handle, wait) = dynamic_wait(ms(100));
        let task = tokio::spawn(wait.wait());

        tokio::time::sleep(ms(50)).await;
        handle.cancel();
        tokio::time::sleep(ms(500)).await;

        assert_eq!(task.await.unwrap(), WaitOutcome::Cancelled);
        assert_eq!(handle.deadline(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_duration_is_clamped() {
        let (handle, wait) = dynamic_wait(Duration::MAX);
        assert!(handle.is_outstanding());
        assert_eq!(handle.original_duration(), Duration::MAX);
        assert_eq!(handle.rescale(Duration::MAX), Some(Duration::MAX));

        let start = Instant::now();
        handle.rescale(ms(100));
        assert_eq!(wait.wait().await, WaitOutcome::Elapsed);
        assert_near(start.elapsed(), ms(100));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_cancels() {
        let (handle, wait) = dynamic_wait(ms(1000));
        drop(handle);
        assert_eq!(wait.wait().await, WaitOutcome::Cancelled);
    }
}
