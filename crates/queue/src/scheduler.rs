//! Priority scheduler feeding a single display surface.
//!
//! All queue, current-display and timer state sits behind one mutex and every
//! public operation completes without awaiting, so callers always observe a
//! fully rescaled and re-sorted queue. The only suspension point is the
//! display loop's [`Wait`], which the rescale pass may shorten and
//! [`Scheduler::show_now`] may abandon.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::SchedulerConfig;
use crate::error::QueueError;
use crate::item::{
    saturating_millis, CurrentDisplay, CurrentSnapshot, Enqueued, QueueItem, MAX_PRIORITY,
    MIN_DURATION,
};
use crate::rescale;
use crate::sink::DisplaySink;
use crate::wait::{dynamic_wait, Wait, WaitHandle};

/// Serializes prioritized, time-boxed messages onto one [`DisplaySink`].
///
/// Cloning is cheap; clones share the same queue.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<State>,
    sink: Arc<dyn DisplaySink>,
    runtime: Handle,
    idle: Notify,
}

struct State {
    config: SchedulerConfig,
    queue: VecDeque<QueueItem>,
    current: Option<CurrentDisplay>,
    active_wait: Option<WaitHandle>,
    loop_task: Option<JoinHandle<()>>,
    processing: bool,
    /// Bumped by `show_now`; a display loop from an older generation exits
    /// without touching the sink.
    generation: u64,
}

impl Scheduler {
    /// Create a scheduler driven by the ambient tokio runtime.
    pub fn new(config: SchedulerConfig, sink: Arc<dyn DisplaySink>) -> Result<Self, QueueError> {
        let runtime = Handle::try_current().map_err(|_| QueueError::NoRuntime)?;
        Self::with_runtime(config, sink, runtime)
    }

    /// Create a scheduler whose display loop runs on `runtime`.
    pub fn with_runtime(
        config: SchedulerConfig,
        sink: Arc<dyn DisplaySink>,
        runtime: Handle,
    ) -> Result<Self, QueueError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    config,
                    queue: VecDeque::new(),
                    current: None,
                    active_wait: None,
                    loop_task: None,
                    processing: false,
                    generation: 0,
                }),
                sink,
                runtime,
                idle: Notify::new(),
            }),
        })
    }

    /// Queue `message` for `duration` at `priority` (higher shows first).
    ///
    /// May shrink the on-screen item and other low-priority items to keep the
    /// low-priority total within budget.
    pub fn enqueue(
        &self,
        message: impl Into<String>,
        duration: Duration,
        priority: i64,
    ) -> Enqueued {
        let message = message.into();
        let mut state = self.inner.lock();

        if state.config.skip_duplicate_messages
            && state.queue.iter().any(|q| q.message == message)
        {
            debug!(%message, "duplicate already pending, skipping");
            return Enqueued::Duplicate;
        }

        debug!(
            %message,
            duration_ms = saturating_millis(duration),
            priority,
            "enqueue"
        );
        state.queue.push_back(QueueItem::new(message, duration, priority));
        state.adjust_timeouts();
        state
            .queue
            .make_contiguous()
            .sort_by(|a, b| b.priority.cmp(&a.priority));

        if !state.processing {
            self.inner.start_processing(&mut state);
        }

        let snapshot: Vec<_> = state
            .queue
            .iter()
            .map(|i| (i.message.as_str(), saturating_millis(i.duration)))
            .collect();
        debug!(
            pending = state.queue.len(),
            queue = ?snapshot,
            "queue after enqueue"
        );
        Enqueued::Queued
    }

    /// [`enqueue`](Self::enqueue) at priority 0.
    pub fn enqueue_default(&self, message: impl Into<String>, duration: Duration) -> Enqueued {
        self.enqueue(message, duration, 0)
    }

    /// Drop everything pending, abandon the on-screen item and show `message`
    /// right away. Bypasses duplicate suppression and the budget.
    pub fn show_now(&self, message: impl Into<String>, duration: Duration) {
        let message = message.into();
        let mut state = self.inner.lock();

        if let Some(wait) = state.active_wait.take() {
            wait.cancel();
        }
        if let Some(task) = state.loop_task.take() {
            task.abort();
        }
        state.generation = state.generation.wrapping_add(1);
        state.current = None;
        state.processing = false;

        let dropped = state.queue.len();
        state.queue.clear();
        debug!(%message, dropped, "show now");
        state
            .queue
            .push_back(QueueItem::new(message, duration, MAX_PRIORITY));

        self.inner.start_processing(&mut state);
    }

    /// Set the low-priority budget. Values below 100 ms are rejected and
    /// leave the previous budget in place.
    pub fn set_max_timeout(&self, max_timeout: Duration) -> Result<(), QueueError> {
        let requested_ms = saturating_millis(max_timeout);
        if max_timeout < MIN_DURATION {
            warn!(requested_ms, "rejecting max timeout below floor");
            return Err(QueueError::MaxTimeoutTooSmall {
                requested_ms,
                min_ms: saturating_millis(MIN_DURATION),
            });
        }
        self.inner.lock().config.max_timeout_ms = requested_ms;
        Ok(())
    }

    pub fn set_skip_duplicate_messages(&self, skip: bool) {
        self.inner.lock().config.skip_duplicate_messages = skip;
    }

    /// Priorities at or below `threshold` count against the budget.
    pub fn set_low_priority_threshold(&self, threshold: i64) {
        self.inner.lock().config.low_priority_threshold = threshold;
    }

    /// Snapshot of the pending queue in display order.
    pub fn pending(&self) -> Vec<QueueItem> {
        self.inner.lock().queue.iter().cloned().collect()
    }

    /// The message on screen, if any.
    pub fn current(&self) -> Option<CurrentSnapshot> {
        let state = self.inner.lock();
        let now = Instant::now();
        state.current.as_ref().map(|c| CurrentSnapshot {
            message: c.message.clone(),
            priority: c.priority,
            remaining: c.remaining(now),
        })
    }

    /// Whether the display loop is running.
    pub fn is_processing(&self) -> bool {
        self.inner.lock().processing
    }

    /// Low-priority time currently counted against the budget.
    pub fn low_priority_load(&self) -> Duration {
        self.inner.lock().low_priority_load(Instant::now())
    }

    pub fn settings(&self) -> SchedulerConfig {
        self.inner.lock().config.clone()
    }

    /// Resolve once the queue has drained and nothing is on screen.
    pub async fn idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.is_processing() {
                return;
            }
            notified.await;
        }
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Show the head of the queue and spawn the loop that paces the rest.
    fn start_processing(self: &Arc<Self>, state: &mut State) {
        let Some(wait) = self.display_next(state) else {
            return;
        };
        state.processing = true;
        let generation = state.generation;
        let inner = Arc::clone(self);
        state.loop_task = Some(self.runtime.spawn(inner.run_loop(generation, wait)));
    }

    /// Pop the highest-priority item, hand it to the sink and arm its wait.
    fn display_next(&self, state: &mut State) -> Option<Wait> {
        let item = state.queue.pop_front()?;

        self.sink.display(&item.message, item.duration);
        debug!(
            message = %item.message,
            duration_ms = saturating_millis(item.duration),
            "displaying"
        );

        state.current = Some(CurrentDisplay::new(&item, Instant::now()));

        if let Some(stale) = state.active_wait.take() {
            if stale.is_outstanding() {
                warn!("previous wait was not resolved, cleaning up");
                stale.resolve();
            }
        }

        let (handle, wait) = dynamic_wait(item.duration);
        state.active_wait = Some(handle);
        Some(wait)
    }

    async fn run_loop(self: Arc<Self>, generation: u64, mut wait: Wait) {
        loop {
            let outcome = wait.wait().await;

            let mut state = self.lock();
            if state.generation != generation {
                debug!(generation, "superseded display loop exiting");
                return;
            }
            debug!(?outcome, "wait finished");
            state.current = None;

            match self.display_next(&mut state) {
                Some(next) => wait = next,
                None => {
                    state.processing = false;
                    state.loop_task = None;
                    state.active_wait = None;
                    drop(state);
                    debug!("queue drained, idle");
                    self.idle.notify_waiters();
                    return;
                }
            }
        }
    }
}

impl State {
    fn current_low_priority_remaining(&self, now: Instant) -> Option<Duration> {
        let threshold = self.config.low_priority_threshold;
        self.current
            .as_ref()
            .filter(|c| c.priority <= threshold)
            .map(|c| c.remaining(now))
    }

    fn low_priority_load(&self, now: Instant) -> Duration {
        rescale::low_priority_load(
            &self.queue,
            self.current_low_priority_remaining(now),
            self.config.low_priority_threshold,
        )
    }

    /// Shrink low-priority durations, including the on-screen item's
    /// remaining time, so their total fits `max_timeout`.
    fn adjust_timeouts(&mut self) {
        let now = Instant::now();
        let total = self.low_priority_load(now);
        let Some(coef) = rescale::budget_coefficient(total, self.config.max_timeout()) else {
            return;
        };
        debug!(
            total_ms = saturating_millis(total),
            max_timeout_ms = self.config.max_timeout_ms,
            coef,
            "over budget, rescaling"
        );

        if let Some(remaining) = self.current_low_priority_remaining(now) {
            if !remaining.is_zero() {
                let adjusted = rescale::scale(remaining, coef);
                if let Some(wait) = &self.active_wait {
                    wait.rescale(adjusted);
                }
                if let Some(current) = self.current.as_mut() {
                    current.total = adjusted;
                    current.started_at = now;
                }
            }
        }

        rescale::shrink_pending(&mut self.queue, self.config.low_priority_threshold, coef);
    }
}
