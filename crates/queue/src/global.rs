//! Process-wide scheduler instance.
//!
//! Prefer passing a [`Scheduler`] around explicitly. The global exists for
//! hosts that need one shared display queue reachable from anywhere; it lives
//! for the rest of the process once installed.

use std::sync::OnceLock;

use crate::error::QueueError;
use crate::scheduler::Scheduler;

static GLOBAL: OnceLock<Scheduler> = OnceLock::new();

/// Install `scheduler` as the global instance.
pub fn install(scheduler: Scheduler) -> Result<&'static Scheduler, QueueError> {
    GLOBAL
        .set(scheduler)
        .map_err(|_| QueueError::AlreadyInstalled)?;
    GLOBAL.get().ok_or(QueueError::AlreadyInstalled)
}

/// The global instance, if one has been installed.
pub fn get() -> Option<&'static Scheduler> {
    GLOBAL.get()
}

/// The global instance, constructing it with `init` on first use.
pub fn get_or_init(init: impl FnOnce() -> Scheduler) -> &'static Scheduler {
    GLOBAL.get_or_init(init)
}
