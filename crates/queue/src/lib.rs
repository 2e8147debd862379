//! Priority-aware scheduler for transient status messages.
//!
//! This crate provides:
//! - `Scheduler` serializing prioritized messages onto one display surface
//! - Budget enforcement that shrinks low-priority durations in flight
//! - A renewable, shrink-only wait pacing the display loop
//! - `DisplaySink` trait for the rendering surface

pub mod config;
pub mod error;
pub mod global;
pub mod item;
pub mod rescale;
pub mod scheduler;
pub mod sink;
pub mod wait;

pub use config::SchedulerConfig;
pub use error::QueueError;
pub use item::{CurrentSnapshot, Enqueued, QueueItem, MAX_PRIORITY, MIN_DURATION};
pub use scheduler::Scheduler;
pub use sink::{DisplaySink, TracingSink};
pub use wait::{dynamic_wait, Wait, WaitHandle, WaitOutcome};
