//! Display surface abstraction.

use std::time::Duration;

/// The single surface messages are rendered on.
///
/// Called with the scheduler's state lock held, so implementations must hand
/// off rendering and return promptly, and must not call back into the
/// [`Scheduler`](crate::Scheduler).
pub trait DisplaySink: Send + Sync {
    /// Show `message` for `duration`.
    fn display(&self, message: &str, duration: Duration);
}

impl<F> DisplaySink for F
where
    F: Fn(&str, Duration) + Send + Sync,
{
    fn display(&self, message: &str, duration: Duration) {
        self(message, duration)
    }
}

/// Sink that logs every message at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DisplaySink for TracingSink {
    fn display(&self, message: &str, duration: Duration) {
        tracing::info!(duration_ms = crate::item::saturating_millis(duration), "{message}");
    }
}

/// Recording sink for tests.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    use tokio::time::Instant;

    /// One call to [`DisplaySink::display`].
    #[derive(Debug, Clone)]
    pub struct Shown {
        pub message: String,
        pub duration: Duration,
        pub at: Instant,
    }

    /// Collects every displayed message in call order.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSink {
        shown: Arc<Mutex<Vec<Shown>>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn shown(&self) -> Vec<Shown> {
            self.shown.lock().unwrap().clone()
        }

        pub fn messages(&self) -> Vec<String> {
            self.shown().into_iter().map(|s| s.message).collect()
        }
    }

    impl DisplaySink for RecordingSink {
        fn display(&self, message: &str, duration: Duration) {
            self.shown.lock().unwrap().push(Shown {
                message: message.to_string(),
                duration,
                at: Instant::now(),
            });
        }
    }
}
