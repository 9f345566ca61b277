//! Execution policy applied around controller calls.

use std::time::{Duration, Instant};

/// Limits applied to every controller invocation of a container.
///
/// Controllers run synchronously and cannot be interrupted, so the timeout
/// is checked once the call returns: a decision that arrives late is
/// discarded and treated as a rejection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControllerPolicy {
    pub timeout: Option<Duration>,
}

impl ControllerPolicy {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    /// Check an invocation's elapsed time against the timeout.
    ///
    /// Returns the elapsed time when it exceeds the limit.
    pub(crate) fn exceeded(&self, invocation: &Invocation) -> Option<Duration> {
        let timeout = self.timeout?;
        let elapsed = invocation.elapsed();
        (elapsed > timeout).then_some(elapsed)
    }
}

/// Timing of a single controller call, on the monotonic clock.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Invocation {
    pub started_at: Instant,
}

impl Invocation {
    pub fn start() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
