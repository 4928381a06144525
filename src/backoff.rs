use std::time::Duration;

use tokio::time::Instant;

/// Retry pacing for one in-flight call.
///
/// The interval doubles after every retry, saturating at `max_interval`.
/// A fresh value is created for every call.
#[derive(Clone, Debug)]
pub struct Backoff {
    current: Duration,
    max_interval: Duration,
    started: Instant,
    deadline: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max_interval: Duration, deadline: Duration) -> Self {
        Self {
            current: initial.min(max_interval),
            max_interval,
            started: Instant::now(),
            deadline,
        }
    }

    pub fn current_interval(&self) -> Duration {
        self.current
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// True once more time than the deadline has passed since the call began.
    pub fn is_expired(&self) -> bool {
        self.elapsed() > self.deadline
    }

    /// Returns the delay for this retry and advances the interval.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max_interval);
        delay
    }
}
