//! Inactivity timer turning raw input into a settled query.
//!
//! The debouncer owns no timer task. The event loop feeds it every input change and
//! polls it on each heartbeat; all times are passed in explicitly.

use std::time::{Duration, Instant};

/// Default inactivity window
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Settles a value once it stopped changing for `delay`
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
    settled: String,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_DELAY)
    }
}

impl Debouncer {
    /// Creates a debouncer with an empty settled value
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            settled: String::new(),
        }
    }

    /// Creates a debouncer whose settled value is already `initial`
    pub fn with_initial(delay: Duration, initial: &str) -> Self {
        Self {
            settled: initial.to_string(),
            ..Self::new(delay)
        }
    }

    /// Records a new raw value, restarting the timer
    pub fn on_input(&mut self, value: &str, now: Instant) {
        self.pending = Some((value.to_string(), now + self.delay));
    }

    /// Returns the newly settled value once the deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<&str> {
        if !matches!(&self.pending, Some((_, deadline)) if now >= *deadline) {
            return None;
        }
        let (value, _) = self.pending.take()?;
        trace!("settled on {value:?}");
        self.settled = value;
        Some(&self.settled)
    }

    /// The last settled value
    pub fn settled(&self) -> &str {
        &self.settled
    }
}
