//! Query debounce control
//!
//! Optional delay between a query edit and the ranking pass it triggers.
//! The delay grows with the size of the candidate set, so small lists stay
//! instant while very large ones are not re-ranked on every keystroke.

use std::time::{Duration, Instant};

/// Delay for a candidate set of `count` items, by number of decimal digits.
pub fn wait_time_for(count: usize) -> Duration {
    let digits = if count == 0 { 1 } else { count.ilog10() + 1 };
    match digits {
        0 | 1 => Duration::ZERO,
        2 => Duration::from_millis(50),
        3 => Duration::from_millis(100),
        4 => Duration::from_millis(200),
        5 => Duration::from_millis(300),
        more => Duration::from_millis(300).saturating_mul(1u32 << (more - 5).min(16)),
    }
}

/// Rate-limits ranking requests while the user is typing
#[derive(Debug)]
pub struct Debouncer {
    /// Delay between the last edit and the ranking pass
    pub delay: Duration,

    /// Query waiting for the delay to expire
    pub pending_query: Option<String>,

    /// Time of the last edit
    pub last_input_time: Option<Instant>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            pending_query: None,
            last_input_time: None,
        }
    }

    /// Debouncer sized for a candidate set.
    pub fn for_candidates(count: usize) -> Self {
        Self::with_delay(wait_time_for(count))
    }

    /// Record an edit. A newer query replaces any pending one.
    pub fn set_pending(&mut self, query: String) {
        self.pending_query = Some(query);
        self.last_input_time = Some(Instant::now());
    }

    /// Take the pending query once the delay has elapsed.
    pub fn take_ready(&mut self) -> Option<String> {
        let last_time = self.last_input_time?;
        if last_time.elapsed() < self.delay {
            return None;
        }
        let query = self.pending_query.take();
        self.last_input_time = None;
        query
    }

    pub fn has_pending(&self) -> bool {
        self.pending_query.is_some()
    }

    pub fn time_until_ready(&self) -> Option<Duration> {
        let last_time = self.last_input_time?;
        Some(self.delay.saturating_sub(last_time.elapsed()))
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}
