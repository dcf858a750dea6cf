//! Broadcast stopwatch
//!
//! Tracks how long the broadcast has been running, across any number of
//! start/stop cycles. Uses `std::time::Instant` for monotonic guarantees;
//! the clock is injectable so tests can advance time by hand.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic instants.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// The real monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

/// Start/stop/accumulate stopwatch.
///
/// `started_at` is `Some` exactly while running. Elapsed time only grows
/// while running and is never reset.
#[derive(Debug, Clone)]
pub struct ElapsedTimer {
    clock: Arc<dyn Clock>,
    accumulated: Duration,
    started_at: Option<Instant>,
}

impl ElapsedTimer {
    /// Stopped timer on the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            accumulated: Duration::ZERO,
            started_at: None,
        }
    }

    /// Start counting. No-op if already running.
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(self.clock.now());
        }
    }

    /// Stop counting and bank the running segment. No-op if stopped.
    pub fn stop(&mut self) {
        if let Some(started) = self.started_at.take() {
            self.accumulated += self.clock.now().saturating_duration_since(started);
        }
    }

    /// Start if stopped, stop if running. Returns the new running state.
    pub fn toggle(&mut self) -> bool {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
        self.is_running()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        match self.started_at {
            Some(started) => {
                self.accumulated + self.clock.now().saturating_duration_since(started)
            }
            None => self.accumulated,
        }
    }

    /// Whole seconds, truncated
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed().as_secs()
    }
}

impl Default for ElapsedTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual() -> (Arc<ManualClock>, ElapsedTimer) {
        let clock = Arc::new(ManualClock::new());
        let timer = ElapsedTimer::with_clock(clock.clone());
        (clock, timer)
    }

    #[test]
    fn test_new_timer_is_stopped_at_zero() {
        let (_clock, timer) = manual();
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_seconds(), 0);
    }

    #[test]
    fn test_accumulates_across_segments() {
        let (clock, mut timer) = manual();

        timer.start();
        clock.advance(Duration::from_secs(5));
        timer.stop();
        timer.start();
        clock.advance(Duration::from_secs(3));

        assert_eq!(timer.elapsed_seconds(), 8);
    }

    #[test]
    fn test_stopped_timer_ignores_clock() {
        let (clock, mut timer) = manual();

        timer.start();
        clock.advance(Duration::from_secs(2));
        timer.stop();
        clock.advance(Duration::from_secs(60));

        assert_eq!(timer.elapsed_seconds(), 2);
    }

    #[test]
    fn test_start_and_stop_are_idempotent() {
        let (clock, mut timer) = manual();

        timer.start();
        clock.advance(Duration::from_secs(4));
        // A second start must not restart the running segment
        timer.start();
        clock.advance(Duration::from_secs(1));
        timer.stop();
        timer.stop();

        assert_eq!(timer.elapsed_seconds(), 5);
    }

    #[test]
    fn test_truncates_to_whole_seconds() {
        let (clock, mut timer) = manual();
        timer.start();
        clock.advance(Duration::from_millis(2999));
        assert_eq!(timer.elapsed_seconds(), 2);
    }

    #[test]
    fn test_toggle() {
        let (clock, mut timer) = manual();
        assert!(timer.toggle());
        clock.advance(Duration::from_secs(7));
        assert!(!timer.toggle());
        assert_eq!(timer.elapsed(), Duration::from_secs(7));
    }

    #[test]
    fn test_never_decreases_while_running() {
        let (clock, mut timer) = manual();
        timer.start();
        let mut last = timer.elapsed();
        for _ in 0..10 {
            clock.advance(Duration::from_millis(250));
            let now = timer.elapsed();
            assert!(now >= last);
            last = now;
        }
    }
}
