//! # Time Source
//!
//! Accrual is a pure function of elapsed seconds, so the vault never reads
//! the wall clock directly -- it asks a [`Clock`]. Production code hands it
//! a [`SystemClock`]; tests hand it a [`ManualClock`] and advance time
//! explicitly, which is what makes "wait a year, check the interest"
//! scenarios deterministic.

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonic source of Unix timestamps (seconds).
pub trait Clock: Send + Sync {
    /// Current time as Unix seconds.
    fn now(&self) -> u64;
}

/// Wall-clock time via `chrono`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // `timestamp()` is negative only before 1970; clamp rather than
        // wrap if the host clock is that badly broken.
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// A manually driven clock for tests and simulations.
///
/// Starts at a fixed timestamp and only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Creates a clock frozen at `start` (Unix seconds).
    pub fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Moves the clock forward by `seconds`.
    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Jumps the clock to an absolute timestamp.
    pub fn set(&self, timestamp: u64) {
        self.now.store(timestamp, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_starts_frozen() {
        let clock = ManualClock::new(1_700_000_000);
        assert_eq!(clock.now(), 1_700_000_000);
        assert_eq!(clock.now(), 1_700_000_000);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(100);
        clock.advance(3600);
        assert_eq!(clock.now(), 3700);
        clock.set(42);
        assert_eq!(clock.now(), 42);
    }

    #[test]
    fn system_clock_is_past_2020() {
        assert!(SystemClock.now() > 1_577_836_800);
    }
}
