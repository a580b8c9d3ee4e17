//! Tick scheduling for envelope playback.
//!
//! Every envelope in the engine advances on the same fixed-interval tick
//! clock instead of owning its own timer. The [`TickScheduler`] converts
//! irregular host-clock progress into a whole number of due ticks using a
//! fractional accumulator, so cadence does not drift, and it tracks which
//! [`TickHandle`]s are still live so a cancelled envelope can never be
//! advanced again.

use std::collections::HashSet;
use std::time::Duration;

/// Handle to a repeating tick subscription.
///
/// Returned by [`TickScheduler::schedule_repeating`]. A handle stays live
/// until [`TickScheduler::cancel`] is called with it; cancellation is
/// idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

/// Fixed-interval tick clock shared by every envelope run.
///
/// The host drives the scheduler with elapsed wall-clock time via
/// [`advance`](Self::advance); the scheduler answers with how many whole
/// ticks are due. Sub-tick remainders carry over to the next call, so
/// calling `advance` at an uneven rate still produces the right long-run
/// tick count.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use chime::TickScheduler;
///
/// let mut scheduler = TickScheduler::new(10);
///
/// // 25ms at a 10ms interval: two ticks due, 5ms carried over.
/// assert_eq!(scheduler.advance(Duration::from_millis(25)), 2);
/// assert_eq!(scheduler.advance(Duration::from_millis(5)), 1);
/// ```
#[derive(Debug)]
pub struct TickScheduler {
    /// Tick interval in milliseconds
    interval_ms: u32,
    /// Elapsed time not yet converted into ticks, in nanoseconds
    carry_ns: u64,
    /// Next handle id
    next_id: u64,
    /// Handles that have been issued and not yet cancelled
    live: HashSet<u64>,
}

impl TickScheduler {
    /// Creates a scheduler with the given tick interval.
    ///
    /// # Panics
    ///
    /// Panics if `interval_ms` is 0.
    pub fn new(interval_ms: u32) -> Self {
        assert!(interval_ms > 0, "tick interval must be greater than 0");
        Self {
            interval_ms,
            carry_ns: 0,
            next_id: 0,
            live: HashSet::new(),
        }
    }

    /// Tick interval in milliseconds.
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Tick interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.interval_ms))
    }

    /// Registers a new repeating subscription and returns its handle.
    pub fn schedule_repeating(&mut self) -> TickHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(id);
        TickHandle(id)
    }

    /// Cancels a subscription. Cancelling an already-cancelled handle is a
    /// no-op.
    pub fn cancel(&mut self, handle: TickHandle) {
        self.live.remove(&handle.0);
    }

    /// Returns true if the handle has not been cancelled.
    pub fn is_live(&self, handle: TickHandle) -> bool {
        self.live.contains(&handle.0)
    }

    /// Number of live subscriptions.
    ///
    /// An idle engine holds zero live handles; this is the leak check.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Advances the clock and returns how many whole ticks are now due.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let elapsed_ns = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.carry_ns = self.carry_ns.saturating_add(elapsed_ns);

        let interval_ns = u64::from(self.interval_ms) * 1_000_000;
        let due = self.carry_ns / interval_ns;
        self.carry_ns -= due * interval_ns;
        u32::try_from(due).unwrap_or(u32::MAX)
    }

    /// Converts a millisecond duration into a tick count at this interval.
    ///
    /// Rounds up, so any non-zero duration spans at least one tick. A zero
    /// duration maps to zero ticks (the phase is skipped outright).
    pub fn ticks_for(&self, duration_ms: u32) -> u32 {
        duration_ms.div_ceil(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates_fractional_time() {
        let mut scheduler = TickScheduler::new(10);
        assert_eq!(scheduler.advance(Duration::from_millis(4)), 0);
        assert_eq!(scheduler.advance(Duration::from_millis(4)), 0);
        assert_eq!(scheduler.advance(Duration::from_millis(4)), 1);
    }

    #[test]
    fn test_advance_many_ticks_at_once() {
        let mut scheduler = TickScheduler::new(10);
        assert_eq!(scheduler.advance(Duration::from_millis(105)), 10);
        assert_eq!(scheduler.advance(Duration::from_millis(5)), 1);
    }

    #[test]
    fn test_no_drift_over_uneven_calls() {
        let mut scheduler = TickScheduler::new(10);
        let mut total = 0;
        // 100 calls of 7ms each = 700ms = 70 ticks exactly.
        for _ in 0..100 {
            total += scheduler.advance(Duration::from_millis(7));
        }
        assert_eq!(total, 70);
    }

    #[test]
    fn test_handles_are_unique() {
        let mut scheduler = TickScheduler::new(10);
        let a = scheduler.schedule_repeating();
        let b = scheduler.schedule_repeating();
        assert_ne!(a, b);
        assert_eq!(scheduler.live_count(), 2);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut scheduler = TickScheduler::new(10);
        let handle = scheduler.schedule_repeating();
        assert!(scheduler.is_live(handle));

        scheduler.cancel(handle);
        assert!(!scheduler.is_live(handle));
        assert_eq!(scheduler.live_count(), 0);

        // Second cancel changes nothing.
        scheduler.cancel(handle);
        assert_eq!(scheduler.live_count(), 0);
    }

    #[test]
    fn test_ticks_for_rounds_up() {
        let scheduler = TickScheduler::new(10);
        assert_eq!(scheduler.ticks_for(0), 0);
        assert_eq!(scheduler.ticks_for(1), 1);
        assert_eq!(scheduler.ticks_for(10), 1);
        assert_eq!(scheduler.ticks_for(11), 2);
        assert_eq!(scheduler.ticks_for(95), 10);
    }

    #[test]
    #[should_panic(expected = "tick interval")]
    fn test_zero_interval_panics() {
        TickScheduler::new(0);
    }
}
