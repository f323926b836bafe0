use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use crate::timer::Timer;

/// Delayed delivery of `E` values back to whoever drives the scheduler.
pub trait Scheduler<E> {
    type Handle: Copy + Eq + fmt::Debug;

    fn after(&mut self, delay: Duration, event: E) -> Self::Handle;

    /// Returns false if the handle already fired or was cancelled.
    fn cancel(&mut self, handle: Self::Handle) -> bool;

    fn cancel_all(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeoutHandle(u64);

/// Pending timeouts ordered by due time; equal due times fire in the order
/// they were scheduled.
#[derive(Debug)]
pub struct TimerQueue<E, T: Timer> {
    clock: T,
    next_id: u64,
    pending: BTreeMap<(u64, u64), E>,
    due_by_id: HashMap<u64, u64>,
}

impl<E, T: Timer> TimerQueue<E, T> {
    pub fn new(clock: T) -> Self {
        Self {
            clock,
            next_id: 0,
            pending: BTreeMap::new(),
            due_by_id: HashMap::new(),
        }
    }

    /// Due time of the earliest pending timeout.
    pub fn next_due(&self) -> Option<u64> {
        self.pending.keys().next().map(|&(due, _)| due)
    }

    /// Removes and returns the earliest timeout if it is due at `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<(TimeoutHandle, E)> {
        let (&(due, id), _) = self.pending.iter().next()?;
        if due > now {
            return None;
        }
        let event = self.pending.remove(&(due, id))?;
        self.due_by_id.remove(&id);
        Some((TimeoutHandle(id), event))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<E, T: Timer> Scheduler<E> for TimerQueue<E, T> {
    type Handle = TimeoutHandle;

    fn after(&mut self, delay: Duration, event: E) -> TimeoutHandle {
        let id = self.next_id;
        self.next_id += 1;
        let delay_ns = u64::try_from(delay.as_nanos()).unwrap_or(u64::MAX);
        let due = self.clock.now().saturating_add(delay_ns);
        self.pending.insert((due, id), event);
        self.due_by_id.insert(id, due);
        tracing::trace!(id, due, "timeout scheduled");
        TimeoutHandle(id)
    }

    fn cancel(&mut self, handle: TimeoutHandle) -> bool {
        match self.due_by_id.remove(&handle.0) {
            Some(due) => self.pending.remove(&(due, handle.0)).is_some(),
            None => false,
        }
    }

    fn cancel_all(&mut self) {
        self.pending.clear();
        self.due_by_id.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_in_due_order_then_fifo() {
        let clock = ManualClock::new();
        let mut q = TimerQueue::new(clock.clone());
        q.after(ms(20), "late");
        q.after(ms(10), "first");
        q.after(ms(10), "second");

        assert!(q.pop_due(clock.now()).is_none());
        clock.sleep_until(q.next_due().unwrap());
        assert_eq!(q.pop_due(clock.now()).map(|(_, e)| e), Some("first"));
        assert_eq!(q.pop_due(clock.now()).map(|(_, e)| e), Some("second"));
        assert!(q.pop_due(clock.now()).is_none());

        clock.advance(ms(10));
        assert_eq!(q.pop_due(clock.now()).map(|(_, e)| e), Some("late"));
        assert!(q.is_empty());
    }

    #[test]
    fn delays_are_relative_to_scheduling_time() {
        let clock = ManualClock::new();
        let mut q = TimerQueue::new(clock.clone());
        clock.advance(ms(100));
        q.after(ms(5), ());
        assert_eq!(q.next_due(), Some(105_000_000));
    }

    #[test]
    fn huge_delays_clamp_instead_of_wrapping() {
        let clock = ManualClock::new();
        let mut q = TimerQueue::new(clock.clone());
        clock.advance(ms(3));
        q.after(Duration::from_millis(18_446_744_073_710), "far");
        q.after(Duration::MAX, "never");
        q.after(ms(1), "soon");

        assert_eq!(q.next_due(), Some(4_000_000));
        assert_eq!(q.pop_due(clock.now() + 1_000_000).map(|(_, e)| e), Some("soon"));
        assert_eq!(q.next_due(), Some(u64::MAX));
        assert!(q.pop_due(u64::MAX - 1).is_none());
    }

    #[test]
    fn cancel_is_idempotent() {
        let clock = ManualClock::new();
        let mut q = TimerQueue::new(clock.clone());
        let h = q.after(ms(1), 1);
        q.after(ms(2), 2);
        assert!(q.cancel(h));
        assert!(!q.cancel(h));
        assert_eq!(q.len(), 1);

        q.cancel_all();
        q.cancel_all();
        assert!(q.is_empty());
        assert_eq!(q.next_due(), None);
    }

    #[test]
    fn fired_handles_cannot_be_cancelled() {
        let clock = ManualClock::new();
        let mut q = TimerQueue::new(clock.clone());
        let h = q.after(Duration::ZERO, 'x');
        let (fired, _) = q.pop_due(clock.now()).unwrap();
        assert_eq!(fired, h);
        assert!(!q.cancel(h));
    }
}
