use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic clock with nanosecond timestamps.
pub trait Timer: Clone + Send + Sync {
    fn now(&self) -> u64;
    fn sleep(&self, d: Duration);

    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }

    /// Sleeps until `deadline`; returns immediately if it already passed.
    fn sleep_until(&self, deadline: u64) {
        let now = self.now();
        if deadline > now {
            self.sleep(Duration::from_nanos(deadline - now));
        }
    }
}

/// Whole milliseconds from `origin` to `at`, rounded down.
pub fn ms_between(origin: u64, at: u64) -> u64 {
    at.saturating_sub(origin) / 1_000_000
}

/// Wall-clock timer for real-time runs.
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
}

impl Timer for HighPrecisionTimer {
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{CLOCK_MONOTONIC, clock_nanosleep, timespec};

        let req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };

        // SAFETY: `req` is a valid timespec and a null remainder pointer is allowed.
        let rc = unsafe { clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut()) };
        if rc != 0 {
            tracing::trace!(rc, "clock_nanosleep interrupted, falling back to thread::sleep");
            std::thread::sleep(duration);
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Virtual clock that only moves when slept on or advanced. Clones share
/// the same time, so a scheduler and its driver can hold one each.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ns: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns.fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, ns: u64) {
        self.now_ns.store(ns, Ordering::SeqCst);
    }

    pub fn now_ms(&self) -> u64 {
        self.now() / 1_000_000
    }
}

impl Timer for ManualClock {
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_shared_between_clones() {
        let a = ManualClock::new();
        let b = a.clone();
        a.sleep(Duration::from_millis(5));
        assert_eq!(b.now(), 5_000_000);
        b.sleep_until(12_000_000);
        assert_eq!(a.now_ms(), 12);
        // past deadlines do not move the clock
        a.sleep_until(1);
        assert_eq!(a.now_ms(), 12);
    }

    #[test]
    fn elapsed_saturates() {
        let c = ManualClock::new();
        c.set(10);
        assert_eq!(c.elapsed(50), Duration::ZERO);
        assert_eq!(c.elapsed(4), Duration::from_nanos(6));
    }

    #[test]
    fn ms_between_rounds_down() {
        assert_eq!(ms_between(0, 150_999_999), 150);
        assert_eq!(ms_between(10, 5), 0);
    }

    #[test]
    fn high_precision_sleep_waits_at_least_requested() {
        let t = HighPrecisionTimer::new();
        let before = t.now();
        t.sleep(Duration::from_millis(2));
        assert!(t.elapsed(before) >= Duration::from_millis(2));
    }
}
