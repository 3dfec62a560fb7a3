//! Elapsed-seconds counter.
//!
//! One ticker thread increments the counter once per period; the state
//! machine reads it every step and resets it on transitions. Only
//! second-level precision is needed, so all accesses are relaxed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use autodock_common::consts::TIMEBASE_WRAP;
use tracing::{debug, trace};

/// Shared seconds counter. Clones observe the same value.
#[derive(Debug, Clone, Default)]
pub struct Timebase {
    seconds: Arc<AtomicU16>,
}

impl Timebase {
    /// Counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the last reset.
    #[inline]
    pub fn seconds(&self) -> u16 {
        self.seconds.load(Ordering::Relaxed)
    }

    /// Restart from zero.
    #[inline]
    pub fn reset(&self) {
        self.seconds.store(0, Ordering::Relaxed);
    }

    /// Overwrite the counter.
    #[inline]
    pub fn set(&self, value: u16) {
        self.seconds.store(value, Ordering::Relaxed);
    }

    /// Advance by one second. Reaching `0xFFFF` wraps to 0.
    ///
    /// A single read-modify-write, so a concurrent `reset()` is never lost.
    pub fn tick(&self) -> u16 {
        let prev = self
            .seconds
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |s| Some(next_second(s)))
            .unwrap_or_else(|s| s);
        next_second(prev)
    }

    /// Tick once per `period` on a dedicated thread until `running` clears.
    pub fn spawn_ticker(
        &self,
        period: Duration,
        running: Arc<AtomicBool>,
    ) -> std::io::Result<JoinHandle<()>> {
        let timebase = self.clone();
        std::thread::Builder::new()
            .name("timebase".to_string())
            .spawn(move || {
                debug!("Timebase ticking every {}ms", period.as_millis());
                let mut next = Instant::now() + period;
                while running.load(Ordering::SeqCst) {
                    // Short sleeps keep shutdown latency low with a 1s period.
                    let now = Instant::now();
                    if now < next {
                        std::thread::sleep((next - now).min(Duration::from_millis(50)));
                        continue;
                    }
                    next += period;
                    let s = timebase.tick();
                    trace!("timer_sec={}", s);
                }
                debug!("Timebase stopped at {}s", timebase.seconds());
            })
    }
}

fn next_second(s: u16) -> u16 {
    match s.wrapping_add(1) {
        TIMEBASE_WRAP => 0,
        n => n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_counter() {
        let a = Timebase::new();
        let b = a.clone();
        a.tick();
        a.tick();
        assert_eq!(b.seconds(), 2);
        b.reset();
        assert_eq!(a.seconds(), 0);
    }

    #[test]
    fn wraps_at_ffff() {
        let t = Timebase::new();
        t.set(0xFFFD);
        assert_eq!(t.tick(), 0xFFFE);
        assert_eq!(t.tick(), 0);
        assert_eq!(t.tick(), 1);
    }

    #[test]
    fn concurrent_ticks_are_not_lost() {
        let t = Timebase::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let t = t.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        t.tick();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(t.seconds(), 4000);
    }

    #[test]
    fn reset_between_ticks_restarts_count() {
        let t = Timebase::new();
        t.set(11);
        let other = t.clone();
        other.reset();
        assert_eq!(t.tick(), 1);
    }

    #[test]
    fn ticker_advances_and_stops() {
        let t = Timebase::new();
        let running = Arc::new(AtomicBool::new(true));
        let handle = t
            .spawn_ticker(Duration::from_millis(5), Arc::clone(&running))
            .unwrap();
        std::thread::sleep(Duration::from_millis(60));
        running.store(false, Ordering::SeqCst);
        handle.join().unwrap();
        assert!(t.seconds() > 0);
    }
}
