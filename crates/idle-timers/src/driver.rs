use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::manager::TimerManager;

/// Drives a [`TimerManager`] from the wall clock.
///
/// Scheduler time is anchored to the manager's current time when the driver
/// is attached; from then on one wall-clock millisecond is one scheduler
/// millisecond. The driver sleeps the thread until the next host deadline, so
/// it must run on the thread that owns the manager and its state.
#[derive(Debug, Clone, Copy)]
pub struct RealtimeDriver {
    origin: Instant,
    base_ms: u64,
}

impl RealtimeDriver {
    /// Anchor a driver to the manager's current scheduler time.
    pub fn attach<S>(timers: &TimerManager<S>) -> Self {
        Self {
            origin: Instant::now(),
            base_ms: timers.now_ms(),
        }
    }

    /// Scheduler time corresponding to the given instant.
    pub fn scheduler_time(&self, at: Instant) -> u64 {
        let elapsed = at.saturating_duration_since(self.origin).as_millis();
        self.base_ms
            .saturating_add(u64::try_from(elapsed).unwrap_or(u64::MAX))
    }

    /// Wall-clock instant at which the given scheduler time is reached.
    pub fn instant_for(&self, scheduler_ms: u64) -> Instant {
        self.origin + Duration::from_millis(scheduler_ms.saturating_sub(self.base_ms))
    }

    /// Fire everything that is due right now, without sleeping.
    pub fn step<S>(&self, timers: &mut TimerManager<S>, state: &mut S) -> usize {
        timers.advance_to(self.scheduler_time(Instant::now()), state)
    }

    /// Run the manager in real time for `duration`. Returns the number of host firings.
    ///
    /// Stops early if the manager is shut down (for example by one of its own
    /// callbacks).
    pub fn run_for<S>(&self, timers: &mut TimerManager<S>, state: &mut S, duration: Duration) -> usize {
        let deadline = Instant::now() + duration;
        let mut fired = 0;
        loop {
            fired += self.step(timers, state);
            let now = Instant::now();
            if now >= deadline || timers.is_shutting_down() {
                break;
            }
            let wake = timers
                .next_deadline()
                .map(|ms| self.instant_for(ms).min(deadline))
                .unwrap_or(deadline);
            if wake > now {
                thread::sleep(wake - now);
            }
        }
        debug!(fired, now_ms = timers.now_ms(), "realtime run finished");
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::IntervalOptions;

    #[test]
    fn time_mapping_round_trips() {
        let timers = TimerManager::<()>::default();
        let driver = RealtimeDriver::attach(&timers);
        let at = driver.instant_for(250);
        assert_eq!(driver.scheduler_time(at), 250);
    }

    #[test]
    fn run_for_fires_intervals() {
        let mut timers = TimerManager::<u32>::default();
        let mut count = 0u32;
        timers
            .set_interval(
                |cx| {
                    *cx.state += 1;
                    Ok(())
                },
                100,
                "count",
                IntervalOptions::default(),
            )
            .unwrap();
        let driver = RealtimeDriver::attach(&timers);
        driver.run_for(&mut timers, &mut count, Duration::from_millis(350));
        assert!(count >= 2, "expected at least two firings, got {count}");
        assert!(count <= 4, "expected at most four firings, got {count}");
    }
}
