use idle_timers::{IntervalOptions, TimerId, TimerManager, normalize_interval};
use serde::Serialize;
use tracing::{error, trace};

use crate::config::TickConfig;
use crate::economy::{Economy, EconomySnapshot};
use crate::error::LoopResult;

/// The game state the tick loop credits.
pub trait TickTarget {
    /// The economy production is credited to.
    fn economy(&mut self) -> &mut Economy;

    /// Redraw whatever shows the economy. Does nothing by default.
    fn refresh_display(&mut self, _snapshot: &EconomySnapshot) {}

    /// Update subsystems that follow the tick (streak bookkeeping, timed effects).
    ///
    /// Errors are logged and do not stop the tick loop.
    fn after_tick(&mut self, _report: &TickReport) -> anyhow::Result<()> {
        Ok(())
    }
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    /// Scheduler time of the tick, in ms.
    pub now_ms: u64,
    /// Tick interval, in ms.
    pub interval_ms: u64,
    /// Whether SPS was recomputed.
    pub recomputed: bool,
    /// Resources credited.
    pub gained: f64,
    /// SPS after the tick.
    pub sps: f64,
    /// Power of ten SPS crossed during this tick.
    pub milestone: Option<f64>,
}

/// Credits passive income at a fixed interval.
#[derive(Debug, Clone, Default)]
pub struct TickLoop {
    config: TickConfig,
}

impl TickLoop {
    /// Create a tick loop.
    pub fn new(config: TickConfig) -> Self {
        Self { config }
    }

    /// The tick configuration.
    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    /// Run one tick against `target`, crediting the configured interval.
    pub fn tick<T: TickTarget + ?Sized>(&self, target: &mut T, now_ms: u64) -> TickReport {
        let interval_ms = self.config.interval_ms;
        let economy = target.economy();

        let previous = economy.sps();
        let recomputed = economy.is_sps_dirty();
        let sps = if recomputed {
            economy.recompute_sps()
        } else {
            previous
        };
        economy.history_mut().push(sps);

        let scale = (interval_ms as f64 / 1000.0) * economy.time_rate();
        let gained = economy.credit(scale);
        let snapshot = economy.snapshot();

        target.refresh_display(&snapshot);

        let report = TickReport {
            now_ms,
            interval_ms,
            recomputed,
            gained,
            sps,
            milestone: crossed_milestone(previous, sps),
        };
        trace!(now_ms, gained, sps, "tick");

        if let Err(err) = target.after_tick(&report) {
            error!(error = %format!("{err:#}"), "post-tick update failed");
        }
        report
    }

    /// Register the tick with `timers` at the configured interval.
    ///
    /// Each tick credits the normalized interval the timer runs at.
    pub fn start<S>(&self, timers: &mut TimerManager<S>) -> LoopResult<TimerId>
    where
        S: TickTarget + 'static,
    {
        // Credit the period the timer actually runs at, not the one requested.
        let interval_ms = normalize_interval(self.config.interval_ms, timers.config());
        let tick = TickLoop::new(self.config.clone().with_interval_ms(interval_ms));
        let options = IntervalOptions::default().with_max_execution_time_ms(self.config.max_execution_ms);
        let id = timers.try_set_interval(
            move |cx| {
                let now_ms = cx.now_ms();
                tick.tick(&mut *cx.state, now_ms);
                Ok(())
            },
            self.config.interval_ms,
            "tick",
            options,
        )?;
        Ok(id)
    }
}

/// The highest power of ten (at least 10) in `(previous, current]`.
fn crossed_milestone(previous: f64, current: f64) -> Option<f64> {
    if current < 10.0 || current <= previous {
        return None;
    }
    let milestone = 10f64.powi(current.log10().floor() as i32);
    (milestone > previous).then_some(milestone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::ProductionSource;

    #[derive(Default)]
    struct Target {
        economy: Economy,
        refreshed: u32,
        fail_after: bool,
        after: u32,
    }

    impl TickTarget for Target {
        fn economy(&mut self) -> &mut Economy {
            &mut self.economy
        }

        fn refresh_display(&mut self, _snapshot: &EconomySnapshot) {
            self.refreshed += 1;
        }

        fn after_tick(&mut self, _report: &TickReport) -> anyhow::Result<()> {
            self.after += 1;
            if self.fail_after {
                anyhow::bail!("streak bookkeeping broke");
            }
            Ok(())
        }
    }

    fn target(grandmas: u64) -> Target {
        let mut target = Target::default();
        target.economy.add_source(ProductionSource::new("grandma", 1.0));
        target.economy.purchase("grandma", grandmas).unwrap();
        target
    }

    #[test]
    fn tick_runs_all_steps() {
        let mut target = target(4);
        let report = TickLoop::default().tick(&mut target, 100);

        assert!(report.recomputed);
        assert!((report.sps - 4.0).abs() < 1e-9);
        assert!((report.gained - 0.4).abs() < 1e-9);
        assert_eq!(target.economy.history().len(), 1);
        assert_eq!((target.refreshed, target.after), (1, 1));

        let again = TickLoop::default().tick(&mut target, 200);
        assert!(!again.recomputed);
    }

    #[test]
    fn time_rate_scales_credit() {
        let mut target = target(10);
        target.economy.set_time_rate(2.0);
        let report = TickLoop::new(TickConfig::default().with_interval_ms(500)).tick(&mut target, 500);
        assert!((report.gained - 10.0).abs() < 1e-9);
    }

    #[test]
    fn meltdown_still_records_history() {
        let mut target = target(10);
        target.economy.set_meltdown(true);
        let report = TickLoop::default().tick(&mut target, 100);
        assert_eq!(report.gained, 0.0);
        assert_eq!(target.economy.history().latest(), Some(10.0));
        assert_eq!(target.refreshed, 1);
    }

    #[test]
    fn failing_after_tick_is_contained() {
        let mut target = target(1);
        target.fail_after = true;
        let tick = TickLoop::default();
        tick.tick(&mut target, 100);
        tick.tick(&mut target, 200);
        assert_eq!(target.after, 2);
        assert!(target.economy.resources() > 0.0);
    }

    #[test]
    fn milestones() {
        assert_eq!(crossed_milestone(0.0, 9.0), None);
        assert_eq!(crossed_milestone(9.0, 12.0), Some(10.0));
        assert_eq!(crossed_milestone(12.0, 15.0), None);
        assert_eq!(crossed_milestone(50.0, 1500.0), Some(1000.0));
        assert_eq!(crossed_milestone(1500.0, 20.0), None);
    }
}
