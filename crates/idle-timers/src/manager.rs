use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::config::TimerConfig;
use crate::context::TimerContext;
use crate::error::{TimerError, TimerResult};
use crate::group::FrequencyGroup;
use crate::host::{FireTarget, HostTimerId, HostTimers};
use crate::id::TimerId;
use crate::normalize::normalize_interval;
use crate::registry::{IntervalOptions, TimerKind, TimerRegistration, TimerSummary};
use crate::report::{DebugInfo, GroupMember, GroupReport, PerformanceReport};
use crate::stats::RollingAverage;

/// A timer callback. Errors and panics are contained at the dispatch site.
pub type TimerCallback<S> = Box<dyn FnMut(&mut TimerContext<'_, S>) -> anyhow::Result<()>>;

#[derive(Debug, Clone)]
struct Totals {
    executions: u64,
    failures: u64,
    slow_callbacks: u64,
    average_ms: RollingAverage,
}

impl Totals {
    fn new(smoothing: f64) -> Self {
        Self {
            executions: 0,
            failures: 0,
            slow_callbacks: 0,
            average_ms: RollingAverage::new(smoothing),
        }
    }
}

/// Consolidates periodic and one-shot requests onto a minimal set of host timers.
///
/// `S` is the consumer state handed to every callback through
/// [`TimerContext::state`]. The manager never owns that state; the host passes
/// it to [`advance`](Self::advance) each time it moves time forward.
pub struct TimerManager<S> {
    config: TimerConfig,
    registry: HashMap<TimerId, TimerRegistration<S>>,
    groups: BTreeMap<u64, FrequencyGroup>,
    timeouts: HashMap<TimerId, HostTimerId>,
    host: HostTimers,
    now_ms: u64,
    next_id: u64,
    shutting_down: bool,
    totals: Totals,
}

impl<S> std::fmt::Debug for TimerManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerManager")
            .field("now_ms", &self.now_ms)
            .field("timers", &self.registry.len())
            .field("groups", &self.groups.keys().collect::<Vec<_>>())
            .field("shutting_down", &self.shutting_down)
            .finish()
    }
}

impl<S> Default for TimerManager<S> {
    fn default() -> Self {
        Self::new(TimerConfig::default())
    }
}

impl<S> TimerManager<S> {
    /// Create a manager with the given configuration.
    pub fn new(config: TimerConfig) -> Self {
        let totals = Totals::new(config.smoothing);
        Self {
            config,
            registry: HashMap::new(),
            groups: BTreeMap::new(),
            timeouts: HashMap::new(),
            host: HostTimers::new(),
            now_ms: 0,
            next_id: 0,
            shutting_down: false,
            totals,
        }
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register a repeating callback. Returns `None` while shut down.
    pub fn set_interval<F>(
        &mut self,
        callback: F,
        interval_ms: u64,
        name: impl Into<String>,
        options: IntervalOptions,
    ) -> Option<TimerId>
    where
        F: FnMut(&mut TimerContext<'_, S>) -> anyhow::Result<()> + 'static,
    {
        self.try_set_interval(callback, interval_ms, name, options).ok()
    }

    /// Register a repeating callback, reporting why registration failed.
    pub fn try_set_interval<F>(
        &mut self,
        callback: F,
        interval_ms: u64,
        name: impl Into<String>,
        options: IntervalOptions,
    ) -> TimerResult<TimerId>
    where
        F: FnMut(&mut TimerContext<'_, S>) -> anyhow::Result<()> + 'static,
    {
        let name = name.into();
        if self.shutting_down {
            warn!(name = %name, "interval rejected: timer manager is shut down");
            return Err(TimerError::Rejected { name });
        }

        let normalized = normalize_interval(interval_ms, &self.config);
        let id = self.allocate_id();
        debug!(
            timer = %id,
            name = %name,
            requested_ms = interval_ms,
            interval_ms = normalized,
            "interval registered"
        );
        self.registry.insert(
            id,
            TimerRegistration {
                id,
                name,
                kind: TimerKind::Interval,
                requested_ms: interval_ms,
                normalized_ms: Some(normalized),
                enabled: true,
                priority: options.priority,
                max_execution_ms: options
                    .max_execution_time_ms
                    .unwrap_or(self.config.default_max_execution_ms),
                stats: Default::default(),
                callback: Some(Box::new(callback)),
            },
        );
        self.join_group(id, normalized);
        self.check_consistency();
        Ok(id)
    }

    /// Register a one-shot callback. Returns `None` while shut down.
    pub fn set_timeout<F>(&mut self, callback: F, delay_ms: u64, name: impl Into<String>) -> Option<TimerId>
    where
        F: FnMut(&mut TimerContext<'_, S>) -> anyhow::Result<()> + 'static,
    {
        self.try_set_timeout(callback, delay_ms, name).ok()
    }

    /// Register a one-shot callback, reporting why registration failed.
    ///
    /// The delay is clamped to at least 1 ms.
    pub fn try_set_timeout<F>(
        &mut self,
        callback: F,
        delay_ms: u64,
        name: impl Into<String>,
    ) -> TimerResult<TimerId>
    where
        F: FnMut(&mut TimerContext<'_, S>) -> anyhow::Result<()> + 'static,
    {
        let name = name.into();
        if self.shutting_down {
            warn!(name = %name, "timeout rejected: timer manager is shut down");
            return Err(TimerError::Rejected { name });
        }

        let id = self.allocate_id();
        let delay = delay_ms.max(1);
        let host_timer = self.host.arm(self.now_ms, delay, None, FireTarget::Timeout(id));
        self.timeouts.insert(id, host_timer);
        debug!(timer = %id, name = %name, delay_ms = delay, "timeout registered");
        self.registry.insert(
            id,
            TimerRegistration {
                id,
                name,
                kind: TimerKind::Timeout,
                requested_ms: delay_ms,
                normalized_ms: None,
                enabled: true,
                priority: 0,
                max_execution_ms: self.config.default_max_execution_ms,
                stats: Default::default(),
                callback: Some(Box::new(callback)),
            },
        );
        self.check_consistency();
        Ok(id)
    }

    /// Cancel a registration. Returns `false` for unknown ids.
    pub fn clear_timer(&mut self, id: TimerId) -> bool {
        self.try_clear_timer(id).is_ok()
    }

    /// Cancel a registration, reporting unknown ids as an error.
    ///
    /// Removing the last member of a frequency group tears the group and its
    /// master timer down before this returns.
    pub fn try_clear_timer(&mut self, id: TimerId) -> TimerResult<()> {
        let reg = self
            .registry
            .remove(&id)
            .ok_or(TimerError::UnknownTimer(id))?;

        match (reg.kind, reg.normalized_ms) {
            (TimerKind::Interval, Some(interval)) if reg.enabled => self.leave_group(id, interval),
            (TimerKind::Timeout, _) => {
                if let Some(host_timer) = self.timeouts.remove(&id) {
                    self.host.disarm(host_timer);
                }
            }
            _ => {}
        }
        debug!(timer = %id, name = %reg.name, "timer cleared");
        self.check_consistency();
        Ok(())
    }

    /// Enable or disable an interval without losing its registration or stats.
    ///
    /// Disabled intervals leave their frequency group.
    pub fn set_enabled(&mut self, id: TimerId, enabled: bool) -> TimerResult<()> {
        let reg = self
            .registry
            .get_mut(&id)
            .ok_or(TimerError::UnknownTimer(id))?;
        let Some(interval) = reg.normalized_ms else {
            return Err(TimerError::NotAnInterval(id));
        };
        if reg.enabled == enabled {
            return Ok(());
        }
        reg.enabled = enabled;
        if enabled {
            self.join_group(id, interval);
        } else {
            self.leave_group(id, interval);
        }
        self.check_consistency();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Disarm every host timer and drop every registration.
    ///
    /// Registrations are refused until [`reset`](Self::reset). Calling this
    /// twice is harmless.
    pub fn shutdown(&mut self) {
        if self.shutting_down {
            debug!("timer manager already shut down");
            return;
        }
        let dropped = self.registry.len();
        let groups = self.groups.len();
        self.clear_state();
        self.shutting_down = true;
        info!(timers = dropped, groups, "timer manager shut down");
    }

    /// Clear all state and accept registrations again.
    ///
    /// Scheduler time keeps running and ids are not reused.
    pub fn reset(&mut self) {
        self.clear_state();
        self.totals = Totals::new(self.config.smoothing);
        self.shutting_down = false;
        info!("timer manager reset");
    }

    /// Whether registrations are currently refused.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    fn clear_state(&mut self) {
        self.host.clear();
        self.groups.clear();
        self.timeouts.clear();
        self.registry.clear();
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Move scheduler time forward by `elapsed_ms`, firing everything that
    /// comes due on the way. Returns the number of host firings.
    pub fn advance(&mut self, elapsed_ms: u64, state: &mut S) -> usize {
        let target = self.now_ms.saturating_add(elapsed_ms);
        self.advance_to(target, state)
    }

    /// Move scheduler time forward to `target_ms`. Earlier targets are ignored.
    pub fn advance_to(&mut self, target_ms: u64, state: &mut S) -> usize {
        if target_ms < self.now_ms {
            return 0;
        }
        let mut fired = 0;
        while let Some((_, at, target)) = self.host.pop_due(target_ms) {
            self.now_ms = self.now_ms.max(at);
            fired += 1;
            match target {
                FireTarget::Group(interval) => self.dispatch_group(interval, state),
                FireTarget::Timeout(id) => self.fire_timeout(id, state),
            }
        }
        self.now_ms = target_ms;
        fired
    }

    /// Current scheduler time, in ms.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Earliest pending host deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.host.next_deadline()
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    fn dispatch_group(&mut self, interval: u64, state: &mut S) {
        let Some(group) = self.groups.get(&interval) else {
            return;
        };
        // Snapshot: members added during this dispatch wait for the next firing.
        let members = group.members().to_vec();

        let started = Instant::now();
        for id in members {
            self.invoke(id, state);
        }
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        self.totals.average_ms.record(duration_ms);
        if let Some(group) = self.groups.get_mut(&interval) {
            group.record(duration_ms);
            if self.config.debug && duration_ms > self.config.group_debug_threshold_ms {
                debug!(
                    interval_ms = interval,
                    members = group.members().len(),
                    elapsed_ms = duration_ms,
                    average_ms = group.average_ms(),
                    "slow frequency group dispatch"
                );
            }
        }
    }

    fn fire_timeout(&mut self, id: TimerId, state: &mut S) {
        self.timeouts.remove(&id);
        if let Some(elapsed_ms) = self.invoke(id, state) {
            self.totals.average_ms.record(elapsed_ms);
        }
        // One-shots leave the registry whether they succeeded or not.
        if self.registry.remove(&id).is_some() {
            debug!(timer = %id, "timeout completed");
        }
    }

    /// Run one registration's callback in isolation. Returns its wall time.
    fn invoke(&mut self, id: TimerId, state: &mut S) -> Option<f64> {
        let now = self.now_ms;
        let reg = self.registry.get_mut(&id)?;
        if !reg.enabled {
            return None;
        }
        let mut callback = reg.callback.take()?;
        let name = reg.name.clone();
        let max_execution_ms = reg.max_execution_ms;

        let started = Instant::now();
        let outcome = {
            let mut cx = TimerContext::new(state, self, id, now);
            panic::catch_unwind(AssertUnwindSafe(|| callback(&mut cx)))
        };
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let failure = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(format!("{err:#}")),
            Err(payload) => Some(panic_message(payload.as_ref())),
        };
        let slow = elapsed_ms > max_execution_ms;

        self.totals.executions += 1;
        if let Some(reg) = self.registry.get_mut(&id) {
            reg.callback = Some(callback);
            reg.stats.executions += 1;
            reg.stats.total_time_ms += elapsed_ms;
            reg.stats.last_executed_at = Some(now);
            if slow {
                reg.stats.slow_runs += 1;
            }
            if let Some(message) = &failure {
                reg.stats.failures += 1;
                reg.stats.last_error = Some(message.clone());
            }
        }

        if let Some(message) = failure {
            self.totals.failures += 1;
            error!(timer = %id, name = %name, error = %message, "timer callback failed");
        }
        if slow {
            self.totals.slow_callbacks += 1;
            warn!(
                timer = %id,
                name = %name,
                elapsed_ms,
                max_execution_ms,
                "slow timer callback"
            );
        }
        Some(elapsed_ms)
    }

    // -----------------------------------------------------------------------
    // Frequency groups
    // -----------------------------------------------------------------------

    fn join_group(&mut self, id: TimerId, interval: u64) {
        let group = match self.groups.entry(interval) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let master = self.host.arm(
                    self.now_ms,
                    interval,
                    Some(interval),
                    FireTarget::Group(interval),
                );
                debug!(interval_ms = interval, "frequency group created");
                entry.insert(FrequencyGroup::new(interval, master, self.config.smoothing))
            }
        };
        let added = group.add(id);
        assert!(added, "{id} joined the {interval}ms group twice");
    }

    fn leave_group(&mut self, id: TimerId, interval: u64) {
        let group = self
            .groups
            .get_mut(&interval)
            .unwrap_or_else(|| panic!("{id} has no {interval}ms group to leave"));
        let removed = group.remove(id);
        assert!(removed, "{id} was not a member of the {interval}ms group");

        if group.is_empty() {
            let master = group.master();
            self.groups.remove(&interval);
            let disarmed = self.host.disarm(master);
            assert!(disarmed, "master timer of the {interval}ms group was not armed");
            debug!(interval_ms = interval, "frequency group torn down");
        }
    }

    fn allocate_id(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId::new(self.next_id)
    }

    fn check_consistency(&self) {
        if cfg!(debug_assertions) {
            self.assert_consistent();
        }
    }

    /// Panic if the registry, the frequency groups, and the host timers disagree.
    ///
    /// Every enabled interval belongs to exactly the group of its normalized
    /// interval, no group is empty, and the armed host timers are exactly the
    /// master timers plus the pending one-shots.
    pub fn assert_consistent(&self) {
        for reg in self.registry.values() {
            if let (TimerKind::Interval, Some(interval)) = (reg.kind, reg.normalized_ms) {
                let memberships = self
                    .groups
                    .values()
                    .filter(|g| g.members().contains(&reg.id))
                    .count();
                if reg.enabled {
                    assert_eq!(memberships, 1, "{} must be in exactly one group", reg.id);
                    assert!(
                        self.groups
                            .get(&interval)
                            .is_some_and(|g| g.members().contains(&reg.id)),
                        "{} is not in the {interval}ms group",
                        reg.id
                    );
                } else {
                    assert_eq!(memberships, 0, "disabled {} is still grouped", reg.id);
                }
            }
        }
        for group in self.groups.values() {
            assert!(!group.is_empty(), "empty {}ms group", group.interval_ms());
            assert!(
                self.host.is_armed(group.master()),
                "{}ms group has no armed master timer",
                group.interval_ms()
            );
            for member in group.members() {
                assert!(self.registry.contains_key(member), "group member {member} is not registered");
            }
        }
        for id in self.timeouts.keys() {
            assert!(self.registry.contains_key(id), "pending {id} is not registered");
        }
        assert_eq!(
            self.host.live_count(),
            self.groups.len() + self.timeouts.len(),
            "host timers out of sync with groups and timeouts"
        );
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// The active configuration.
    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Number of live registrations.
    pub fn timer_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of frequency groups, i.e. master timers.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of host timers currently armed.
    pub fn live_host_timers(&self) -> usize {
        self.host.live_count()
    }

    /// The group running at the given normalized interval.
    pub fn group(&self, interval_ms: u64) -> Option<&FrequencyGroup> {
        self.groups.get(&interval_ms)
    }

    /// Snapshot of one registration.
    pub fn timer(&self, id: TimerId) -> Option<TimerSummary> {
        self.registry.get(&id).map(TimerRegistration::summary)
    }

    /// Performance overview.
    pub fn performance_report(&self) -> PerformanceReport {
        let active_intervals = self
            .registry
            .values()
            .filter(|r| r.kind == TimerKind::Interval && r.enabled)
            .count();
        let disabled_intervals = self
            .registry
            .values()
            .filter(|r| r.kind == TimerKind::Interval && !r.enabled)
            .count();
        let total_timers = self.registry.len();
        let consolidation_ratio = if total_timers == 0 {
            0.0
        } else {
            self.groups.len() as f64 / total_timers as f64
        };

        PerformanceReport {
            total_timers,
            active_intervals,
            disabled_intervals,
            pending_timeouts: self.timeouts.len(),
            master_timers: self.groups.len(),
            live_host_timers: self.host.live_count(),
            consolidation_ratio,
            average_execution_ms: self.totals.average_ms.value(),
            total_executions: self.totals.executions,
            failures: self.totals.failures,
            slow_callbacks: self.totals.slow_callbacks,
            groups: self.group_reports(),
        }
    }

    /// Full introspection dump.
    pub fn debug_info(&self) -> DebugInfo {
        let mut timers: Vec<TimerSummary> = self
            .registry
            .values()
            .map(TimerRegistration::summary)
            .collect();
        timers.sort_by_key(|t| t.id);

        DebugInfo {
            now_ms: self.now_ms,
            shutting_down: self.shutting_down,
            next_deadline: self.host.next_deadline(),
            frequency_groups: self.group_reports(),
            timers,
        }
    }

    fn group_reports(&self) -> Vec<GroupReport> {
        self.groups
            .values()
            .map(|group| GroupReport {
                interval_ms: group.interval_ms(),
                member_count: group.members().len(),
                members: group
                    .members()
                    .iter()
                    .map(|id| GroupMember {
                        id: *id,
                        name: self
                            .registry
                            .get(id)
                            .map(|r| r.name.clone())
                            .unwrap_or_default(),
                    })
                    .collect(),
                executions: group.executions(),
                average_ms: group.average_ms(),
                last_duration_ms: group.last_duration_ms(),
            })
            .collect()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Vec<&'static str>;

    fn push(tag: &'static str) -> impl FnMut(&mut TimerContext<'_, Log>) -> anyhow::Result<()> {
        move |cx| {
            cx.state.push(tag);
            Ok(())
        }
    }

    #[test]
    fn interval_fires_each_period() {
        let mut timers = TimerManager::<Log>::default();
        let mut log = Log::new();
        timers
            .set_interval(push("a"), 1000, "a", IntervalOptions::default())
            .unwrap();

        assert_eq!(timers.advance(999, &mut log), 0);
        assert!(log.is_empty());
        assert_eq!(timers.advance(2001, &mut log), 3);
        assert_eq!(log, vec!["a", "a", "a"]);
        assert_eq!(timers.now_ms(), 3000);
    }

    #[test]
    fn timeout_fires_once_and_leaves_registry() {
        let mut timers = TimerManager::<Log>::default();
        let mut log = Log::new();
        let id = timers.set_timeout(push("t"), 250, "t").unwrap();
        assert!(timers.timer(id).is_some());

        timers.advance(1000, &mut log);
        assert_eq!(log, vec!["t"]);
        assert!(timers.timer(id).is_none());
        assert_eq!(timers.live_host_timers(), 0);
        assert!(!timers.clear_timer(id));
    }

    #[test]
    fn failing_timeout_is_removed_too() {
        let mut timers = TimerManager::<Log>::default();
        let mut log = Log::new();
        let id = timers
            .set_timeout(|_| anyhow::bail!("nope"), 10, "boom")
            .unwrap();
        timers.advance(10, &mut log);
        assert!(timers.timer(id).is_none());
        assert_eq!(timers.performance_report().failures, 1);
    }

    #[test]
    fn zero_delay_timeout_is_clamped() {
        let mut timers = TimerManager::<Log>::default();
        let mut log = Log::new();
        timers.set_timeout(push("z"), 0, "z").unwrap();
        assert_eq!(timers.next_deadline(), Some(1));
        timers.advance(1, &mut log);
        assert_eq!(log, vec!["z"]);
    }

    #[test]
    fn rejected_while_shut_down() {
        let mut timers = TimerManager::<Log>::default();
        timers.shutdown();
        assert!(timers.set_interval(push("a"), 100, "a", IntervalOptions::default()).is_none());
        assert!(matches!(
            timers.try_set_timeout(push("b"), 100, "b"),
            Err(TimerError::Rejected { .. })
        ));
    }

    #[test]
    fn unknown_timer_clear_is_false() {
        let mut timers = TimerManager::<Log>::default();
        assert!(!timers.clear_timer(TimerId::new(42)));
        assert!(matches!(
            timers.try_clear_timer(TimerId::new(42)),
            Err(TimerError::UnknownTimer(_))
        ));
    }

    #[test]
    fn disabling_leaves_group() {
        let mut timers = TimerManager::<Log>::default();
        let mut log = Log::new();
        let id = timers
            .set_interval(push("a"), 1000, "a", IntervalOptions::default())
            .unwrap();
        timers.set_enabled(id, false).unwrap();
        assert_eq!(timers.group_count(), 0);
        assert_eq!(timers.live_host_timers(), 0);

        timers.advance(5000, &mut log);
        assert!(log.is_empty());

        timers.set_enabled(id, true).unwrap();
        assert_eq!(timers.group_count(), 1);
        timers.advance(1000, &mut log);
        assert_eq!(log, vec!["a"]);
        assert_eq!(timers.performance_report().disabled_intervals, 0);
    }

    #[test]
    fn enabling_a_timeout_is_an_error() {
        let mut timers = TimerManager::<Log>::default();
        let id = timers.set_timeout(push("t"), 100, "t").unwrap();
        assert!(matches!(
            timers.set_enabled(id, false),
            Err(TimerError::NotAnInterval(_))
        ));
    }

    #[test]
    fn callback_can_cancel_itself() {
        let mut timers = TimerManager::<Log>::default();
        let mut log = Log::new();
        timers
            .set_interval(
                |cx| {
                    cx.state.push("once");
                    cx.cancel_self();
                    Ok(())
                },
                100,
                "once",
                IntervalOptions::default(),
            )
            .unwrap();
        timers.advance(1000, &mut log);
        assert_eq!(log, vec!["once"]);
        assert_eq!(timers.group_count(), 0);
        assert_eq!(timers.timer_count(), 0);
    }

    #[test]
    fn slow_threshold_from_options() {
        let mut timers = TimerManager::<Log>::default();
        let id = timers
            .set_interval(
                push("a"),
                100,
                "a",
                IntervalOptions::default()
                    .with_priority(3)
                    .with_max_execution_time_ms(50.0),
            )
            .unwrap();
        let summary = timers.timer(id).unwrap();
        assert!((summary.max_execution_ms - 50.0).abs() < f64::EPSILON);
        assert_eq!(summary.priority, 3);
        assert_eq!(summary.normalized_ms, Some(100));
    }

    #[test]
    fn ids_are_not_reused_after_reset() {
        let mut timers = TimerManager::<Log>::default();
        let a = timers.set_timeout(push("a"), 10, "a").unwrap();
        timers.reset();
        let b = timers.set_timeout(push("b"), 10, "b").unwrap();
        assert!(b > a);
    }

    #[test]
    fn panic_message_extracts_text() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "panicked: boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "panicked: bang");
    }
}
