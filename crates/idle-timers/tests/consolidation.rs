//! Integration tests for timer consolidation behavior.

use std::cell::RefCell;
use std::rc::Rc;

use idle_timers::{IntervalOptions, TimerContext, TimerManager};

type Log = Vec<String>;

fn record(tag: &'static str) -> impl FnMut(&mut TimerContext<'_, Log>) -> anyhow::Result<()> {
    move |cx| {
        cx.state.push(tag.to_string());
        Ok(())
    }
}

fn opts() -> IntervalOptions {
    IntervalOptions::default()
}

// ---------------------------------------------------------------------------
// consolidation
// ---------------------------------------------------------------------------

#[test]
fn near_intervals_share_one_group() {
    let mut timers = TimerManager::<Log>::default();
    timers.set_interval(record("x"), 950, "x", opts()).unwrap();
    timers.set_interval(record("y"), 1000, "y", opts()).unwrap();

    let info = timers.debug_info();
    assert_eq!(info.frequency_groups.len(), 1);
    let group = &info.frequency_groups[0];
    assert_eq!(group.interval_ms, 1000);
    assert_eq!(group.member_count, 2);
    let names: Vec<_> = group.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["x", "y"]);
    assert_eq!(timers.live_host_timers(), 1);
}

#[test]
fn host_timers_track_distinct_intervals() {
    let mut timers = TimerManager::<Log>::default();
    let mut log = Log::new();

    let a = timers.set_interval(record("a"), 100, "a", opts()).unwrap();
    let b = timers.set_interval(record("b"), 105, "b", opts()).unwrap();
    let c = timers.set_interval(record("c"), 1000, "c", opts()).unwrap();
    let d = timers.set_interval(record("d"), 263, "d", opts()).unwrap();
    assert_eq!(timers.group_count(), 3);
    assert_eq!(timers.live_host_timers(), 3);

    timers.advance(2500, &mut log);
    timers.assert_consistent();

    assert!(timers.clear_timer(a));
    assert_eq!(timers.live_host_timers(), 3);
    assert!(timers.clear_timer(b));
    assert_eq!(timers.live_host_timers(), 2);
    assert!(timers.clear_timer(d));
    assert_eq!(timers.live_host_timers(), 1);
    assert!(timers.clear_timer(c));
    assert_eq!(timers.live_host_timers(), 0);
    timers.assert_consistent();
}

#[test]
fn pending_timeouts_count_as_host_timers() {
    let mut timers = TimerManager::<Log>::default();
    let mut log = Log::new();
    timers.set_interval(record("i"), 1000, "i", opts()).unwrap();
    timers.set_timeout(record("t"), 500, "t").unwrap();

    let report = timers.performance_report();
    assert_eq!(report.master_timers, 1);
    assert_eq!(report.pending_timeouts, 1);
    assert_eq!(report.live_host_timers, 2);

    timers.advance(600, &mut log);
    assert_eq!(timers.live_host_timers(), 1);
}

#[test]
fn consolidation_ratio() {
    let mut timers = TimerManager::<Log>::default();
    assert_eq!(timers.performance_report().consolidation_ratio, 0.0);
    for i in 0..4 {
        timers
            .set_interval(record("r"), 980 + i * 10, "r", opts())
            .unwrap();
    }
    let report = timers.performance_report();
    assert_eq!(report.total_timers, 4);
    assert_eq!(report.master_timers, 1);
    assert!((report.consolidation_ratio - 0.25).abs() < f64::EPSILON);
}

// ---------------------------------------------------------------------------
// group teardown
// ---------------------------------------------------------------------------

#[test]
fn last_member_removal_tears_group_down() {
    let mut timers = TimerManager::<Log>::default();
    let mut log = Log::new();
    let a = timers.set_interval(record("a"), 5000, "a", opts()).unwrap();
    let b = timers.set_interval(record("b"), 5200, "b", opts()).unwrap();

    assert!(timers.clear_timer(a));
    assert!(timers.group(5000).is_some());
    assert!(timers.clear_timer(b));
    assert!(timers.group(5000).is_none());
    assert_eq!(timers.next_deadline(), None);

    timers.advance(20_000, &mut log);
    assert!(log.is_empty());
    assert!(timers.group(5000).is_none());

    timers.set_interval(record("c"), 4900, "c", opts()).unwrap();
    let group = timers.group(5000).unwrap();
    assert_eq!(group.members().len(), 1);
    assert_eq!(group.executions(), 0);
}

#[test]
fn cancelling_a_sibling_mid_dispatch_skips_it() {
    let mut timers = TimerManager::<Log>::default();
    let mut log = Log::new();
    let victim = Rc::new(RefCell::new(None));

    let target = Rc::clone(&victim);
    timers
        .set_interval(
            move |cx| {
                cx.state.push("killer".into());
                if let Some(id) = target.borrow_mut().take() {
                    cx.timers().clear_timer(id);
                }
                Ok(())
            },
            1000,
            "killer",
            opts(),
        )
        .unwrap();
    let id = timers.set_interval(record("victim"), 1000, "victim", opts()).unwrap();
    *victim.borrow_mut() = Some(id);

    timers.advance(2000, &mut log);
    assert_eq!(log, vec!["killer", "killer"]);
    timers.assert_consistent();
}

#[test]
fn registration_during_dispatch_waits_for_next_firing() {
    let mut timers = TimerManager::<Log>::default();
    let mut log = Log::new();
    let mut spawned = false;
    timers
        .set_interval(
            move |cx| {
                cx.state.push("parent".into());
                if !spawned {
                    spawned = true;
                    cx.timers()
                        .set_interval(record("child"), 1000, "child", IntervalOptions::default());
                }
                Ok(())
            },
            1000,
            "parent",
            opts(),
        )
        .unwrap();

    timers.advance(1000, &mut log);
    assert_eq!(log, vec!["parent"]);
    timers.advance(1000, &mut log);
    assert_eq!(log, vec!["parent", "parent", "child"]);
}

// ---------------------------------------------------------------------------
// isolation
// ---------------------------------------------------------------------------

#[test]
fn failing_callback_does_not_stop_siblings() {
    let mut timers = TimerManager::<Log>::default();
    let mut log = Log::new();
    timers.set_interval(record("before"), 1000, "before", opts()).unwrap();
    let bad = timers
        .set_interval(|_| anyhow::bail!("always broken"), 1000, "bad", opts())
        .unwrap();
    timers
        .set_interval(
            |_| -> anyhow::Result<()> { panic!("kaboom") },
            1000,
            "panics",
            opts(),
        )
        .unwrap();
    timers.set_interval(record("after"), 1000, "after", opts()).unwrap();

    timers.advance(3000, &mut log);
    assert_eq!(
        log,
        vec!["before", "after", "before", "after", "before", "after"]
    );

    let summary = timers.timer(bad).unwrap();
    assert_eq!(summary.stats.executions, 3);
    assert_eq!(summary.stats.failures, 3);
    assert_eq!(summary.stats.last_error.as_deref(), Some("always broken"));

    let group = timers.group(1000).unwrap();
    assert_eq!(group.executions(), 3);

    let report = timers.performance_report();
    assert_eq!(report.total_executions, 12);
    assert_eq!(report.failures, 6);
}

// ---------------------------------------------------------------------------
// shutdown / reset
// ---------------------------------------------------------------------------

#[test]
fn shutdown_and_reset_are_idempotent() {
    let mut timers = TimerManager::<Log>::default();
    let mut log = Log::new();
    timers.set_interval(record("a"), 100, "a", opts()).unwrap();
    timers.set_timeout(record("t"), 100, "t").unwrap();

    timers.shutdown();
    timers.shutdown();
    assert!(timers.is_shutting_down());
    assert_eq!(timers.live_host_timers(), 0);
    assert_eq!(timers.timer_count(), 0);
    assert!(timers.set_interval(record("b"), 100, "b", opts()).is_none());
    assert!(timers.set_timeout(record("c"), 100, "c").is_none());

    timers.advance(1000, &mut log);
    assert!(log.is_empty());

    timers.reset();
    timers.reset();
    assert!(!timers.is_shutting_down());
    assert!(timers.set_interval(record("d"), 100, "d", opts()).is_some());
    timers.advance(100, &mut log);
    assert_eq!(log, vec!["d"]);
}

#[test]
fn shutdown_from_inside_a_callback_stops_everything() {
    let mut timers = TimerManager::<Log>::default();
    let mut log = Log::new();
    timers
        .set_interval(
            |cx| {
                cx.state.push("stopper".into());
                cx.timers().shutdown();
                Ok(())
            },
            100,
            "stopper",
            opts(),
        )
        .unwrap();
    timers.set_interval(record("late"), 100, "late", opts()).unwrap();

    timers.advance(1000, &mut log);
    assert_eq!(log, vec!["stopper"]);
    assert!(timers.is_shutting_down());
}

// ---------------------------------------------------------------------------
// ordering
// ---------------------------------------------------------------------------

#[test]
fn members_fire_in_registration_order() {
    let mut timers = TimerManager::<Log>::default();
    let mut log = Log::new();
    timers.set_interval(record("A"), 1000, "A", opts()).unwrap();
    timers.set_interval(record("B"), 960, "B", opts()).unwrap();
    timers.set_interval(record("C"), 1040, "C", opts()).unwrap();

    timers.advance(1000, &mut log);
    assert_eq!(log, vec!["A", "B", "C"]);
}

#[test]
fn debug_info_serializes() {
    let mut timers = TimerManager::<Log>::default();
    timers.set_interval(record("x"), 950, "x", opts()).unwrap();
    let json = serde_json::to_value(timers.debug_info()).unwrap();
    assert_eq!(json["frequency_groups"][0]["interval_ms"], 1000);
    assert_eq!(json["timers"][0]["kind"], "interval");
}
