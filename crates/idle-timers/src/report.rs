use serde::Serialize;

use crate::id::TimerId;
use crate::registry::TimerSummary;

/// A member of a frequency group, as reported.
#[derive(Debug, Clone, Serialize)]
pub struct GroupMember {
    /// Registration id.
    pub id: TimerId,
    /// Registration name.
    pub name: String,
}

/// Snapshot of one frequency group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    /// Normalized interval of the group.
    pub interval_ms: u64,
    /// Number of member registrations.
    pub member_count: usize,
    /// Members in dispatch order.
    pub members: Vec<GroupMember>,
    /// Times the master timer has fired.
    pub executions: u64,
    /// Rolling average of a group dispatch, in ms.
    pub average_ms: f64,
    /// Duration of the last group dispatch, in ms.
    pub last_duration_ms: f64,
}

/// Performance overview of a [`TimerManager`](crate::TimerManager).
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    /// All live registrations, intervals and timeouts.
    pub total_timers: usize,
    /// Enabled interval registrations.
    pub active_intervals: usize,
    /// Disabled interval registrations.
    pub disabled_intervals: usize,
    /// One-shots waiting to fire.
    pub pending_timeouts: usize,
    /// Frequency groups, one master timer each.
    pub master_timers: usize,
    /// Host timers actually armed (master timers plus pending one-shots).
    pub live_host_timers: usize,
    /// `master_timers / total_timers`; 0 when there are no timers.
    pub consolidation_ratio: f64,
    /// Rolling average of a single host firing, in ms.
    pub average_execution_ms: f64,
    /// Callback invocations since the last reset.
    pub total_executions: u64,
    /// Callback invocations that failed.
    pub failures: u64,
    /// Callback invocations that exceeded their threshold.
    pub slow_callbacks: u64,
    /// Per-group detail, ascending by interval.
    pub groups: Vec<GroupReport>,
}

/// Full introspection dump of a [`TimerManager`](crate::TimerManager).
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    /// Current scheduler time.
    pub now_ms: u64,
    /// Whether registrations are currently refused.
    pub shutting_down: bool,
    /// Earliest pending host deadline.
    pub next_deadline: Option<u64>,
    /// Frequency groups, ascending by interval.
    pub frequency_groups: Vec<GroupReport>,
    /// Every registration, ascending by id.
    pub timers: Vec<TimerSummary>,
}
