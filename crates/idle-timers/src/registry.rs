use serde::Serialize;

use crate::id::TimerId;
use crate::manager::TimerCallback;

/// Whether a registration repeats or fires once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    /// Repeating, grouped by normalized interval.
    Interval,
    /// One-shot, ungrouped, removed after firing.
    Timeout,
}

impl std::fmt::Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interval => write!(f, "interval"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// Per-registration options for [`TimerManager::set_interval`](crate::TimerManager::set_interval).
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalOptions {
    /// Informational priority. Recorded and reported, never used for preemption.
    pub priority: i32,
    /// Slow-callback warning threshold in ms. `None` uses the manager default.
    pub max_execution_time_ms: Option<f64>,
}

impl IntervalOptions {
    /// Set the informational priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Override the slow-callback warning threshold.
    pub fn with_max_execution_time_ms(mut self, ms: f64) -> Self {
        self.max_execution_time_ms = Some(ms);
        self
    }
}

/// Execution statistics of a single registration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionStats {
    /// Number of completed invocations, failed ones included.
    pub executions: u64,
    /// Invocations that returned an error or panicked.
    pub failures: u64,
    /// Invocations that exceeded the slow-callback threshold.
    pub slow_runs: u64,
    /// Cumulative wall time spent in the callback, in ms.
    pub total_time_ms: f64,
    /// Scheduler time of the last invocation.
    pub last_executed_at: Option<u64>,
    /// Message of the most recent failure.
    pub last_error: Option<String>,
}

impl ExecutionStats {
    /// Mean wall time per invocation, in ms.
    pub fn average_ms(&self) -> f64 {
        if self.executions == 0 {
            0.0
        } else {
            self.total_time_ms / self.executions as f64
        }
    }
}

/// One logical periodic or one-shot request. Owned by the manager.
pub(crate) struct TimerRegistration<S> {
    pub id: TimerId,
    pub name: String,
    pub kind: TimerKind,
    pub requested_ms: u64,
    /// Only set for intervals.
    pub normalized_ms: Option<u64>,
    pub enabled: bool,
    pub priority: i32,
    pub max_execution_ms: f64,
    pub stats: ExecutionStats,
    /// Taken out while the callback runs.
    pub callback: Option<TimerCallback<S>>,
}

impl<S> std::fmt::Debug for TimerRegistration<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerRegistration")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("normalized_ms", &self.normalized_ms)
            .field("enabled", &self.enabled)
            .field("executions", &self.stats.executions)
            .finish()
    }
}

impl<S> TimerRegistration<S> {
    pub fn summary(&self) -> TimerSummary {
        TimerSummary {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            requested_ms: self.requested_ms,
            normalized_ms: self.normalized_ms,
            enabled: self.enabled,
            priority: self.priority,
            max_execution_ms: self.max_execution_ms,
            stats: self.stats.clone(),
        }
    }
}

/// Read-only snapshot of a registration.
#[derive(Debug, Clone, Serialize)]
pub struct TimerSummary {
    /// Registration id.
    pub id: TimerId,
    /// Human-readable name given at registration.
    pub name: String,
    /// Interval or timeout.
    pub kind: TimerKind,
    /// Interval or delay as requested.
    pub requested_ms: u64,
    /// Interval of the frequency group (intervals only).
    pub normalized_ms: Option<u64>,
    /// Whether the registration currently fires.
    pub enabled: bool,
    /// Informational priority.
    pub priority: i32,
    /// Slow-callback threshold in ms.
    pub max_execution_ms: f64,
    /// Execution statistics.
    pub stats: ExecutionStats,
}
