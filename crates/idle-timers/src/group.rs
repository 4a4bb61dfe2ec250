use crate::host::HostTimerId;
use crate::id::TimerId;
use crate::stats::RollingAverage;

/// Registrations sharing one normalized interval and one master timer.
///
/// A group never exists without members: the manager removes it, and disarms
/// its master timer, as soon as the last member leaves.
#[derive(Debug, Clone)]
pub struct FrequencyGroup {
    interval_ms: u64,
    members: Vec<TimerId>,
    master: HostTimerId,
    executions: u64,
    average_ms: RollingAverage,
    last_duration_ms: f64,
}

impl FrequencyGroup {
    pub(crate) fn new(interval_ms: u64, master: HostTimerId, smoothing: f64) -> Self {
        Self {
            interval_ms,
            members: Vec::new(),
            master,
            executions: 0,
            average_ms: RollingAverage::new(smoothing),
            last_duration_ms: 0.0,
        }
    }

    /// Add a member. Returns `false` if it was already present.
    pub(crate) fn add(&mut self, id: TimerId) -> bool {
        if self.members.contains(&id) {
            return false;
        }
        self.members.push(id);
        true
    }

    /// Remove a member. Returns `false` if it was not present.
    pub(crate) fn remove(&mut self, id: TimerId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != id);
        self.members.len() != before
    }

    pub(crate) fn record(&mut self, duration_ms: f64) {
        self.executions += 1;
        self.last_duration_ms = duration_ms;
        self.average_ms.record(duration_ms);
    }

    /// The normalized interval this group fires at.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Members in registration order.
    pub fn members(&self) -> &[TimerId] {
        &self.members
    }

    /// Whether the group has no members left.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Handle of the group's master timer.
    pub fn master(&self) -> HostTimerId {
        self.master
    }

    /// Number of times the master timer has fired.
    pub fn executions(&self) -> u64 {
        self.executions
    }

    /// Rolling average of a whole group dispatch, in ms.
    pub fn average_ms(&self) -> f64 {
        self.average_ms.value()
    }

    /// Duration of the most recent group dispatch, in ms.
    pub fn last_duration_ms(&self) -> f64 {
        self.last_duration_ms
    }
}
