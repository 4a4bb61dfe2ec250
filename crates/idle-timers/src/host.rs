use std::collections::HashMap;

use crate::id::TimerId;

/// Handle to one armed host timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostTimerId(u64);

/// What a host timer fires into when it comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireTarget {
    /// The master timer of the frequency group with this normalized interval.
    Group(u64),
    /// A one-shot registration.
    Timeout(TimerId),
}

#[derive(Debug, Clone)]
struct HostTimer {
    deadline: u64,
    period: Option<u64>,
    seq: u64,
    target: FireTarget,
}

/// The "fire after N ms, once or repeating" primitive.
///
/// Deadlines are absolute scheduler milliseconds. Timers due at the same
/// instant fire in the order they were (re-)armed.
#[derive(Debug, Default)]
pub struct HostTimers {
    timers: HashMap<HostTimerId, HostTimer>,
    next_id: u64,
    next_seq: u64,
}

impl HostTimers {
    /// Create an empty host timer queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer `delay` ms after `now`. A `period` makes it repeat.
    pub fn arm(&mut self, now: u64, delay: u64, period: Option<u64>, target: FireTarget) -> HostTimerId {
        self.next_id += 1;
        let id = HostTimerId(self.next_id);
        let seq = self.bump_seq();
        self.timers.insert(
            id,
            HostTimer {
                deadline: now.saturating_add(delay),
                period,
                seq,
                target,
            },
        );
        id
    }

    /// Cancel a timer. Returns `false` if it was not armed.
    pub fn disarm(&mut self, id: HostTimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    /// Number of armed timers.
    pub fn live_count(&self) -> usize {
        self.timers.len()
    }

    /// Whether the given timer is still armed.
    pub fn is_armed(&self, id: HostTimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Earliest deadline among armed timers.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.values().map(|t| t.deadline).min()
    }

    /// Pop the earliest timer due at or before `now`.
    ///
    /// Repeating timers are re-armed one period later; one-shots are removed.
    pub fn pop_due(&mut self, now: u64) -> Option<(HostTimerId, u64, FireTarget)> {
        let (&id, _) = self
            .timers
            .iter()
            .filter(|(_, t)| t.deadline <= now)
            .min_by_key(|(_, t)| (t.deadline, t.seq))?;

        let seq = self.bump_seq();
        let timer = self.timers.get_mut(&id)?;
        let fired_at = timer.deadline;
        let target = timer.target;
        match timer.period {
            Some(period) => {
                timer.deadline = fired_at.saturating_add(period.max(1));
                timer.seq = seq;
            }
            None => {
                self.timers.remove(&id);
            }
        }
        Some((id, fired_at, target))
    }

    /// Disarm everything.
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}
