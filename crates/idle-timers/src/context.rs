use crate::id::TimerId;
use crate::manager::TimerManager;

/// Mutable context passed to a timer callback while it runs.
///
/// Gives the callback its consumer state and the manager itself, so it can
/// register new timers or cancel existing ones (itself included). Timers
/// registered during a group dispatch first fire on a later firing.
pub struct TimerContext<'a, S> {
    /// The consumer state the manager was advanced with.
    pub state: &'a mut S,
    timers: &'a mut TimerManager<S>,
    timer: TimerId,
    now_ms: u64,
}

impl<'a, S> TimerContext<'a, S> {
    pub(crate) fn new(
        state: &'a mut S,
        timers: &'a mut TimerManager<S>,
        timer: TimerId,
        now_ms: u64,
    ) -> Self {
        Self {
            state,
            timers,
            timer,
            now_ms,
        }
    }

    /// Id of the registration being dispatched.
    pub fn timer_id(&self) -> TimerId {
        self.timer
    }

    /// Scheduler time of this firing, in ms.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// The manager dispatching this callback.
    pub fn timers(&mut self) -> &mut TimerManager<S> {
        &mut *self.timers
    }

    /// Cancel the registration being dispatched. It will not fire again.
    pub fn cancel_self(&mut self) -> bool {
        self.timers.clear_timer(self.timer)
    }
}
