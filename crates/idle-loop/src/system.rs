use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::category::SystemCategory;
use crate::event::{GameEvent, InputEvent};

/// Result type of every system hook. Errors are logged by the loop manager.
pub type SystemResult = anyhow::Result<()>;

/// Mutable context passed to a system hook.
pub struct SystemContext<'a, G> {
    /// The shared game state.
    pub game: &'a mut G,
    now_ms: u64,
    category: SystemCategory,
    outbox: &'a mut Vec<(SystemCategory, GameEvent)>,
}

impl<'a, G> SystemContext<'a, G> {
    pub(crate) fn new(
        game: &'a mut G,
        now_ms: u64,
        category: SystemCategory,
        outbox: &'a mut Vec<(SystemCategory, GameEvent)>,
    ) -> Self {
        Self {
            game,
            now_ms,
            category,
            outbox,
        }
    }
    /// Scheduler time of the current dispatch or call, in ms.
    /// Scheduler time of the current dispatch, in ms.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Category of the system being called.
    pub fn category(&self) -> SystemCategory {
        self.category
    }

    /// Queue an event for cross-system routing.
    ///
    /// Events are routed after the current dispatch completes, never while
    /// another system of the same dispatch is still running.
    pub fn emit(&mut self, event: GameEvent) {
        self.outbox.push((self.category, event));
    }
}

/// Behavior shared by every registered system.
pub trait System<G>: std::fmt::Debug {
    /// Receive a broadcast or routed event. Ignores events by default.
    fn handle_event(&mut self, _cx: &mut SystemContext<'_, G>, _event: &GameEvent) -> SystemResult {
        Ok(())
    }

    /// Support downcasting to concrete types.
    fn as_any(&self) -> &dyn Any;

    /// Support downcasting to concrete types.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A time-driven system, updated from the passive category timer.
pub trait PassiveSystem<G>: System<G> {
    /// Called once per passive dispatch.
    fn update(&mut self, cx: &mut SystemContext<'_, G>) -> SystemResult;
}

/// An input-driven system.
pub trait ActiveSystem<G>: System<G> {
    /// Called for every player input.
    fn handle_input(&mut self, cx: &mut SystemContext<'_, G>, input: &InputEvent) -> SystemResult;
}

/// A system that is both updated from the hybrid category timer and receives input.
pub trait HybridSystem<G>: PassiveSystem<G> + ActiveSystem<G> {}

impl<G, T: PassiveSystem<G> + ActiveSystem<G>> HybridSystem<G> for T {}

/// A system boxed under the category it registers with.
pub enum SystemHandle<G> {
    /// An input-driven system.
    Active(Box<dyn ActiveSystem<G>>),
    /// A time-driven system.
    Passive(Box<dyn PassiveSystem<G>>),
    /// A mixed system.
    Hybrid(Box<dyn HybridSystem<G>>),
}

impl<G> std::fmt::Debug for SystemHandle<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active(s) => f.debug_tuple("Active").field(s).finish(),
            Self::Passive(s) => f.debug_tuple("Passive").field(s).finish(),
            Self::Hybrid(s) => f.debug_tuple("Hybrid").field(s).finish(),
        }
    }
}

impl<G> SystemHandle<G> {
    /// Box an input-driven system.
    pub fn active(system: impl ActiveSystem<G> + 'static) -> Self {
        Self::Active(Box::new(system))
    }

    /// Box a time-driven system.
    pub fn passive(system: impl PassiveSystem<G> + 'static) -> Self {
        Self::Passive(Box::new(system))
    }

    /// Box a mixed system.
    pub fn hybrid(system: impl HybridSystem<G> + 'static) -> Self {
        Self::Hybrid(Box::new(system))
    }

    /// The category this handle registers under.
    pub fn category(&self) -> SystemCategory {
        match self {
            Self::Active(_) => SystemCategory::Active,
            Self::Passive(_) => SystemCategory::Passive,
            Self::Hybrid(_) => SystemCategory::Hybrid,
        }
    }

    /// Run `update`; `None` for systems that have none.
    pub(crate) fn update(&mut self, cx: &mut SystemContext<'_, G>) -> Option<SystemResult> {
        match self {
            Self::Active(_) => None,
            Self::Passive(s) => Some(s.update(cx)),
            Self::Hybrid(s) => Some(s.update(cx)),
        }
    }

    /// Run `handle_input`; `None` for systems that have none.
    pub(crate) fn handle_input(
        &mut self,
        cx: &mut SystemContext<'_, G>,
        input: &InputEvent,
    ) -> Option<SystemResult> {
        match self {
            Self::Active(s) => Some(s.handle_input(cx, input)),
            Self::Passive(_) => None,
            Self::Hybrid(s) => Some(s.handle_input(cx, input)),
        }
    }

    pub(crate) fn handle_event(&mut self, cx: &mut SystemContext<'_, G>, event: &GameEvent) -> SystemResult {
        match self {
            Self::Active(s) => s.handle_event(cx, event),
            Self::Passive(s) => s.handle_event(cx, event),
            Self::Hybrid(s) => s.handle_event(cx, event),
        }
    }

    pub(crate) fn as_any(&self) -> &dyn Any {
        match self {
            Self::Active(s) => s.as_any(),
            Self::Passive(s) => s.as_any(),
            Self::Hybrid(s) => s.as_any(),
        }
    }

    pub(crate) fn as_any_mut(&mut self) -> &mut dyn Any {
        match self {
            Self::Active(s) => s.as_any_mut(),
            Self::Passive(s) => s.as_any_mut(),
            Self::Hybrid(s) => s.as_any_mut(),
        }
    }
}

/// Run consumer code, turning errors and panics into a message.
pub(crate) fn isolate<T>(f: impl FnOnce() -> anyhow::Result<T>) -> Result<T, String> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(payload) => Err(match payload.downcast_ref::<&str>() {
            Some(s) => format!("panicked: {s}"),
            None => match payload.downcast_ref::<String>() {
                Some(s) => format!("panicked: {s}"),
                None => "panicked".to_string(),
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Both {
        updates: u32,
        inputs: u32,
    }

    impl System<u32> for Both {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    impl PassiveSystem<u32> for Both {
        fn update(&mut self, _cx: &mut SystemContext<'_, u32>) -> SystemResult {
            self.updates += 1;
            Ok(())
        }
    }

    impl ActiveSystem<u32> for Both {
        fn handle_input(&mut self, _cx: &mut SystemContext<'_, u32>, _input: &InputEvent) -> SystemResult {
            self.inputs += 1;
            Ok(())
        }
    }

    #[test]
    fn handle_reports_capabilities() {
        let mut game = 0u32;
        let mut outbox = Vec::new();
        let mut cx = SystemContext::new(&mut game, 0, SystemCategory::Hybrid, &mut outbox);
        let click = InputEvent::Click { count: 1 };

        let mut hybrid = SystemHandle::hybrid(Both::default());
        assert_eq!(hybrid.category(), SystemCategory::Hybrid);
        assert!(hybrid.update(&mut cx).is_some());
        assert!(hybrid.handle_input(&mut cx, &click).is_some());

        let mut passive = SystemHandle::passive(Both::default());
        assert!(passive.handle_input(&mut cx, &click).is_none());

        let mut active = SystemHandle::active(Both::default());
        assert!(active.update(&mut cx).is_none());
        assert!(active.handle_event(&mut cx, &GameEvent::bare("noop")).is_ok());

        let both = hybrid.as_any().downcast_ref::<Both>().unwrap();
        assert_eq!((both.updates, both.inputs), (1, 1));
    }

    #[test]
    fn emit_tags_the_category() {
        let mut game = 0u32;
        let mut outbox = Vec::new();
        let mut cx = SystemContext::new(&mut game, 5, SystemCategory::Active, &mut outbox);
        cx.emit(GameEvent::bare("ping"));
        assert_eq!(cx.now_ms(), 5);
        assert_eq!(outbox, vec![(SystemCategory::Active, GameEvent::bare("ping"))]);
    }

    #[test]
    fn isolate_captures_errors_and_panics() {
        assert_eq!(isolate(|| Ok(3)), Ok(3));
        assert_eq!(
            isolate::<()>(|| Err(anyhow::anyhow!("bad"))),
            Err("bad".to_string())
        );
        assert_eq!(
            isolate::<()>(|| panic!("worse")),
            Err("panicked: worse".to_string())
        );
    }
}
