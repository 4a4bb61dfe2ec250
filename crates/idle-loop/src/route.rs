use serde_json::{Value, json};

use crate::category::SystemCategory;
use crate::event::GameEvent;
use crate::system::isolate;

type Transform = Box<dyn Fn(&Value) -> anyhow::Result<Value>>;

/// Reshapes an event's payload as it crosses from one category to another.
pub struct CrossSystemRoute {
    source: SystemCategory,
    target: SystemCategory,
    event: String,
    forward_as: Option<String>,
    transform: Transform,
}

impl std::fmt::Debug for CrossSystemRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossSystemRoute")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("event", &self.event)
            .field("forward_as", &self.forward_as)
            .finish()
    }
}

impl CrossSystemRoute {
    /// Route `event` from `source` systems to `target` systems through `transform`.
    pub fn new<F>(source: SystemCategory, target: SystemCategory, event: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<Value> + 'static,
    {
        Self {
            source,
            target,
            event: event.into(),
            forward_as: None,
            transform: Box::new(transform),
        }
    }

    /// Deliver the transformed event under a different name.
    pub fn forward_as(mut self, name: impl Into<String>) -> Self {
        self.forward_as = Some(name.into());
        self
    }

    /// Category the route listens to.
    pub fn source(&self) -> SystemCategory {
        self.source
    }

    /// Category the route delivers to.
    pub fn target(&self) -> SystemCategory {
        self.target
    }

    /// Name of the event the route listens for.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Whether this route handles `event` emitted from `source`.
    pub fn matches(&self, source: SystemCategory, event: &str) -> bool {
        self.source == source && self.event == event
    }

    /// Transform an event. Transform errors and panics come back as a message.
    pub fn apply(&self, event: &GameEvent) -> Result<GameEvent, String> {
        let payload = isolate(|| (self.transform)(&event.payload))?;
        let name = self.forward_as.clone().unwrap_or_else(|| event.name.clone());
        Ok(GameEvent::new(name, payload))
    }
}

/// Bonus multiplier granted per click in a combo streak.
pub const COMBO_BONUS_PER_CLICK: f64 = 0.01;

/// Routes installed by [`LoopManager::initialize`](crate::LoopManager::initialize).
///
/// - `click_combo` (active -> passive) becomes `passive_bonus` with a
///   multiplier of `1 + streak * 0.01`.
/// - `sps_milestone` (passive -> active) becomes `ability_unlocked`.
/// - `buff_activated` (hybrid -> passive) becomes `buff_bonus`.
pub fn default_routes() -> Vec<CrossSystemRoute> {
    vec![
        CrossSystemRoute::new(
            SystemCategory::Active,
            SystemCategory::Passive,
            "click_combo",
            |payload| {
                let streak = payload
                    .get("streak")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| anyhow::anyhow!("click_combo without a streak"))?;
                Ok(json!({
                    "source": "click_combo",
                    "streak": streak,
                    "multiplier": 1.0 + streak as f64 * COMBO_BONUS_PER_CLICK,
                }))
            },
        )
        .forward_as("passive_bonus"),
        CrossSystemRoute::new(
            SystemCategory::Passive,
            SystemCategory::Active,
            "sps_milestone",
            |payload| {
                let sps = payload.get("sps").and_then(Value::as_f64).unwrap_or(0.0);
                Ok(json!({ "ability": "power_click", "threshold": sps }))
            },
        )
        .forward_as("ability_unlocked"),
        CrossSystemRoute::new(
            SystemCategory::Hybrid,
            SystemCategory::Passive,
            "buff_activated",
            |payload| Ok(payload.clone()),
        )
        .forward_as("buff_bonus"),
    ]
}
