use serde::Serialize;
use serde_json::{Value, json};

use crate::category::SystemCategory;

/// A named event with a free-form payload, delivered to `handle_event`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameEvent {
    /// Event name, matched by cross-system routes.
    pub name: String,
    /// Event data.
    pub payload: Value,
}

impl GameEvent {
    /// Create an event with the given name and payload.
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Create an event without data.
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, Value::Null)
    }

    /// Read a numeric payload field.
    pub fn f64_field(&self, key: &str) -> Option<f64> {
        self.payload.get(key).and_then(Value::as_f64)
    }

    /// Read an unsigned integer payload field.
    pub fn u64_field(&self, key: &str) -> Option<u64> {
        self.payload.get(key).and_then(Value::as_u64)
    }

    /// Read a string payload field.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }
}

/// Player input, delivered to active and hybrid systems.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// One or more clicks on the main resource.
    Click {
        /// Number of clicks in this burst.
        count: u32,
    },
    /// A purchase request.
    Purchase {
        /// Name of the production source to buy.
        source: String,
        /// Units requested.
        quantity: u64,
    },
    /// Any other named action (ability use, buff activation, ...).
    Action {
        /// Action name.
        name: String,
    },
}

/// Domain notifications the host reports to the loop manager.
///
/// Each is broadcast to every system and then forwarded through the routes
/// as if a system of [`source_category`](Self::source_category) had emitted it.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    /// Production sources were bought.
    Purchase {
        /// Source name.
        source: String,
        /// Units bought.
        quantity: u64,
    },
    /// A temporary buff became active.
    BuffActivated {
        /// Buff name.
        name: String,
        /// Production multiplier while active.
        multiplier: f64,
        /// Buff duration, in ms.
        duration_ms: u64,
    },
    /// Production crossed a power of ten.
    SpsMilestone {
        /// The milestone that was crossed.
        sps: f64,
    },
}

impl DomainEvent {
    /// The category this notification is routed from.
    pub fn source_category(&self) -> SystemCategory {
        match self {
            Self::Purchase { .. } => SystemCategory::Active,
            Self::BuffActivated { .. } => SystemCategory::Hybrid,
            Self::SpsMilestone { .. } => SystemCategory::Passive,
        }
    }

    /// Convert into the event systems receive.
    pub fn to_event(&self) -> GameEvent {
        match self {
            Self::Purchase { source, quantity } => GameEvent::new(
                "purchase",
                json!({ "source": source, "quantity": quantity }),
            ),
            Self::BuffActivated {
                name,
                multiplier,
                duration_ms,
            } => GameEvent::new(
                "buff_activated",
                json!({ "name": name, "multiplier": multiplier, "duration_ms": duration_ms }),
            ),
            Self::SpsMilestone { sps } => GameEvent::new("sps_milestone", json!({ "sps": sps })),
        }
    }
}
