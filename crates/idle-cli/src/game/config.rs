//! Demo game configuration, loadable from JSON.

use std::fs;
use std::path::Path;

use idle_loop::{LoopConfig, TickConfig};
use idle_timers::TimerConfig;
use serde::Deserialize;

/// A purchasable source in the demo economy.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Source name.
    pub name: String,
    /// Production per unit per second.
    pub base_rate: f64,
    /// Price of the first unit.
    pub price: f64,
}

impl SourceConfig {
    fn new(name: &str, base_rate: f64, price: f64) -> Self {
        Self {
            name: name.to_string(),
            base_rate,
            price,
        }
    }
}

/// The hybrid buff.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuffConfig {
    /// Buff name, also the action that triggers it.
    pub name: String,
    /// Production multiplier while active.
    pub multiplier: f64,
    /// How long the buff lasts, in ms.
    pub duration_ms: u64,
    /// Time from activation until it can trigger again, in ms.
    pub cooldown_ms: u64,
    /// Click streak that triggers the buff.
    pub trigger_streak: u64,
}

impl Default for BuffConfig {
    fn default() -> Self {
        Self {
            name: "frenzy".to_string(),
            multiplier: 7.0,
            duration_ms: 10_000,
            cooldown_ms: 30_000,
            trigger_streak: 25,
        }
    }
}

/// Everything `idle simulate --config` can override.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Resources earned per click.
    pub click_value: f64,
    /// Purchasable sources.
    pub sources: Vec<SourceConfig>,
    /// The hybrid buff.
    pub buff: BuffConfig,
    /// Timer manager settings.
    pub timers: TimerConfig,
    /// Category loop settings.
    pub loops: LoopConfig,
    /// Tick loop settings.
    pub tick: TickConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            click_value: 1.0,
            sources: vec![
                SourceConfig::new("cursor", 0.1, 15.0),
                SourceConfig::new("grandma", 1.0, 100.0),
                SourceConfig::new("farm", 8.0, 1_100.0),
                SourceConfig::new("mine", 47.0, 12_000.0),
            ],
            buff: BuffConfig::default(),
            timers: TimerConfig::default(),
            loops: LoopConfig::default(),
            tick: TickConfig::default(),
        }
    }
}

impl GameConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("cannot read config '{}': {e}", path.display()))?;
        serde_json::from_str(&text).map_err(|e| format!("invalid config '{}': {e}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "click_value": 2.5, "loops": { "hybrid_interval_ms": 2000 } }"#).unwrap();
        assert_eq!(config.click_value, 2.5);
        assert_eq!(config.loops.hybrid_interval_ms, 2000);
        assert_eq!(config.loops.passive_interval_ms, 100);
        assert_eq!(config.sources.len(), 4);
        assert_eq!(config.buff.name, "frenzy");
    }

    #[test]
    fn unreadable_file_is_reported() {
        let err = GameConfig::load(Path::new("/nonexistent/idle.json")).unwrap_err();
        assert!(err.contains("cannot read config"));
    }
}
