use serde::Deserialize;

/// Configuration for a [`LoopManager`](crate::LoopManager).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Interval of the passive category timer, in ms.
    pub passive_interval_ms: u64,
    /// Interval of the hybrid category timer, in ms.
    pub hybrid_interval_ms: u64,
    /// Per-system update time above which a debug line is logged.
    pub slow_update_ms: f64,
    /// Enables slow-update logging.
    pub debug: bool,
    /// Routing rounds before an event cascade is cut off.
    pub max_route_rounds: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            passive_interval_ms: 100,
            hybrid_interval_ms: 1000,
            slow_update_ms: 16.0,
            debug: false,
            max_route_rounds: 8,
        }
    }
}

impl LoopConfig {
    /// Set the passive category interval.
    pub fn with_passive_interval_ms(mut self, ms: u64) -> Self {
        self.passive_interval_ms = ms;
        self
    }

    /// Set the hybrid category interval.
    pub fn with_hybrid_interval_ms(mut self, ms: u64) -> Self {
        self.hybrid_interval_ms = ms;
        self
    }

    /// Enable or disable slow-update logging.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Configuration for the [`TickLoop`](crate::TickLoop).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Tick interval, in ms.
    pub interval_ms: u64,
    /// Number of SPS samples kept for trend display.
    pub history_capacity: usize,
    /// Slow-tick warning threshold, in ms.
    pub max_execution_ms: f64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            history_capacity: 50,
            max_execution_ms: 16.0,
        }
    }
}

impl TickConfig {
    /// Set the tick interval.
    pub fn with_interval_ms(mut self, ms: u64) -> Self {
        self.interval_ms = ms;
        self
    }

    /// Set the SPS history capacity.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_config_defaults() {
        let config = LoopConfig::default();
        assert_eq!(config.passive_interval_ms, 100);
        assert_eq!(config.hybrid_interval_ms, 1000);
        assert!((config.slow_update_ms - 16.0).abs() < f64::EPSILON);
        assert!(!config.debug);
    }

    #[test]
    fn tick_config_builder_chain() {
        let config = TickConfig::default()
            .with_interval_ms(250)
            .with_history_capacity(10);
        assert_eq!(config.interval_ms, 250);
        assert_eq!(config.history_capacity, 10);
    }

    #[test]
    fn partial_json_overrides() {
        let config: LoopConfig = serde_json::from_str(r#"{ "hybrid_interval_ms": 5000 }"#).unwrap();
        assert_eq!(config.hybrid_interval_ms, 5000);
        assert_eq!(config.passive_interval_ms, 100);
    }
}
