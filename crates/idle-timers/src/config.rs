use serde::{Deserialize, Deserializer};

/// Canonical intervals (ms) that requested intervals snap to.
pub const CANONICAL_INTERVALS: [u64; 6] = [100, 1000, 5000, 10000, 30000, 60000];

/// Configuration for a [`TimerManager`](crate::TimerManager).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Canonical intervals in ms, ascending. Requests close to one of these snap to it.
    #[serde(deserialize_with = "sorted_intervals")]
    pub canonical_intervals: Vec<u64>,
    /// Relative tolerance for snapping to a canonical interval (0.10 = ±10%).
    pub snap_tolerance: f64,
    /// Rounding step in ms for intervals that are not near a canonical value.
    pub round_to_ms: u64,
    /// Default slow-callback warning threshold in ms (one 60 Hz frame).
    pub default_max_execution_ms: f64,
    /// Group dispatch time above which debug detail is logged.
    pub group_debug_threshold_ms: f64,
    /// Enables per-group debug logging.
    pub debug: bool,
    /// Smoothing factor of the rolling execution-time averages (0 < alpha <= 1).
    pub smoothing: f64,
}

fn sorted_intervals<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u64>, D::Error> {
    let mut intervals = Vec::<u64>::deserialize(deserializer)?;
    intervals.sort_unstable();
    intervals.dedup();
    Ok(intervals)
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            canonical_intervals: CANONICAL_INTERVALS.to_vec(),
            snap_tolerance: 0.10,
            round_to_ms: 100,
            default_max_execution_ms: 16.0,
            group_debug_threshold_ms: 5.0,
            debug: false,
            smoothing: 0.1,
        }
    }
}

impl TimerConfig {
    /// Replace the canonical interval set. Values are sorted and deduplicated.
    pub fn with_canonical_intervals(mut self, mut intervals: Vec<u64>) -> Self {
        intervals.sort_unstable();
        intervals.dedup();
        self.canonical_intervals = intervals;
        self
    }

    /// Set the relative snap tolerance.
    pub fn with_snap_tolerance(mut self, tolerance: f64) -> Self {
        self.snap_tolerance = tolerance;
        self
    }

    /// Set the rounding step used when no canonical interval is close.
    pub fn with_round_to_ms(mut self, step: u64) -> Self {
        self.round_to_ms = step.max(1);
        self
    }

    /// Set the default slow-callback threshold.
    pub fn with_default_max_execution_ms(mut self, ms: f64) -> Self {
        self.default_max_execution_ms = ms;
        self
    }

    /// Enable or disable debug logging of group dispatches.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the rolling-average smoothing factor.
    pub fn with_smoothing(mut self, alpha: f64) -> Self {
        self.smoothing = alpha;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = TimerConfig::default();
        assert_eq!(
            config.canonical_intervals,
            vec![100, 1000, 5000, 10000, 30000, 60000]
        );
        assert!((config.snap_tolerance - 0.10).abs() < f64::EPSILON);
        assert_eq!(config.round_to_ms, 100);
        assert!((config.default_max_execution_ms - 16.0).abs() < f64::EPSILON);
        assert!((config.group_debug_threshold_ms - 5.0).abs() < f64::EPSILON);
        assert!(!config.debug);
    }

    #[test]
    fn config_builder_chain() {
        let config = TimerConfig::default()
            .with_canonical_intervals(vec![500, 250, 500])
            .with_round_to_ms(0)
            .with_debug(true);
        assert_eq!(config.canonical_intervals, vec![250, 500]);
        assert_eq!(config.round_to_ms, 1);
        assert!(config.debug);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: TimerConfig = serde_json::from_str(r#"{ "debug": true }"#).unwrap();
        assert!(config.debug);
        assert_eq!(config.round_to_ms, 100);
        assert_eq!(config.canonical_intervals.len(), 6);
    }

    #[test]
    fn loaded_canonical_intervals_are_sorted_and_deduplicated() {
        let config: TimerConfig =
            serde_json::from_str(r#"{ "canonical_intervals": [1000, 950, 1000] }"#).unwrap();
        assert_eq!(config.canonical_intervals, vec![950, 1000]);
        // The ascending scan sees 950 before 1000.
        assert_eq!(crate::normalize_interval(960, &config), 950);
    }
}
