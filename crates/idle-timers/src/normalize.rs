use crate::config::TimerConfig;

/// Map a requested interval onto the interval its frequency group runs at.
///
/// 1. An exact canonical value is returned unchanged.
/// 2. Otherwise the first canonical value within the snap tolerance wins.
/// 3. Otherwise the request is rounded to the nearest rounding step, never
///    below one step.
pub fn normalize_interval(requested_ms: u64, config: &TimerConfig) -> u64 {
    if config.canonical_intervals.contains(&requested_ms) {
        return requested_ms;
    }

    let requested = requested_ms as f64;
    for &canonical in &config.canonical_intervals {
        let canonical_f = canonical as f64;
        if (requested - canonical_f).abs() <= canonical_f * config.snap_tolerance {
            return canonical;
        }
    }

    let step = config.round_to_ms.max(1);
    let rounded = requested_ms.saturating_add(step / 2) / step * step;
    rounded.max(step)
}
