//! Interval normalization table.

use comfy_table::{ContentArrangement, Table};

use idle_timers::{TimerConfig, normalize_interval};

/// Print how each requested interval is normalized.
pub fn run(intervals: &[u64]) -> Result<(), String> {
    if intervals.is_empty() {
        return Err("no intervals given".into());
    }

    let config = TimerConfig::default();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Requested (ms)", "Normalized (ms)", "Rule"]);

    for &requested in intervals {
        let normalized = normalize_interval(requested, &config);
        table.add_row(vec![
            requested.to_string(),
            normalized.to_string(),
            rule(requested, normalized, &config).to_string(),
        ]);
    }

    let mut distinct = intervals
        .iter()
        .map(|&ms| normalize_interval(ms, &config))
        .collect::<Vec<_>>();
    distinct.sort_unstable();
    distinct.dedup();

    println!("{table}");
    println!(
        "  {} requests share {} host timer(s)",
        intervals.len(),
        distinct.len()
    );
    Ok(())
}

fn rule(requested: u64, normalized: u64, config: &TimerConfig) -> &'static str {
    if config.canonical_intervals.contains(&requested) {
        "canonical"
    } else if config.canonical_intervals.contains(&normalized)
        && (requested as f64 - normalized as f64).abs() <= normalized as f64 * config.snap_tolerance
    {
        "snapped"
    } else {
        "rounded"
    }
}
