//! Virtual-time or realtime run of the demo game.

use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use idle_loop::{EconomySnapshot, InputEvent, SystemCategory, SystemInfo};
use idle_timers::{IntervalOptions, PerformanceReport, RealtimeDriver, TimerManager};

use crate::game::Game;
use crate::game::systems::{BuffSystem, ComboTracker};
use crate::game::config::GameConfig;

/// Granularity of simulated player input, in ms.
const STEP_MS: u64 = 100;

/// Purchases attempted per simulated second.
const MAX_PURCHASES_PER_SECOND: usize = 5;

/// Arguments of `idle simulate`.
pub struct SimulateOptions {
    /// Simulated seconds.
    pub seconds: u64,
    /// Seed for the click RNG.
    pub seed: u64,
    /// Average clicks per second.
    pub clicks_per_second: f64,
    /// Optional JSON game config.
    pub config: Option<PathBuf>,
    /// Print the summary as JSON.
    pub json: bool,
    /// Include per-system statistics.
    pub verbose: bool,
    /// Follow the wall clock.
    pub realtime: bool,
}

#[derive(Serialize)]
struct Summary {
    seconds: u64,
    seed: u64,
    clicks: u64,
    best_streak: u64,
    combos: u64,
    buffs: u64,
    buff_active: bool,
    autosaves: u64,
    peak_sps: f64,
    unlocked: Vec<String>,
    purchases: Vec<String>,
    economy: EconomySnapshot,
    timers: PerformanceReport,
    systems: Vec<SystemInfo>,
}

/// Run the demo game and print its summary.
pub fn run(opts: &SimulateOptions) -> Result<(), String> {
    let config = match &opts.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let mut timers = TimerManager::<Game>::new(config.timers.clone());
    let mut game = Game::new(&config)?;
    let tick = game.start(&mut timers)?;

    // Housekeeping that shares frequency groups with the loop timers.
    timers
        .try_set_interval(
            |cx| {
                cx.state.state.autosaves += 1;
                Ok(())
            },
            30_000,
            "autosave",
            IntervalOptions::default().with_priority(-1),
        )
        .map_err(|e| e.to_string())?;
    timers
        .try_set_interval(
            |cx| {
                let sps = cx.state.state.economy.sps();
                let peak = &mut cx.state.state.peak_sps;
                *peak = peak.max(sps);
                Ok(())
            },
            950,
            "sps-sampler",
            IntervalOptions::default(),
        )
        .map_err(|e| e.to_string())?;

    info!(
        seconds = opts.seconds,
        seed = opts.seed,
        realtime = opts.realtime,
        "simulation started"
    );

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let click_chance = (opts.clicks_per_second * STEP_MS as f64 / 1000.0).clamp(0.0, 1.0);
    let driver = opts.realtime.then(|| RealtimeDriver::attach(&timers));
    let steps_per_second = 1000 / STEP_MS;
    let mut purchases = Vec::new();

    for step in 0..opts.seconds * steps_per_second {
        if rng.random_bool(click_chance) {
            game.input(InputEvent::Click { count: 1 }, timers.now_ms());
        }
        if step % steps_per_second == steps_per_second - 1 {
            for _ in 0..MAX_PURCHASES_PER_SECOND {
                match game.buy_best(timers.now_ms()) {
                    Some(name) => purchases.push(name),
                    None => break,
                }
            }
        }
        match &driver {
            Some(driver) => {
                driver.run_for(&mut timers, &mut game, Duration::from_millis(STEP_MS));
            }
            None => {
                timers.advance(STEP_MS, &mut game);
            }
        }
    }

    let report = timers.performance_report();
    game.stop(&mut timers, tick);
    timers.shutdown();

    let summary = Summary {
        seconds: opts.seconds,
        seed: opts.seed,
        clicks: game.state.clicks,
        best_streak: game.state.best_streak,
        combos: game.loops.get_system::<ComboTracker>().map_or(0, ComboTracker::combos),
        buffs: game.state.buffs,
        buff_active: game.loops.get_system::<BuffSystem>().is_some_and(BuffSystem::is_active),
        autosaves: game.state.autosaves,
        peak_sps: game.state.peak_sps,
        unlocked: game.state.unlocked.clone(),
        purchases,
        economy: game.state.economy.snapshot(),
        timers: report,
        systems: game.loops.system_info(),
    };

    if opts.json {
        let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
        println!("{json}");
    } else {
        print_summary(&summary, opts.verbose);
    }
    Ok(())
}

fn print_summary(summary: &Summary, verbose: bool) {
    let economy = &summary.economy;
    println!(
        "  {} {}",
        "Simulation".bold(),
        format!("({}s, seed={})", summary.seconds, summary.seed).dimmed()
    );
    println!(
        "  Resources: {}  (lifetime {:.1})",
        format!("{:.1}", economy.resources).green().bold(),
        economy.lifetime_earned
    );
    println!(
        "  SPS: {:.2} (peak {:.2}, trend {:+.3}/tick), bonus x{:.2}",
        economy.sps, summary.peak_sps, economy.sps_trend, economy.bonus_multiplier
    );
    println!(
        "  {} clicks, best streak {}, {} combo(s), {} buff(s), {} autosave(s)",
        summary.clicks, summary.best_streak, summary.combos, summary.buffs, summary.autosaves
    );
    if summary.buff_active {
        println!("  {}", "BUFF ACTIVE".magenta().bold());
    }
    for ability in &summary.unlocked {
        println!("  {} {ability}", "UNLOCKED".cyan().bold());
    }
    println!();

    println!("  {}", "Production Sources".bold().underline());
    let mut sources = Table::new();
    sources.set_content_arrangement(ContentArrangement::Dynamic);
    sources.set_header(vec!["Source", "Owned", "Rate/s"]);
    for source in &economy.sources {
        sources.add_row(vec![
            source.name.clone(),
            source.owned.to_string(),
            format!("{:.2}", source.per_second()),
        ]);
    }
    println!("{sources}");
    println!();

    let timers = &summary.timers;
    println!("  {}", "Timer Groups".bold().underline());
    println!(
        "  {} timers on {} host timer(s), consolidation {:.2}, {} failure(s), {} slow",
        timers.total_timers,
        timers.master_timers,
        timers.consolidation_ratio,
        timers.failures,
        timers.slow_callbacks
    );
    let mut groups = Table::new();
    groups.set_content_arrangement(ContentArrangement::Dynamic);
    groups.set_header(vec!["Interval", "Members", "Executions", "Avg ms"]);
    for group in &timers.groups {
        let members = group
            .members
            .iter()
            .map(|m| m.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        groups.add_row(vec![
            format!("{}ms", group.interval_ms),
            members,
            group.executions.to_string(),
            format!("{:.3}", group.average_ms),
        ]);
    }
    println!("{groups}");

    if verbose {
        println!();
        println!("  {}", "Systems".bold().underline());
        let mut systems = Table::new();
        systems.set_content_arrangement(ContentArrangement::Dynamic);
        systems.set_header(vec!["System", "Category", "Updates", "Failures", "Avg ms"]);
        for info in &summary.systems {
            let category = match info.meta.category {
                SystemCategory::Active => "active".yellow(),
                SystemCategory::Passive => "passive".green(),
                SystemCategory::Hybrid => "hybrid".cyan(),
            };
            systems.add_row(vec![
                info.name.clone(),
                category.to_string(),
                info.meta.update_count.to_string(),
                info.meta.failure_count.to_string(),
                format!("{:.3}", info.meta.average_update_ms),
            ]);
        }
        println!("{systems}");

        if !summary.purchases.is_empty() {
            println!();
            println!("  {} {}", "Purchases".bold(), summary.purchases.join(", ").dimmed());
        }
    }
}
