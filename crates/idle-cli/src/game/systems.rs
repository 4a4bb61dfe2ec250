//! The demo's combo, multiplier, and buff systems.

use std::any::Any;

use idle_loop::{
    ActiveSystem, GameEvent, InputEvent, PassiveSystem, System, SystemContext, SystemResult,
};
use serde_json::json;
use tracing::debug;

use super::config::BuffConfig;
use super::{GameState, STREAK_TIMEOUT_MS};

/// A `click_combo` event is emitted every this many streak clicks.
pub const COMBO_STEP: u64 = 10;

/// How long a combo bonus lasts, in ms.
pub const COMBO_BONUS_MS: u64 = 5_000;

// ---------------------------------------------------------------------------
// Combo tracker (active)
// ---------------------------------------------------------------------------

/// Credits clicks, tracks the click streak, and handles purchase inputs.
#[derive(Debug, Default)]
pub struct ComboTracker {
    combos: u64,
}

impl ComboTracker {
    /// Combos emitted so far.
    pub fn combos(&self) -> u64 {
        self.combos
    }

    fn click(&mut self, cx: &mut SystemContext<'_, GameState>, count: u32) {
        let now = cx.now_ms();
        let game = &mut *cx.game;
        let count = u64::from(count);

        let continues = game
            .last_click_ms
            .is_some_and(|at| now.saturating_sub(at) <= STREAK_TIMEOUT_MS);
        let before = if continues { game.streak } else { 0 };
        game.streak = before + count;
        game.best_streak = game.best_streak.max(game.streak);
        game.last_click_ms = Some(now);
        game.clicks += count;
        game.economy.earn(game.click_value * count as f64);

        if game.streak / COMBO_STEP > before / COMBO_STEP {
            let streak = game.streak;
            self.combos += 1;
            cx.emit(GameEvent::new("click_combo", json!({ "streak": streak })));
        }
    }
}

impl System<GameState> for ComboTracker {
    fn handle_event(&mut self, cx: &mut SystemContext<'_, GameState>, event: &GameEvent) -> SystemResult {
        if event.name == "ability_unlocked" {
            let ability = event.str_field("ability").unwrap_or("unknown");
            let threshold = event.f64_field("threshold").unwrap_or(0.0);
            cx.game.unlocked.push(format!("{ability} ({threshold} sps)"));
            cx.game.click_value *= 2.0;
            debug!(ability, threshold, "ability unlocked");
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ActiveSystem<GameState> for ComboTracker {
    fn handle_input(&mut self, cx: &mut SystemContext<'_, GameState>, input: &InputEvent) -> SystemResult {
        match input {
            InputEvent::Click { count } => self.click(cx, *count),
            InputEvent::Purchase { source, quantity } => {
                cx.game.economy.purchase(source, *quantity)?;
            }
            InputEvent::Action { .. } => {}
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Multiplier (passive)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Bonus {
    multiplier: f64,
    expires_at: u64,
}

/// Folds combo and buff bonuses into the economy's global multiplier.
#[derive(Debug, Default)]
pub struct MultiplierSystem {
    combo: Option<Bonus>,
    buff: Option<Bonus>,
}

impl MultiplierSystem {
    /// The multiplier currently applied.
    pub fn current(&self) -> f64 {
        [self.combo, self.buff]
            .iter()
            .flatten()
            .map(|b| b.multiplier)
            .product()
    }
}

impl System<GameState> for MultiplierSystem {
    fn handle_event(&mut self, cx: &mut SystemContext<'_, GameState>, event: &GameEvent) -> SystemResult {
        let now = cx.now_ms();
        match event.name.as_str() {
            "passive_bonus" => {
                let multiplier = event
                    .f64_field("multiplier")
                    .ok_or_else(|| anyhow::anyhow!("passive_bonus without a multiplier"))?;
                self.combo = Some(Bonus {
                    multiplier,
                    expires_at: now + COMBO_BONUS_MS,
                });
            }
            "buff_bonus" => {
                let multiplier = event
                    .f64_field("multiplier")
                    .ok_or_else(|| anyhow::anyhow!("buff_bonus without a multiplier"))?;
                let duration = event.u64_field("duration_ms").unwrap_or(0);
                self.buff = Some(Bonus {
                    multiplier,
                    expires_at: now + duration,
                });
            }
            _ => {}
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl PassiveSystem<GameState> for MultiplierSystem {
    fn update(&mut self, cx: &mut SystemContext<'_, GameState>) -> SystemResult {
        let now = cx.now_ms();
        for slot in [&mut self.combo, &mut self.buff] {
            if slot.is_some_and(|b| b.expires_at <= now) {
                *slot = None;
            }
        }
        cx.game.economy.set_bonus_multiplier(self.current());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Buff (hybrid)
// ---------------------------------------------------------------------------

/// A timed production buff, triggered by a long click streak or a named action.
#[derive(Debug)]
pub struct BuffSystem {
    config: BuffConfig,
    ready_at: u64,
    active_until: Option<u64>,
}

impl BuffSystem {
    /// A buff that is ready to trigger.
    pub fn new(config: BuffConfig) -> Self {
        Self {
            config,
            ready_at: 0,
            active_until: None,
        }
    }

    /// Whether the buff is running.
    pub fn is_active(&self) -> bool {
        self.active_until.is_some()
    }

    /// End the buff if it has run out by `now_ms`. Returns whether it ended.
    pub fn expire(&mut self, now_ms: u64) -> bool {
        if !self.active_until.is_some_and(|until| until <= now_ms) {
            return false;
        }
        self.active_until = None;
        debug!(buff = %self.config.name, now_ms, "buff expired");
        true
    }

    fn activate(&mut self, cx: &mut SystemContext<'_, GameState>) {
        let now = cx.now_ms();
        if now < self.ready_at {
            return;
        }
        self.ready_at = now + self.config.cooldown_ms;
        self.active_until = Some(now + self.config.duration_ms);
        cx.game.buffs += 1;
        debug!(buff = %self.config.name, now_ms = now, "buff activated");
        cx.emit(GameEvent::new(
            "buff_activated",
            json!({
                "name": self.config.name,
                "multiplier": self.config.multiplier,
                "duration_ms": self.config.duration_ms,
            }),
        ));
    }
}

impl System<GameState> for BuffSystem {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl PassiveSystem<GameState> for BuffSystem {
    fn update(&mut self, cx: &mut SystemContext<'_, GameState>) -> SystemResult {
        self.expire(cx.now_ms());
        Ok(())
    }
}

impl ActiveSystem<GameState> for BuffSystem {
    fn handle_input(&mut self, cx: &mut SystemContext<'_, GameState>, input: &InputEvent) -> SystemResult {
        let triggered = match input {
            InputEvent::Click { .. } => cx.game.streak >= self.config.trigger_streak,
            InputEvent::Action { name } => *name == self.config.name,
            InputEvent::Purchase { .. } => false,
        };
        if triggered {
            self.activate(cx);
        }
        Ok(())
    }
}
