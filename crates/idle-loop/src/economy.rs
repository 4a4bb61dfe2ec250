use std::collections::VecDeque;

use serde::Serialize;
use tracing::debug;

use crate::error::{LoopError, LoopResult};

/// A purchasable producer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionSource {
    /// Unique name.
    pub name: String,
    /// Units owned.
    pub owned: u64,
    /// Production per unit per second.
    pub base_rate: f64,
    /// Source-specific multiplier.
    pub multiplier: f64,
}

impl ProductionSource {
    /// A source with no units and a neutral multiplier.
    pub fn new(name: impl Into<String>, base_rate: f64) -> Self {
        Self {
            name: name.into(),
            owned: 0,
            base_rate,
            multiplier: 1.0,
        }
    }

    /// Production of all owned units per second, before global multipliers.
    pub fn per_second(&self) -> f64 {
        self.owned as f64 * self.base_rate * self.multiplier
    }
}

/// Bounded history of SPS samples, oldest first.
#[derive(Debug, Clone)]
pub struct SpsHistory {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl SpsHistory {
    /// Keep at most `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a sample, dropping the oldest when full.
    pub fn push(&mut self, sps: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sps);
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    /// Average change per sample across the window. Zero with fewer than two samples.
    pub fn trend(&self) -> f64 {
        match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) if self.samples.len() > 1 => {
                (last - first) / (self.samples.len() - 1) as f64
            }
            _ => 0.0,
        }
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample has been recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }
}

/// Resource totals and production sources of one game.
#[derive(Debug, Clone)]
pub struct Economy {
    resources: f64,
    lifetime_earned: f64,
    sources: Vec<ProductionSource>,
    bonus_multiplier: f64,
    time_rate: f64,
    sps: f64,
    sps_dirty: bool,
    meltdown: bool,
    history: SpsHistory,
}

impl Default for Economy {
    fn default() -> Self {
        Self::new(50)
    }
}

impl Economy {
    /// An empty economy keeping `history_capacity` SPS samples.
    pub fn new(history_capacity: usize) -> Self {
        Self {
            resources: 0.0,
            lifetime_earned: 0.0,
            sources: Vec::new(),
            bonus_multiplier: 1.0,
            time_rate: 1.0,
            sps: 0.0,
            sps_dirty: true,
            meltdown: false,
            history: SpsHistory::new(history_capacity),
        }
    }

    /// Add a production source. A source with the same name is replaced.
    pub fn add_source(&mut self, source: ProductionSource) {
        match self.sources.iter_mut().find(|s| s.name == source.name) {
            Some(existing) => *existing = source,
            None => self.sources.push(source),
        }
        self.sps_dirty = true;
    }

    /// Look up a source by name.
    pub fn source(&self, name: &str) -> Option<&ProductionSource> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// All sources in insertion order.
    pub fn sources(&self) -> &[ProductionSource] {
        &self.sources
    }

    /// Add `quantity` units of a source. Returns the new owned count.
    pub fn purchase(&mut self, name: &str, quantity: u64) -> LoopResult<u64> {
        let source = self
            .sources
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| LoopError::UnknownSource(name.to_string()))?;
        source.owned = source.owned.saturating_add(quantity);
        self.sps_dirty = true;
        debug!(source = name, quantity, owned = source.owned, "source purchased");
        Ok(source.owned)
    }

    /// Add resources directly, as a click does.
    pub fn earn(&mut self, amount: f64) {
        if amount > 0.0 {
            self.resources += amount;
            self.lifetime_earned += amount;
        }
    }

    /// Deduct `amount` if affordable.
    pub fn spend(&mut self, amount: f64) -> bool {
        if amount < 0.0 || amount > self.resources {
            return false;
        }
        self.resources -= amount;
        true
    }

    /// Set the global production multiplier.
    pub fn set_bonus_multiplier(&mut self, multiplier: f64) {
        if self.bonus_multiplier != multiplier {
            self.bonus_multiplier = multiplier;
            self.sps_dirty = true;
        }
    }

    /// Set the time scaling applied when crediting.
    pub fn set_time_rate(&mut self, rate: f64) {
        self.time_rate = rate.max(0.0);
    }

    /// Suspend or resume crediting.
    pub fn set_meltdown(&mut self, meltdown: bool) {
        self.meltdown = meltdown;
    }

    /// Flag the SPS value as stale.
    pub fn mark_sps_dirty(&mut self) {
        self.sps_dirty = true;
    }

    /// Whether the SPS value is stale.
    pub fn is_sps_dirty(&self) -> bool {
        self.sps_dirty
    }

    /// Recompute SPS from the sources and clear the dirty flag.
    pub fn recompute_sps(&mut self) -> f64 {
        let raw: f64 = self.sources.iter().map(ProductionSource::per_second).sum();
        self.sps = raw * self.bonus_multiplier;
        self.sps_dirty = false;
        self.sps
    }

    /// Credit every source's share of `scale` seconds of production.
    ///
    /// Returns the amount gained; zero during a meltdown.
    pub fn credit(&mut self, scale: f64) -> f64 {
        if self.meltdown || scale <= 0.0 {
            return 0.0;
        }
        let gained: f64 = self
            .sources
            .iter()
            .map(|s| s.per_second() * self.bonus_multiplier * scale)
            .sum();
        self.earn(gained);
        gained
    }

    /// Current resources.
    pub fn resources(&self) -> f64 {
        self.resources
    }

    /// Resources earned over the whole game.
    pub fn lifetime_earned(&self) -> f64 {
        self.lifetime_earned
    }

    /// Production per second as of the last recompute.
    pub fn sps(&self) -> f64 {
        self.sps
    }

    /// Global production multiplier.
    pub fn bonus_multiplier(&self) -> f64 {
        self.bonus_multiplier
    }

    /// Time scaling applied when crediting.
    pub fn time_rate(&self) -> f64 {
        self.time_rate
    }

    /// Whether crediting is suspended.
    pub fn is_meltdown(&self) -> bool {
        self.meltdown
    }

    /// Recorded SPS samples.
    pub fn history(&self) -> &SpsHistory {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut SpsHistory {
        &mut self.history
    }

    /// Serializable view for display and reports.
    pub fn snapshot(&self) -> EconomySnapshot {
        EconomySnapshot {
            resources: self.resources,
            lifetime_earned: self.lifetime_earned,
            sps: self.sps,
            sps_trend: self.history.trend(),
            bonus_multiplier: self.bonus_multiplier,
            time_rate: self.time_rate,
            meltdown: self.meltdown,
            sources: self.sources.clone(),
        }
    }
}

/// Point-in-time view of an [`Economy`].
#[derive(Debug, Clone, Serialize)]
pub struct EconomySnapshot {
    /// Spendable resources.
    pub resources: f64,
    /// Resources earned over the whole run.
    pub lifetime_earned: f64,
    /// Production per second as of the last tick.
    pub sps: f64,
    /// Average SPS change per tick over the history window.
    pub sps_trend: f64,
    /// Global production multiplier.
    pub bonus_multiplier: f64,
    /// Game-speed factor applied to each tick's credit.
    pub time_rate: f64,
    /// Whether production is halted.
    pub meltdown: bool,
    /// Every production source.
    pub sources: Vec<ProductionSource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn economy() -> Economy {
        let mut economy = Economy::new(3);
        economy.add_source(ProductionSource::new("cursor", 0.1));
        economy.add_source(ProductionSource::new("grandma", 1.0));
        economy
    }

    #[test]
    fn purchase_marks_sps_dirty() {
        let mut economy = economy();
        economy.recompute_sps();
        assert!(!economy.is_sps_dirty());

        assert_eq!(economy.purchase("grandma", 3).unwrap(), 3);
        assert!(economy.is_sps_dirty());
        assert!((economy.recompute_sps() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn purchase_unknown_source() {
        let err = economy().purchase("factory", 1).unwrap_err();
        assert!(matches!(err, LoopError::UnknownSource(name) if name == "factory"));
    }

    #[test]
    fn credit_applies_bonus_and_scale() {
        let mut economy = economy();
        economy.purchase("cursor", 10).unwrap();
        economy.purchase("grandma", 2).unwrap();
        economy.set_bonus_multiplier(2.0);

        let gained = economy.credit(0.5);
        assert!((gained - 3.0).abs() < 1e-9);
        assert!((economy.resources() - 3.0).abs() < 1e-9);
        assert!((economy.lifetime_earned() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn meltdown_suspends_credit() {
        let mut economy = economy();
        economy.purchase("grandma", 5).unwrap();
        economy.set_meltdown(true);
        assert_eq!(economy.credit(1.0), 0.0);
        assert_eq!(economy.resources(), 0.0);
    }

    #[test]
    fn spend_requires_funds() {
        let mut economy = economy();
        economy.earn(10.0);
        assert!(!economy.spend(11.0));
        assert!(economy.spend(4.0));
        assert!((economy.resources() - 6.0).abs() < 1e-9);
        assert!((economy.lifetime_earned() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn history_is_bounded() {
        let mut history = SpsHistory::new(3);
        for sps in [1.0, 2.0, 4.0, 6.0] {
            history.push(sps);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().collect::<Vec<_>>(), vec![2.0, 4.0, 6.0]);
        assert_eq!(history.latest(), Some(6.0));
        assert!((history.trend() - 2.0).abs() < 1e-9);
        assert_eq!(SpsHistory::new(3).trend(), 0.0);
    }
}
