use std::time::Instant;

use idle_timers::{IntervalOptions, TimerContext, TimerId, TimerManager};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::category::SystemCategory;
use crate::config::LoopConfig;
use crate::error::{LoopError, LoopResult};
use crate::event::{DomainEvent, GameEvent, InputEvent};
use crate::route::{CrossSystemRoute, default_routes};
use crate::system::{SystemContext, SystemHandle, isolate};

/// Gives the category timers access to the loop manager and the game state at once.
///
/// The state type a [`TimerManager`] is advanced with implements this so the
/// passive and hybrid timers can reach their systems.
pub trait LoopHost<G> {
    /// Split the host into the loop manager and the game state its systems update.
    fn loop_parts(&mut self) -> (&mut LoopManager<G>, &mut G);
}

/// Bookkeeping attached to every registered system.
#[derive(Debug, Clone, Serialize)]
pub struct SystemMeta {
    /// Category the system is registered under.
    pub category: SystemCategory,
    /// Scheduler time of registration.
    pub registered_at_ms: u64,
    /// Scheduler time of the most recent update.
    pub last_update_ms: Option<u64>,
    /// Updates run so far.
    pub update_count: u64,
    /// Hook calls (update, input, event) that failed.
    pub failure_count: u64,
    /// Cumulative update time, in ms.
    pub total_update_ms: f64,
    /// Mean update time, in ms.
    pub average_update_ms: f64,
}

impl SystemMeta {
    fn new(category: SystemCategory, now_ms: u64) -> Self {
        Self {
            category,
            registered_at_ms: now_ms,
            last_update_ms: None,
            update_count: 0,
            failure_count: 0,
            total_update_ms: 0.0,
            average_update_ms: 0.0,
        }
    }

    fn record_update(&mut self, now_ms: u64, elapsed_ms: f64) {
        self.last_update_ms = Some(now_ms);
        self.update_count += 1;
        self.total_update_ms += elapsed_ms;
        self.average_update_ms = self.total_update_ms / self.update_count as f64;
    }
}

/// Timing of one category's dispatches.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryStats {
    /// Dispatches run so far.
    pub dispatches: u64,
    /// Cumulative dispatch time, in ms.
    pub total_ms: f64,
    /// Duration of the most recent dispatch, in ms.
    pub last_ms: f64,
}

impl CategoryStats {
    /// Mean dispatch time, in ms.
    pub fn average_ms(&self) -> f64 {
        if self.dispatches == 0 {
            0.0
        } else {
            self.total_ms / self.dispatches as f64
        }
    }

    fn record(&mut self, elapsed_ms: f64) {
        self.dispatches += 1;
        self.total_ms += elapsed_ms;
        self.last_ms = elapsed_ms;
    }
}

/// Snapshot of a registered system.
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    /// Registration name.
    pub name: String,
    /// Bookkeeping.
    pub meta: SystemMeta,
}

#[derive(Debug)]
struct SystemEntry<G> {
    name: String,
    system: SystemHandle<G>,
    meta: SystemMeta,
}

#[derive(Debug)]
struct Bucket<G> {
    systems: Vec<SystemEntry<G>>,
    stats: CategoryStats,
}

impl<G> Default for Bucket<G> {
    fn default() -> Self {
        Self {
            systems: Vec::new(),
            stats: CategoryStats::default(),
        }
    }
}

#[derive(Debug)]
struct Buckets<G> {
    active: Bucket<G>,
    passive: Bucket<G>,
    hybrid: Bucket<G>,
}

impl<G> Buckets<G> {
    fn get(&self, category: SystemCategory) -> &Bucket<G> {
        match category {
            SystemCategory::Active => &self.active,
            SystemCategory::Passive => &self.passive,
            SystemCategory::Hybrid => &self.hybrid,
        }
    }

    fn get_mut(&mut self, category: SystemCategory) -> &mut Bucket<G> {
        match category {
            SystemCategory::Active => &mut self.active,
            SystemCategory::Passive => &mut self.passive,
            SystemCategory::Hybrid => &mut self.hybrid,
        }
    }

    fn entries(&self) -> impl Iterator<Item = &SystemEntry<G>> {
        self.active
            .systems
            .iter()
            .chain(&self.passive.systems)
            .chain(&self.hybrid.systems)
    }

    fn entries_mut(&mut self) -> impl Iterator<Item = &mut SystemEntry<G>> {
        self.active
            .systems
            .iter_mut()
            .chain(&mut self.passive.systems)
            .chain(&mut self.hybrid.systems)
    }
}

#[derive(Debug, Clone, Copy)]
struct CategoryTimers {
    passive: TimerId,
    hybrid: TimerId,
}

/// Coordinates active, passive, and hybrid systems on top of a [`TimerManager`].
///
/// Passive systems are updated from one shared interval, hybrid systems from
/// another; active systems only see input. Systems run in registration order
/// within their category. Events a system emits are routed once the call
/// that produced them returns.
pub struct LoopManager<G> {
    config: LoopConfig,
    buckets: Buckets<G>,
    routes: Vec<CrossSystemRoute>,
    outbox: Vec<(SystemCategory, GameEvent)>,
    timers: Option<CategoryTimers>,
    routes_installed: bool,
    now_ms: u64,
}

impl<G> std::fmt::Debug for LoopManager<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopManager")
            .field("active", &self.buckets.active.systems.len())
            .field("passive", &self.buckets.passive.systems.len())
            .field("hybrid", &self.buckets.hybrid.systems.len())
            .field("routes", &self.routes.len())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl<G> Default for LoopManager<G> {
    fn default() -> Self {
        Self::new(LoopConfig::default())
    }
}

impl<G> LoopManager<G> {
    /// Create an uninitialized loop manager.
    pub fn new(config: LoopConfig) -> Self {
        Self {
            config,
            buckets: Buckets {
                active: Bucket::default(),
                passive: Bucket::default(),
                hybrid: Bucket::default(),
            },
            routes: Vec::new(),
            outbox: Vec::new(),
            timers: None,
            routes_installed: false,
            now_ms: 0,
        }
    }

    /// Install the default routes and start the passive and hybrid timers.
    ///
    /// Idempotent: a second call while initialized does nothing.
    pub fn initialize<S>(&mut self, timers: &mut TimerManager<S>) -> LoopResult<()>
    where
        S: LoopHost<G> + 'static,
        G: 'static,
    {
        if self.timers.is_some() {
            debug!("loop manager already initialized");
            return Ok(());
        }
        if !self.routes_installed {
            self.routes.extend(default_routes());
            self.routes_installed = true;
        }

        let options = IntervalOptions::default().with_max_execution_time_ms(self.config.slow_update_ms);
        let passive = timers.try_set_interval(
            category_timer::<S, G>(SystemCategory::Passive),
            self.config.passive_interval_ms,
            "loop:passive",
            options,
        )?;
        let hybrid = match timers.try_set_interval(
            category_timer::<S, G>(SystemCategory::Hybrid),
            self.config.hybrid_interval_ms,
            "loop:hybrid",
            options,
        ) {
            Ok(id) => id,
            Err(err) => {
                timers.clear_timer(passive);
                return Err(err.into());
            }
        };

        self.now_ms = timers.now_ms();
        self.timers = Some(CategoryTimers { passive, hybrid });
        info!(
            passive_ms = self.config.passive_interval_ms,
            hybrid_ms = self.config.hybrid_interval_ms,
            systems = self.system_count(),
            "loop manager initialized"
        );
        Ok(())
    }

    /// Stop the category timers. The manager can be initialized again later.
    pub fn cleanup<S>(&mut self, timers: &mut TimerManager<S>) {
        if let Some(ids) = self.timers.take() {
            timers.clear_timer(ids.passive);
            timers.clear_timer(ids.hybrid);
            info!("loop manager cleaned up");
        }
    }

    /// Whether the category timers are running.
    pub fn is_initialized(&self) -> bool {
        self.timers.is_some()
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register a named system under the category of its handle.
    ///
    /// Names are unique within a category.
    pub fn register_system(&mut self, name: impl Into<String>, system: SystemHandle<G>) -> LoopResult<()> {
        let name = name.into();
        let category = system.category();
        let bucket = self.buckets.get_mut(category);
        if bucket.systems.iter().any(|e| e.name == name) {
            return Err(LoopError::DuplicateSystem { category, name });
        }
        debug!(system = %name, %category, "system registered");
        bucket.systems.push(SystemEntry {
            name,
            system,
            meta: SystemMeta::new(category, self.now_ms),
        });
        Ok(())
    }

    /// Append a cross-system route. Routes apply in insertion order.
    pub fn add_cross_system_route(&mut self, route: CrossSystemRoute) {
        debug!(
            event = route.event(),
            source = %route.source(),
            target = %route.target(),
            "cross-system route added"
        );
        self.routes.push(route);
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Update every system of `category` in registration order.
    ///
    /// Called by the category timers; active systems have no update, so
    /// dispatching the active category only records an empty pass.
    pub fn update_system_type(&mut self, category: SystemCategory, game: &mut G, now_ms: u64) {
        self.now_ms = now_ms;
        let slow_ms = self.config.slow_update_ms;
        let log_slow = self.config.debug;

        let started = Instant::now();
        let bucket = self.buckets.get_mut(category);
        for entry in &mut bucket.systems {
            let mut cx = SystemContext::new(&mut *game, now_ms, category, &mut self.outbox);
            let system_started = Instant::now();
            let outcome = isolate(|| entry.system.update(&mut cx).unwrap_or(Ok(())));
            let elapsed_ms = system_started.elapsed().as_secs_f64() * 1000.0;

            entry.meta.record_update(now_ms, elapsed_ms);
            if let Err(message) = outcome {
                entry.meta.failure_count += 1;
                error!(system = %entry.name, %category, error = %message, "system update failed");
            }
            if log_slow && elapsed_ms > slow_ms {
                debug!(system = %entry.name, %category, elapsed_ms, "slow system update");
            }
        }
        bucket.stats.record(started.elapsed().as_secs_f64() * 1000.0);

        self.route_pending(game);
    }

    /// Deliver player input to active systems, then hybrid systems.
    ///
    /// `now_ms` is the scheduler time the input arrived at; systems read it
    /// through [`SystemContext::now_ms`].
    pub fn handle_input(&mut self, game: &mut G, input: &InputEvent, now_ms: u64) {
        self.now_ms = now_ms;
        for category in [SystemCategory::Active, SystemCategory::Hybrid] {
            for entry in &mut self.buckets.get_mut(category).systems {
                let mut cx = SystemContext::new(&mut *game, now_ms, category, &mut self.outbox);
                let outcome = isolate(|| entry.system.handle_input(&mut cx, input).unwrap_or(Ok(())));
                if let Err(message) = outcome {
                    entry.meta.failure_count += 1;
                    error!(system = %entry.name, %category, error = %message, "system input handler failed");
                }
            }
        }
        self.route_pending(game);
    }

    /// Call `handle_event` on every system of every category.
    pub fn broadcast_to_systems(&mut self, game: &mut G, event: &GameEvent, now_ms: u64) {
        self.now_ms = now_ms;
        for entry in self.buckets.entries_mut() {
            let category = entry.meta.category;
            let mut cx = SystemContext::new(&mut *game, now_ms, category, &mut self.outbox);
            if let Err(message) = isolate(|| entry.system.handle_event(&mut cx, event)) {
                entry.meta.failure_count += 1;
                error!(system = %entry.name, event = %event.name, error = %message, "system event handler failed");
            }
        }
        self.route_pending(game);
    }

    /// Forward an event as if a system of `source` had emitted it.
    pub fn emit(&mut self, game: &mut G, source: SystemCategory, event: GameEvent, now_ms: u64) {
        self.now_ms = now_ms;
        self.outbox.push((source, event));
        self.route_pending(game);
    }

    /// Broadcast a domain notification and forward it through the routes.
    pub fn on_domain_event(&mut self, game: &mut G, event: DomainEvent, now_ms: u64) {
        let converted = event.to_event();
        debug!(event = %converted.name, "domain event");
        self.broadcast_to_systems(game, &converted, now_ms);
        self.emit(game, event.source_category(), converted, now_ms);
    }

    fn route_pending(&mut self, game: &mut G) {
        let mut rounds = 0;
        while !self.outbox.is_empty() {
            if rounds >= self.config.max_route_rounds {
                warn!(
                    dropped = self.outbox.len(),
                    rounds,
                    "cross-system event cascade cut off"
                );
                self.outbox.clear();
                break;
            }
            rounds += 1;
            for (source, event) in std::mem::take(&mut self.outbox) {
                self.route(game, source, &event);
            }
        }
    }

    fn route(&mut self, game: &mut G, source: SystemCategory, event: &GameEvent) {
        let mut deliveries = Vec::new();
        for route in self.routes.iter().filter(|r| r.matches(source, &event.name)) {
            match route.apply(event) {
                Ok(routed) => deliveries.push((route.target(), routed)),
                Err(message) => {
                    error!(event = %event.name, %source, error = %message, "route transform failed");
                }
            }
        }
        if deliveries.is_empty() {
            debug!(event = %event.name, %source, "no route for event");
            return;
        }
        for (target, routed) in deliveries {
            self.deliver(game, target, &routed);
        }
    }

    fn deliver(&mut self, game: &mut G, category: SystemCategory, event: &GameEvent) {
        let now_ms = self.now_ms;
        for entry in &mut self.buckets.get_mut(category).systems {
            let mut cx = SystemContext::new(&mut *game, now_ms, category, &mut self.outbox);
            if let Err(message) = isolate(|| entry.system.handle_event(&mut cx, event)) {
                entry.meta.failure_count += 1;
                error!(system = %entry.name, event = %event.name, error = %message, "routed event handler failed");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Number of registered systems across all categories.
    pub fn system_count(&self) -> usize {
        self.buckets.entries().count()
    }

    /// Names of the systems in `category`, in registration order.
    pub fn system_names(&self, category: SystemCategory) -> Vec<&str> {
        self.buckets
            .get(category)
            .systems
            .iter()
            .map(|e| e.name.as_str())
            .collect()
    }

    /// Snapshot of every system, active first, then passive, then hybrid.
    pub fn system_info(&self) -> Vec<SystemInfo> {
        self.buckets
            .entries()
            .map(|e| SystemInfo {
                name: e.name.clone(),
                meta: e.meta.clone(),
            })
            .collect()
    }

    /// Dispatch timing of one category.
    pub fn category_stats(&self, category: SystemCategory) -> &CategoryStats {
        &self.buckets.get(category).stats
    }

    /// Routes in application order.
    pub fn routes(&self) -> &[CrossSystemRoute] {
        &self.routes
    }

    /// Timer ids of the passive and hybrid category timers, when initialized.
    pub fn category_timer_ids(&self) -> Option<(TimerId, TimerId)> {
        self.timers.map(|t| (t.passive, t.hybrid))
    }

    /// Access a system by downcasting to a concrete type.
    pub fn get_system<T: 'static>(&self) -> Option<&T> {
        self.buckets
            .entries()
            .find_map(|e| e.system.as_any().downcast_ref::<T>())
    }

    /// Access a system mutably by downcasting to a concrete type.
    pub fn get_system_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.buckets
            .entries_mut()
            .find_map(|e| e.system.as_any_mut().downcast_mut::<T>())
    }
}

fn category_timer<S, G>(
    category: SystemCategory,
) -> impl FnMut(&mut TimerContext<'_, S>) -> anyhow::Result<()> + 'static
where
    S: LoopHost<G> + 'static,
    G: 'static,
{
    move |cx| {
        let now_ms = cx.now_ms();
        let (loops, game) = cx.state.loop_parts();
        loops.update_system_type(category, game, now_ms);
        Ok(())
    }
}
