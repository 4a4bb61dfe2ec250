//! System coordination and passive income on top of [`idle_timers`].
//!
//! [`LoopManager`] sorts named systems into three categories. Passive and
//! hybrid systems are updated from two shared timer registrations; active
//! and hybrid systems receive input; every system can receive broadcast
//! events, and [`CrossSystemRoute`]s reshape payloads crossing category
//! boundaries. The [`TickLoop`] is the one passive consumer that credits
//! production to the [`Economy`].

/// Registration categories.
pub mod category;
/// Configuration types for the loop manager and the tick loop.
pub mod config;
/// Production sources, resources, and the SPS history.
pub mod economy;
/// Error types for the loop crate.
pub mod error;
/// Events, inputs, and domain notifications exchanged between systems.
pub mod event;
/// The category loop manager.
pub mod loop_manager;
/// Cross-system routes.
pub mod route;
/// The category traits systems implement.
pub mod system;
/// The passive income tick loop.
pub mod tick;

/// Re-export of [`category::SystemCategory`].
pub use category::SystemCategory;
/// Re-exports of configuration types.
pub use config::{LoopConfig, TickConfig};
/// Re-exports of economy types.
pub use economy::{Economy, EconomySnapshot, ProductionSource, SpsHistory};
/// Re-exports of [`error::LoopError`] and [`error::LoopResult`].
pub use error::{LoopError, LoopResult};
/// Re-exports of event types.
pub use event::{DomainEvent, GameEvent, InputEvent};
/// Re-exports of loop manager types.
pub use loop_manager::{CategoryStats, LoopHost, LoopManager, SystemInfo, SystemMeta};
/// Re-export of [`route::CrossSystemRoute`].
pub use route::CrossSystemRoute;
/// Re-exports of the system traits.
pub use system::{
    ActiveSystem, HybridSystem, PassiveSystem, System, SystemContext, SystemHandle, SystemResult,
};
/// Re-exports of tick loop types.
pub use tick::{TickLoop, TickReport, TickTarget};
