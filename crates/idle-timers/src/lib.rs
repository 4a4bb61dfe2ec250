//! Frequency-consolidating timer manager.
//!
//! Many unrelated subsystems want "run this roughly every N ms". Instead of
//! giving each of them its own host timer, [`TimerManager`] normalizes every
//! requested interval onto a small canonical set and runs all registrations
//! sharing a normalized interval from one master timer. Callbacks are
//! isolated from each other: an error or panic in one never stops its
//! siblings, the group's accounting, or the manager itself.
//!
//! Time is virtual. The host advances the manager with
//! [`TimerManager::advance`], or hands it to a [`RealtimeDriver`] which maps
//! wall-clock time onto the same queue.

/// Configuration for the timer manager.
pub mod config;
/// Callback context handed to timer callbacks during dispatch.
pub mod context;
/// Wall-clock driver for the virtual timer queue.
pub mod driver;
/// Error types for the timer crate.
pub mod error;
/// Frequency groups: registrations sharing one master timer.
pub mod group;
/// The host timer primitive.
pub mod host;
/// Timer identifiers.
pub mod id;
/// The timer manager facade.
pub mod manager;
/// Interval normalization.
pub mod normalize;
/// Timer registrations and their execution stats.
pub mod registry;
/// Read-only performance and debug snapshots.
pub mod report;
/// Rolling statistics helpers.
pub mod stats;

/// Re-export of [`config::TimerConfig`].
pub use config::TimerConfig;
/// Re-export of [`context::TimerContext`].
pub use context::TimerContext;
/// Re-export of [`driver::RealtimeDriver`].
pub use driver::RealtimeDriver;
/// Re-exports of [`error::TimerError`] and [`error::TimerResult`].
pub use error::{TimerError, TimerResult};
/// Re-export of [`id::TimerId`].
pub use id::TimerId;
/// Re-exports of [`manager::TimerManager`] and [`manager::TimerCallback`].
pub use manager::{TimerCallback, TimerManager};
/// Re-export of [`normalize::normalize_interval`].
pub use normalize::normalize_interval;
/// Re-exports of registration types.
pub use registry::{IntervalOptions, TimerKind, TimerSummary};
/// Re-exports of report types.
pub use report::{DebugInfo, GroupReport, PerformanceReport};
