use idle_timers::TimerError;

use crate::category::SystemCategory;

/// Alias for `Result<T, LoopError>`.
pub type LoopResult<T> = Result<T, LoopError>;

/// Errors raised by the loop manager and the economy.
#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    /// A category name that is not one of active, passive, hybrid.
    #[error("unknown system category: \"{0}\" (expected active, passive or hybrid)")]
    UnknownCategory(String),

    /// A system with the same name is already registered in the category.
    #[error("{category} system \"{name}\" is already registered")]
    DuplicateSystem {
        /// Category of the existing system.
        category: SystemCategory,
        /// The duplicated name.
        name: String,
    },

    /// The named production source does not exist.
    #[error("unknown production source: \"{0}\"")]
    UnknownSource(String),

    /// The timer manager refused a registration.
    #[error(transparent)]
    Timer(#[from] TimerError),
}
