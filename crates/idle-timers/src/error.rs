use crate::id::TimerId;

/// Alias for `Result<T, TimerError>`.
pub type TimerResult<T> = Result<T, TimerError>;

/// Errors surfaced by the fallible timer registration API.
#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    /// Registration attempted while the manager is shut down.
    #[error("timer manager is shut down, refusing to register \"{name}\"")]
    Rejected {
        /// Name of the rejected registration.
        name: String,
    },

    /// The timer id is not (or no longer) registered.
    #[error("unknown timer: {0}")]
    UnknownTimer(TimerId),

    /// The operation only applies to interval timers.
    #[error("timer {0} is not an interval")]
    NotAnInterval(TimerId),
}
