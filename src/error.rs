use thiserror::Error;

/// Errors raised while configuring or running the scheduler
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Infeasible or invalid parameters, caught at construction time
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("must specify player names or number of players")]
    MissingPlayers,

    /// Player names were supplied but not as a sequence
    #[error("invalid value (must be a list) for player_names: {0}")]
    InvalidPlayerNames(String),

    /// Internal shape mismatch; indicates a bug rather than bad input
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("weight table covers {provided} occurrence levels but {needed} are required")]
    InsufficientWeights { needed: usize, provided: usize },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Fail with an `InvariantViolation` unless `cond` holds
macro_rules! ensure_invariant {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::SchedulerError::InvariantViolation(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_invariant;
