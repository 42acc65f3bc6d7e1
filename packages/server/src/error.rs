use common::{InadmissibleReason, RoundError, StoreError};
use executor::ExecutorError;
use thiserror::Error;

/// Failure of a contest operation.
#[derive(Debug, Error)]
pub enum ContestError {
    /// The caller may not act on behalf of this user.
    #[error("not allowed to act on behalf of user '{0}'")]
    Authorization(String),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("submission rejected: {0}")]
    RoundInactive(InadmissibleReason),

    #[error(transparent)]
    InvalidTransition(#[from] RoundError),

    #[error("{0}")]
    Validation(String),

    #[error("code execution failed: {0}")]
    Executor(#[from] ExecutorError),

    /// The write did not happen; nothing may be assumed saved.
    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ContestError {
    pub fn round_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "round",
            id: id.into(),
        }
    }

    pub fn problem_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "problem",
            id: id.into(),
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Authorization(_) => "PERMISSION_DENIED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::RoundInactive(InadmissibleReason::NotActive(_)) => "ROUND_NOT_ACTIVE",
            Self::RoundInactive(InadmissibleReason::Locked) => "ROUND_LOCKED",
            Self::RoundInactive(InadmissibleReason::TimeExpired) => "ROUND_TIME_OVER",
            Self::InvalidTransition(RoundError::InvalidDuration(_)) => "VALIDATION_ERROR",
            Self::InvalidTransition(_) => "INVALID_TRANSITION",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Executor(_) => "EXECUTOR_ERROR",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, ContestError>;
