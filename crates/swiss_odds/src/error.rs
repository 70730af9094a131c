//! Fatal errors for probability queries

use swiss_core::{MatchKey, StageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OddsError {
    #[error(transparent)]
    Stage(#[from] StageError),

    #[error("win probability {value} for {key} is outside [0, 1]")]
    InvalidProbability { key: MatchKey, value: f64 },

    #[error("{count} impact matches exceed the limit of {limit}")]
    TooManyImpactMatches { count: usize, limit: usize },

    #[error("trial count must be positive")]
    InvalidTrials,

    #[error("enumeration cancelled after {completed} of {total} branches")]
    Cancelled { completed: usize, total: usize },

    #[error("configuration error in {path}: {message}")]
    Config { path: String, message: String },

    #[error("failed to write {path}: {message}")]
    Write { path: String, message: String },
}
