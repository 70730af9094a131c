//! Reasons a query yields zero, and JSON output of results

use serde::{Deserialize, Serialize};
use std::path::Path;
use swiss_core::MatchKey;
use thiserror::Error;

use crate::error::OddsError;

/// Why a pairing cannot be formed inside a bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum Infeasibility {
    #[error("bucket of {size} teams cannot be paired internally")]
    OddBucket { size: usize },
    #[error("no pairing of the bucket avoids a rematch")]
    NoValidPairing,
}

/// A condition detected from the input that makes a probability zero (or
/// impossible to compute without more input). These are results, not
/// failures: the caller gets one of them alongside a probability of 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Blocker {
    #[error("unknown team {team}")]
    NotFound { team: String },
    #[error("a team cannot meet itself")]
    SameTeam,
    #[error("{team} is not part of the bucket being paired")]
    InvalidState { team: String },
    #[error("the teams have already played")]
    AlreadyPlayed,
    #[error("{team} is no longer active")]
    Inactive { team: String },
    #[error("no common record is reachable in a single step")]
    Unreachable,
    #[error("win probabilities needed for {} pending matches", matches.len())]
    InputRequired { matches: Vec<MatchKey> },
    #[error("{reason}")]
    Infeasible { reason: Infeasibility },
}

/// `save(path)` for every report type, including `swiss_core::DrawnRound`
pub trait SaveJson: Serialize {
    fn save(&self, path: &Path) -> Result<(), OddsError> {
        save_json(self, path)
    }
}

impl<T: Serialize> SaveJson for T {}

/// Write any serializable result as pretty JSON
pub fn save_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), OddsError> {
    let shown = path.display().to_string();
    let json = serde_json::to_string_pretty(value).map_err(|e| OddsError::Write {
        path: shown.clone(),
        message: e.to_string(),
    })?;
    std::fs::write(path, json).map_err(|e| OddsError::Write {
        path: shown,
        message: e.to_string(),
    })
}
