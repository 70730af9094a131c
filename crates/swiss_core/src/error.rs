//! Structural errors in stage data.
//!
//! These are fatal: a stage that fails validation cannot produce a
//! meaningful probability, so callers abort instead of reporting a result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("duplicate team name: {0}")]
    DuplicateTeam(String),

    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("{team} has a match against unknown opponent {opponent}")]
    UnknownOpponent { team: String, opponent: String },

    #[error("{team} lists itself as an opponent")]
    SelfMatch { team: String },

    #[error("{team} has more than one pending match")]
    MultiplePending { team: String },

    #[error("{team} has a pending match that is not the last history entry")]
    PendingNotTrailing { team: String },

    #[error("pending match {team} vs {opponent} is not mirrored by {opponent}")]
    AsymmetricPending { team: String, opponent: String },

    #[error("{team} and {opponent} are recorded as meeting more than once")]
    Rematch { team: String, opponent: String },

    #[error("result of {team} vs {opponent} is missing or not mirrored by {opponent}")]
    AsymmetricResult { team: String, opponent: String },

    #[error("{team} has matches after finishing the stage at {record}")]
    PlayedAfterFinish { team: String, record: String },

    #[error("played set of {team} disagrees with its history for {opponent}")]
    PlayedSetMismatch { team: String, opponent: String },

    #[error("record of {team} is {recorded} but its history gives {derived}")]
    RecordMismatch {
        team: String,
        recorded: String,
        derived: String,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}
