//! Swiss-stage state model and pairing generator.
//!
//! Teams advance at three wins and drop out at three losses. Each round, the
//! active teams sharing a record are paired among themselves and two teams
//! never meet twice. This crate holds the passive state and the exhaustive
//! pairing enumeration that the probability engine in `swiss_odds` builds on.

pub mod cancel;
pub mod draw;
pub mod error;
pub mod load;
pub mod pairing;
pub mod stage;
pub mod team;
pub mod types;

pub use cancel::CancelToken;
pub use draw::{DrawnBucket, DrawnRound, SkipReason, SkippedBucket};
pub use error::StageError;
pub use load::{load_stage, parse_stage_json, parse_stage_toml, HistoryEntry, StageFile, TeamEntry};
pub use pairing::{count_pairings, generate_valid_pairings, pairing_contains, sample_pairing, Pair, Pairing};
pub use stage::SwissStage;
pub use team::Team;
pub use types::*;
