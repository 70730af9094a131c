//! Matchup probabilities for Swiss stages
//!
//! This crate answers, for a stage loaded with `swiss_core`:
//! - How likely two teams are to be paired in the next round
//! - Which pending results that depends on, branch by branch
//! - How likely a team is to qualify under a fair-coin model
//!
//! # Usage
//!
//! ```bash
//! # Chance that two teams meet next round
//! cargo run -p swiss_odds -- matchup stage.json "Team A" "Team B" --odds odds.toml
//!
//! # Every opponent a team could draw
//! cargo run -p swiss_odds -- opponents stage.json "Team A"
//!
//! # Qualification estimate
//! cargo run -p swiss_odds -- advance stage.json "Team A" --trials 20000 --seed 7
//! ```

mod advancement;
mod calculator;
mod config;
mod direct;
mod error;
mod probabilities;
mod report;
mod scenario;

pub use advancement::*;
pub use calculator::*;
pub use config::*;
pub use direct::*;
pub use error::*;
pub use probabilities::*;
pub use report::*;
pub use scenario::*;
