//! Monte-Carlo advancement estimate.
//!
//! Every remaining match is modelled as an independent fair coin. That is a
//! simplifying assumption, not a forecast: real match odds are ignored, and
//! callers get the assumption back in the result so it can be shown next to
//! the number.

use rand::Rng;
use serde::{Deserialize, Serialize};
use swiss_core::{Record, Status, Team, ELIMINATION_LOSSES, QUALIFY_WINS};
use tracing::debug;

use crate::error::OddsError;

/// Model behind an advancement figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assumption {
    /// Each future match is a 50/50 coin flip, independent of the others
    IndependentFairCoin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancementOdds {
    pub team: String,
    pub record: Record,
    pub qualify_rate: f64,
    pub eliminate_rate: f64,
    pub trials: u32,
    /// False when the team had already finished and nothing was sampled
    pub sampled: bool,
    pub assumption: Assumption,
}

/// Estimate how often `team` reaches three wins before three losses.
pub fn simulate_advancement<R: Rng + ?Sized>(
    team: &Team,
    trials: u32,
    rng: &mut R,
) -> Result<AdvancementOdds, OddsError> {
    if trials == 0 {
        return Err(OddsError::InvalidTrials);
    }

    let record = team.record();
    let settled = match record.status() {
        Status::Qualified => Some(1.0),
        Status::Eliminated => Some(0.0),
        Status::Active => None,
    };
    if let Some(qualify_rate) = settled {
        return Ok(AdvancementOdds {
            team: team.name.clone(),
            record,
            qualify_rate,
            eliminate_rate: 1.0 - qualify_rate,
            trials,
            sampled: false,
            assumption: Assumption::IndependentFairCoin,
        });
    }

    let mut qualified = 0u32;
    for _ in 0..trials {
        let (mut wins, mut losses) = (record.wins, record.losses);
        while wins < QUALIFY_WINS && losses < ELIMINATION_LOSSES {
            if rng.gen_bool(0.5) {
                wins += 1;
            } else {
                losses += 1;
            }
        }
        if wins >= QUALIFY_WINS {
            qualified += 1;
        }
    }

    let qualify_rate = qualified as f64 / trials as f64;
    debug!(team = %team.name, %record, trials, qualify_rate, "simulated advancement");

    Ok(AdvancementOdds {
        team: team.name.clone(),
        record,
        qualify_rate,
        eliminate_rate: 1.0 - qualify_rate,
        trials,
        sampled: true,
        assumption: Assumption::IndependentFairCoin,
    })
}

/// Exact qualification probability of the same fair-coin walk.
pub fn exact_advancement(record: Record) -> f64 {
    match record.status() {
        Status::Qualified => 1.0,
        Status::Eliminated => 0.0,
        Status::Active => {
            0.5 * exact_advancement(record.after(true)) + 0.5 * exact_advancement(record.after(false))
        }
    }
}

#[cfg(test)]
#[path = "advancement_tests.rs"]
mod advancement_tests;
