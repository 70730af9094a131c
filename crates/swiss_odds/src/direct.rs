//! Meeting probability for two teams in the same bucket.
//!
//! Every valid pairing of the bucket is treated as equally likely, so the
//! probability is the share of pairings that draw the two teams together.
//! Those pairings are exactly the valid pairings of the bucket with both
//! teams removed, so only counts are needed.

use serde::{Deserialize, Serialize};
use swiss_core::{count_pairings, Team};
use tracing::debug;

use crate::report::{Blocker, Infeasibility};

/// Result of a same-bucket query, with the counts behind the ratio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectOdds {
    pub probability: f64,
    /// Pairings that draw the two teams together
    pub favorable_pairings: u64,
    pub total_pairings: u64,
    /// Bucket members in input order
    pub teams: Vec<String>,
    /// Set when the probability is zero for a structural reason
    pub blocked: Option<Blocker>,
}

impl DirectOdds {
    fn blocked(teams: Vec<String>, reason: Blocker) -> Self {
        Self {
            probability: 0.0,
            favorable_pairings: 0,
            total_pairings: 0,
            teams,
            blocked: Some(reason),
        }
    }
}

/// Probability that `a` and `b` are drawn together when `bucket` is paired.
pub fn direct_probability(a: &str, b: &str, bucket: &[&Team]) -> DirectOdds {
    let teams: Vec<String> = bucket.iter().map(|t| t.name.clone()).collect();

    if a == b {
        return DirectOdds::blocked(teams, Blocker::SameTeam);
    }
    let Some(team_a) = bucket.iter().find(|t| t.name == a) else {
        return DirectOdds::blocked(teams, Blocker::InvalidState { team: a.to_string() });
    };
    if !bucket.iter().any(|t| t.name == b) {
        return DirectOdds::blocked(teams, Blocker::InvalidState { team: b.to_string() });
    }
    if team_a.has_played(b) {
        return DirectOdds::blocked(teams, Blocker::AlreadyPlayed);
    }
    if bucket.len() % 2 != 0 {
        let reason = Infeasibility::OddBucket { size: bucket.len() };
        return DirectOdds::blocked(teams, Blocker::Infeasible { reason });
    }

    let total = count_pairings(bucket);
    if total == 0 {
        let reason = Infeasibility::NoValidPairing;
        return DirectOdds::blocked(teams, Blocker::Infeasible { reason });
    }

    let others: Vec<&Team> = bucket
        .iter()
        .copied()
        .filter(|t| t.name != a && t.name != b)
        .collect();
    let favorable = count_pairings(&others);
    let probability = favorable as f64 / total as f64;
    debug!(a, b, favorable, total, probability, "direct matchup");

    DirectOdds {
        probability,
        favorable_pairings: favorable,
        total_pairings: total,
        teams,
        blocked: None,
    }
}

#[cfg(test)]
#[path = "direct_tests.rs"]
mod direct_tests;
