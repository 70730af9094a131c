//! Cross-bucket meetings: reasoning over undecided matches.
//!
//! Two teams on different records can only meet once both land on a common
//! record. Only single-step paths are modelled: each team may need at most
//! the result of its own pending match to get there. Anything longer is
//! reported as infeasible rather than approximated.
//!
//! For the nearest common target record the enumerator fixes both teams'
//! required results (the prerequisites), finds every other pending match
//! whose result changes who else sits on the target record (impact
//! matches), and walks all 2^k outcome combinations of those. Each branch is
//! materialized on a cloned stage and scored with the direct calculator.
//! Branch probabilities are conditional on the prerequisites holding.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::sync::atomic::{AtomicUsize, Ordering};
use swiss_core::{CancelToken, MatchKey, Outcome, Record, SwissStage, Team};
use tracing::{debug, info, warn};

use crate::direct::{direct_probability, DirectOdds};
use crate::error::OddsError;
use crate::probabilities::WinProbabilities;
use crate::report::Blocker;

/// Default cap on impact matches (2^12 branches)
pub const DEFAULT_MAX_IMPACT_MATCHES: usize = 12;

/// Hard ceiling on impact matches: every branch mask must fit in a `usize`
pub const MAX_IMPACT_MATCHES: usize = usize::BITS as usize - 1;

/// What a team needs to move from its record to a target record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum PathStep {
    /// On the target record with no match left to play this round
    AlreadyThere,
    NeedsWin { opponent: String },
    NeedsLoss { opponent: String },
    /// Needs more than its pending match can give, or cannot move at all
    Infeasible,
}

impl PathStep {
    pub fn is_reachable(&self) -> bool {
        !matches!(self, PathStep::Infeasible)
    }

    /// Number of results needed (None when infeasible)
    pub fn steps(&self) -> Option<u8> {
        match self {
            PathStep::AlreadyThere => Some(0),
            PathStep::NeedsWin { .. } | PathStep::NeedsLoss { .. } => Some(1),
            PathStep::Infeasible => None,
        }
    }

    /// The pending match this step depends on, and whether `team` must win it
    pub fn required_result(&self, team: &str) -> Option<(MatchKey, bool)> {
        match self {
            PathStep::NeedsWin { opponent } => Some((MatchKey::new(team, opponent), true)),
            PathStep::NeedsLoss { opponent } => Some((MatchKey::new(team, opponent), false)),
            _ => None,
        }
    }
}

/// Single-step route from a team's record to `target`.
///
/// A team still waiting on a pending match cannot stay where it is, and a
/// team without one cannot move before the next draw.
pub fn find_single_step_path(team: &Team, target: Record) -> PathStep {
    if !team.is_active() || !target.is_active() {
        return PathStep::Infeasible;
    }

    let current = team.record();
    match team.pending_opponent() {
        None if current == target => PathStep::AlreadyThere,
        None => PathStep::Infeasible,
        Some(opponent) if current.after(true) == target => PathStep::NeedsWin {
            opponent: opponent.to_string(),
        },
        Some(opponent) if current.after(false) == target => PathStep::NeedsLoss {
            opponent: opponent.to_string(),
        },
        Some(_) => PathStep::Infeasible,
    }
}

/// A target record both teams can reach, with their paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonTarget {
    pub record: Record,
    pub path_a: PathStep,
    pub path_b: PathStep,
}

/// Every active record both teams reach in at most one step, nearest first.
///
/// Records where both are already settled are left out (that is a same
/// bucket query), as are records that need opposite results from the
/// same match.
pub fn common_targets(a: &Team, b: &Team) -> Vec<CommonTarget> {
    let mut targets: Vec<CommonTarget> = Record::all_active()
        .filter_map(|record| {
            let path_a = find_single_step_path(a, record);
            let path_b = find_single_step_path(b, record);
            if !path_a.is_reachable() || !path_b.is_reachable() {
                return None;
            }
            if path_a == PathStep::AlreadyThere && path_b == PathStep::AlreadyThere {
                return None;
            }
            if let (Some((ka, _)), Some((kb, _))) =
                (path_a.required_result(&a.name), path_b.required_result(&b.name))
            {
                if ka == kb {
                    return None;
                }
            }
            Some(CommonTarget {
                record,
                path_a,
                path_b,
            })
        })
        .collect();

    targets.sort_by_key(|t| {
        let steps = t
            .path_a
            .steps()
            .unwrap_or(u8::MAX)
            .saturating_add(t.path_b.steps().unwrap_or(u8::MAX));
        (steps, t.record.games(), Reverse(t.record.wins))
    });
    targets
}

/// A team that lands on the target record through an impact match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entrant {
    pub team: String,
    /// Result the team needs: `Won` or `Lost`
    pub via: Outcome,
}

/// A pending match whose result changes the target record's membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactMatch {
    pub key: MatchKey,
    pub entrants: Vec<Entrant>,
}

/// Pending matches, other than `excluded`, that can put a team on `target`.
pub fn identify_impact_matches(
    stage: &SwissStage,
    target: Record,
    excluded: &[MatchKey],
) -> Vec<ImpactMatch> {
    stage
        .pending_matches()
        .into_iter()
        .filter(|key| !excluded.contains(key))
        .filter_map(|key| {
            let entrants: Vec<Entrant> = [key.first(), key.second()]
                .into_iter()
                .filter_map(|name| stage.team(name))
                .filter(|team| team.is_active())
                .filter_map(|team| {
                    let via = if team.record().after(true) == target {
                        Outcome::Won
                    } else if team.record().after(false) == target {
                        Outcome::Lost
                    } else {
                        return None;
                    };
                    Some(Entrant {
                        team: team.name.clone(),
                        via,
                    })
                })
                .collect();

            if entrants.is_empty() {
                None
            } else {
                Some(ImpactMatch { key, entrants })
            }
        })
        .collect()
}

/// What a queried team needs to reach the target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prerequisite {
    pub team: String,
    pub current: Record,
    pub path: PathStep,
}

/// Winner of one impact match within a branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactResult {
    pub key: MatchKey,
    pub winner: String,
}

/// One combination of impact-match results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub index: usize,
    pub results: Vec<ImpactResult>,
    /// Product of the chosen results' probabilities
    pub occurrence_probability: f64,
    /// Target bucket after the branch is applied
    pub bucket: Vec<String>,
    /// Bucket members other than the two queried teams
    pub others: Vec<String>,
    pub direct: DirectOdds,
}

/// Full cross-bucket analysis for one pair of teams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub team_a: String,
    pub team_b: String,
    pub target: Option<Record>,
    pub prerequisites: Vec<Prerequisite>,
    pub impact_matches: Vec<ImpactMatch>,
    pub scenarios: Vec<Scenario>,
    /// Σ occurrence × direct probability, conditional on the prerequisites
    pub weighted_probability: f64,
    pub blocked: Option<Blocker>,
}

impl ScenarioReport {
    fn empty(a: &str, b: &str) -> Self {
        Self {
            team_a: a.to_string(),
            team_b: b.to_string(),
            target: None,
            prerequisites: Vec::new(),
            impact_matches: Vec::new(),
            scenarios: Vec::new(),
            weighted_probability: 0.0,
            blocked: None,
        }
    }

    fn blocked(mut self, reason: Blocker) -> Self {
        self.blocked = Some(reason);
        self
    }

    /// Sum of branch probabilities; 1 whenever branches were enumerated
    pub fn total_occurrence(&self) -> f64 {
        self.scenarios.iter().map(|s| s.occurrence_probability).sum()
    }

    /// Matches the caller still has to supply probabilities for
    pub fn input_required(&self) -> Option<&[MatchKey]> {
        match &self.blocked {
            Some(Blocker::InputRequired { matches }) => Some(matches.as_slice()),
            _ => None,
        }
    }
}

/// Limits and switches for an enumeration run
#[derive(Debug, Clone)]
pub struct ScenarioOptions {
    /// Refuse to enumerate more than 2^max branches; never above
    /// `MAX_IMPACT_MATCHES`
    pub max_impact_matches: usize,
    /// Score branches on the rayon pool
    pub parallel: bool,
    /// Polled before every branch
    pub cancel: Option<CancelToken>,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            max_impact_matches: DEFAULT_MAX_IMPACT_MATCHES,
            parallel: true,
            cancel: None,
        }
    }
}

/// Weighted meeting probability for two teams on different records, via
/// the nearest common target record.
pub fn enumerate_scenarios(
    stage: &SwissStage,
    a: &str,
    b: &str,
    probabilities: Option<&WinProbabilities>,
    options: &ScenarioOptions,
) -> Result<ScenarioReport, OddsError> {
    let (team_a, team_b) = match lookup_pair(stage, a, b) {
        Ok(pair) => pair,
        Err(reason) => return Ok(ScenarioReport::empty(a, b).blocked(reason)),
    };

    let Some(target) = common_targets(team_a, team_b).into_iter().next() else {
        debug!(a, b, "no common target record");
        return Ok(ScenarioReport::empty(a, b).blocked(Blocker::Unreachable));
    };
    debug!(a, b, target = %target.record, "selected target record");

    enumerate_target(stage, team_a, team_b, target, probabilities, options)
}

/// Same analysis for an explicitly chosen target record.
pub fn enumerate_scenarios_at(
    stage: &SwissStage,
    a: &str,
    b: &str,
    target: Record,
    probabilities: Option<&WinProbabilities>,
    options: &ScenarioOptions,
) -> Result<ScenarioReport, OddsError> {
    let (team_a, team_b) = match lookup_pair(stage, a, b) {
        Ok(pair) => pair,
        Err(reason) => return Ok(ScenarioReport::empty(a, b).blocked(reason)),
    };

    match common_targets(team_a, team_b)
        .into_iter()
        .find(|t| t.record == target)
    {
        Some(target) => enumerate_target(stage, team_a, team_b, target, probabilities, options),
        None => Ok(ScenarioReport::empty(a, b).blocked(Blocker::Unreachable)),
    }
}

fn lookup_pair<'s>(stage: &'s SwissStage, a: &str, b: &str) -> Result<(&'s Team, &'s Team), Blocker> {
    let team_a = stage.team(a).ok_or_else(|| Blocker::NotFound { team: a.to_string() })?;
    let team_b = stage.team(b).ok_or_else(|| Blocker::NotFound { team: b.to_string() })?;
    if a == b {
        return Err(Blocker::SameTeam);
    }
    Ok((team_a, team_b))
}

fn enumerate_target(
    stage: &SwissStage,
    team_a: &Team,
    team_b: &Team,
    target: CommonTarget,
    probabilities: Option<&WinProbabilities>,
    options: &ScenarioOptions,
) -> Result<ScenarioReport, OddsError> {
    let (a, b) = (team_a.name.as_str(), team_b.name.as_str());
    let mut report = ScenarioReport::empty(a, b);
    report.target = Some(target.record);

    let required: Vec<(MatchKey, bool)> = [
        target.path_a.required_result(a).map(|(k, win)| (k, a, win)),
        target.path_b.required_result(b).map(|(k, win)| (k, b, win)),
    ]
    .into_iter()
    .flatten()
    .map(|(key, team, team_wins)| {
        let first_wins = (key.first() == team) == team_wins;
        (key, first_wins)
    })
    .collect();

    report.prerequisites = vec![
        Prerequisite {
            team: a.to_string(),
            current: team_a.record(),
            path: target.path_a,
        },
        Prerequisite {
            team: b.to_string(),
            current: team_b.record(),
            path: target.path_b,
        },
    ];

    let excluded: Vec<MatchKey> = required.iter().map(|(k, _)| k.clone()).collect();
    report.impact_matches = identify_impact_matches(stage, target.record, &excluded);
    let keys: Vec<MatchKey> = report.impact_matches.iter().map(|m| m.key.clone()).collect();

    let limit = options.max_impact_matches.min(MAX_IMPACT_MATCHES);
    if keys.len() > limit {
        return Err(OddsError::TooManyImpactMatches {
            count: keys.len(),
            limit,
        });
    }

    let first_wins: Option<Vec<f64>> = keys
        .iter()
        .map(|k| probabilities.and_then(|p| p.first_wins(k)))
        .collect();
    let Some(first_wins) = first_wins else {
        let matches = match probabilities {
            Some(p) => p.missing(&keys),
            None => keys,
        };
        warn!(a, b, missing = matches.len(), "win probabilities required");
        return Ok(report.blocked(Blocker::InputRequired { matches }));
    };

    // Prerequisites hold in every branch
    let mut base = stage.clone();
    for (key, first_wins) in &required {
        base.resolve_match(key, *first_wins)?;
    }

    let total = 1usize << keys.len();
    let completed = AtomicUsize::new(0);
    let score = |mask: usize| -> Result<Scenario, OddsError> {
        if let Some(cancel) = &options.cancel {
            if cancel.check() {
                return Err(OddsError::Cancelled {
                    completed: completed.load(Ordering::Relaxed),
                    total,
                });
            }
        }
        let scenario = score_branch(&base, a, b, target.record, &keys, &first_wins, mask)?;
        completed.fetch_add(1, Ordering::Relaxed);
        Ok(scenario)
    };

    report.scenarios = if options.parallel && total > 1 {
        (0..total).into_par_iter().map(score).collect::<Result<Vec<_>, _>>()?
    } else {
        (0..total).map(score).collect::<Result<Vec<_>, _>>()?
    };

    report.weighted_probability = report
        .scenarios
        .iter()
        .map(|s| s.occurrence_probability * s.direct.probability)
        .sum();

    info!(
        a,
        b,
        target = %target.record,
        impact = keys.len(),
        branches = total,
        weighted = report.weighted_probability,
        "enumerated scenarios"
    );
    Ok(report)
}

/// Bit i of `mask` clear means the first team of impact match i wins.
fn score_branch(
    base: &SwissStage,
    a: &str,
    b: &str,
    target: Record,
    keys: &[MatchKey],
    first_wins: &[f64],
    mask: usize,
) -> Result<Scenario, OddsError> {
    let mut snapshot = base.clone();
    let mut occurrence = 1.0;
    let mut results = Vec::with_capacity(keys.len());

    for (i, (key, &p)) in keys.iter().zip(first_wins).enumerate() {
        let first_won = mask & (1 << i) == 0;
        snapshot.resolve_match(key, first_won)?;
        occurrence *= if first_won { p } else { 1.0 - p };
        let winner = if first_won { key.first() } else { key.second() };
        results.push(ImpactResult {
            key: key.clone(),
            winner: winner.to_string(),
        });
    }

    let bucket = snapshot.settled_bucket(target);
    let direct = direct_probability(a, b, &bucket);
    let others = bucket
        .iter()
        .map(|t| t.name.clone())
        .filter(|n| n != a && n != b)
        .collect();

    Ok(Scenario {
        index: mask,
        results,
        occurrence_probability: occurrence,
        bucket: direct.teams.clone(),
        others,
        direct,
    })
}

#[cfg(test)]
#[path = "scenario_tests.rs"]
mod scenario_tests;
