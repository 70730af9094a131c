//! Entry point for matchup queries.
//!
//! The calculator borrows a validated stage and routes each query to the
//! right method: an immediate answer when the input already decides it, the
//! direct bucket ratio for teams waiting on the same record, and scenario
//! enumeration for everything else.

use serde::{Deserialize, Serialize};
use swiss_core::{StageError, SwissStage, Team};
use tracing::{debug, info};

use crate::advancement::{simulate_advancement, AdvancementOdds};
use crate::direct::{direct_probability, DirectOdds};
use crate::config::OddsConfig;
use crate::error::OddsError;
use crate::probabilities::WinProbabilities;
use crate::report::Blocker;
use crate::scenario::{enumerate_scenarios, ScenarioReport};

/// Answer to "how likely do these two teams meet next round?"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum MatchupOdds {
    /// Decided from the input alone: the teams cannot meet
    Blocked { reason: Blocker },
    /// Their pending match is already on the schedule
    Scheduled,
    Direct(DirectOdds),
    Scenarios(ScenarioReport),
}

impl MatchupOdds {
    /// Headline probability
    pub fn probability(&self) -> f64 {
        match self {
            MatchupOdds::Blocked { .. } => 0.0,
            MatchupOdds::Scheduled => 1.0,
            MatchupOdds::Direct(odds) => odds.probability,
            MatchupOdds::Scenarios(report) => report.weighted_probability,
        }
    }

    /// Why the probability is zero, if a reason was found
    pub fn blocker(&self) -> Option<&Blocker> {
        match self {
            MatchupOdds::Blocked { reason } => Some(reason),
            MatchupOdds::Scheduled => None,
            MatchupOdds::Direct(odds) => odds.blocked.as_ref(),
            MatchupOdds::Scenarios(report) => report.blocked.as_ref(),
        }
    }

    pub fn needs_input(&self) -> bool {
        matches!(self.blocker(), Some(Blocker::InputRequired { .. }))
    }

    fn blocked(reason: Blocker) -> Self {
        MatchupOdds::Blocked { reason }
    }
}

/// One row of an all-opponents query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentOdds {
    pub opponent: String,
    pub probability: f64,
    pub odds: MatchupOdds,
}

pub struct MatchupCalculator<'a> {
    stage: &'a SwissStage,
    config: OddsConfig,
}

impl<'a> MatchupCalculator<'a> {
    /// Validate the stage once; every query afterwards trusts it
    pub fn new(stage: &'a SwissStage, config: OddsConfig) -> Result<Self, StageError> {
        stage.validate()?;
        debug!(teams = stage.teams.len(), round = stage.round, "calculator ready");
        Ok(Self { stage, config })
    }

    pub fn stage(&self) -> &SwissStage {
        self.stage
    }

    pub fn config(&self) -> &OddsConfig {
        &self.config
    }

    /// Probability that `a` and `b` are paired in the next round.
    pub fn matchup(
        &self,
        a: &str,
        b: &str,
        probabilities: Option<&WinProbabilities>,
    ) -> Result<MatchupOdds, OddsError> {
        let (team_a, team_b) = match self.lookup(a, b) {
            Ok(pair) => pair,
            Err(reason) => {
                debug!(a, b, %reason, "matchup blocked");
                return Ok(MatchupOdds::blocked(reason));
            }
        };

        if team_a.pending_opponent() == Some(b) {
            return Ok(MatchupOdds::Scheduled);
        }

        let record = team_a.record();
        if record == team_b.record() && !team_a.has_pending() && !team_b.has_pending() {
            let bucket = self.stage.settled_bucket(record);
            return Ok(MatchupOdds::Direct(direct_probability(a, b, &bucket)));
        }

        let report = enumerate_scenarios(
            self.stage,
            a,
            b,
            probabilities,
            &self.config.scenario_options(),
        )?;
        Ok(MatchupOdds::Scenarios(report))
    }

    /// Every active opponent `team` could still meet, or needs input for
    pub fn all_matchups(
        &self,
        team: &str,
        probabilities: Option<&WinProbabilities>,
    ) -> Result<Vec<OpponentOdds>, OddsError> {
        let Some(subject) = self.stage.team(team) else {
            return Ok(Vec::new());
        };
        if !subject.is_active() {
            return Ok(Vec::new());
        }

        let mut rows = Vec::new();
        for other in self.stage.active_teams() {
            if other.name == team {
                continue;
            }
            let odds = self.matchup(team, &other.name, probabilities)?;
            let probability = odds.probability();
            if probability > 0.0 || odds.needs_input() {
                rows.push(OpponentOdds {
                    opponent: other.name.clone(),
                    probability,
                    odds,
                });
            }
        }

        info!(team, opponents = rows.len(), "computed all matchups");
        Ok(rows)
    }

    /// Fair-coin advancement estimate with the configured trials and seed
    pub fn advancement(&self, team: &str) -> Result<AdvancementOdds, OddsError> {
        let subject = self
            .stage
            .team(team)
            .ok_or_else(|| StageError::UnknownTeam(team.to_string()))?;
        let mut rng = self.config.rng();
        simulate_advancement(subject, self.config.trials, &mut rng)
    }

    fn lookup(&self, a: &str, b: &str) -> Result<(&'a Team, &'a Team), Blocker> {
        let team_a = self
            .stage
            .team(a)
            .ok_or_else(|| Blocker::NotFound { team: a.to_string() })?;
        let team_b = self
            .stage
            .team(b)
            .ok_or_else(|| Blocker::NotFound { team: b.to_string() })?;
        if a == b {
            return Err(Blocker::SameTeam);
        }
        for team in [team_a, team_b] {
            if !team.is_active() {
                return Err(Blocker::Inactive {
                    team: team.name.clone(),
                });
            }
        }
        if team_a.has_played(b) {
            return Err(Blocker::AlreadyPlayed);
        }
        Ok((team_a, team_b))
    }
}

#[cfg(test)]
#[path = "calculator_tests.rs"]
mod calculator_tests;
