//! The Swiss stage: every team plus the round counter.
//!
//! Analysis code never mutates a caller's stage. What-if work clones the
//! stage first and applies hypothetical results to the clone.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use crate::error::StageError;
use crate::team::Team;
use crate::types::{MatchKey, Outcome, PendingMatch, Record};

/// Ordered collection of teams plus the current round number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwissStage {
    pub teams: Vec<Team>,
    pub round: u32,
}

impl SwissStage {
    pub fn new(teams: Vec<Team>) -> Self {
        Self { teams, round: 1 }
    }

    /// Fresh stage where every team is 0-0
    pub fn with_teams(names: &[&str]) -> Self {
        Self::new(names.iter().map(|n| Team::new(n)).collect())
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name == name)
    }

    pub fn team_mut(&mut self, name: &str) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.name == name)
    }

    /// Active teams holding `record`, in stage order
    pub fn teams_by_record(&self, record: Record) -> Vec<&Team> {
        self.teams
            .iter()
            .filter(|t| t.is_active() && t.record() == record)
            .collect()
    }

    /// Active teams at `record` that have no outstanding pending match.
    ///
    /// A team with a pending match leaves its record once the match is
    /// decided, so only these teams are drawn against each other at `record`.
    pub fn settled_bucket(&self, record: Record) -> Vec<&Team> {
        self.teams
            .iter()
            .filter(|t| t.is_active() && t.record() == record && !t.has_pending())
            .collect()
    }

    pub fn active_teams(&self) -> Vec<&Team> {
        self.teams.iter().filter(|t| t.is_active()).collect()
    }

    pub fn qualified_teams(&self) -> Vec<&Team> {
        self.teams.iter().filter(|t| t.is_qualified()).collect()
    }

    pub fn eliminated_teams(&self) -> Vec<&Team> {
        self.teams.iter().filter(|t| t.is_eliminated()).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.teams.iter().all(|t| !t.is_active())
    }

    /// Active team names grouped by record
    pub fn record_groups(&self) -> BTreeMap<Record, Vec<String>> {
        let mut groups: BTreeMap<Record, Vec<String>> = BTreeMap::new();
        for team in self.teams.iter().filter(|t| t.is_active()) {
            groups.entry(team.record()).or_default().push(team.name.clone());
        }
        groups
    }

    /// Every pending match exactly once, in order of the first team listed.
    pub fn pending_matches(&self) -> Vec<PendingMatch> {
        let mut seen = HashSet::new();
        let mut pending = Vec::new();
        for team in &self.teams {
            if let Some(opponent) = team.pending_opponent() {
                let key = MatchKey::new(&team.name, opponent);
                if seen.insert(key.clone()) {
                    pending.push(key);
                }
            }
        }
        pending
    }

    /// Record the result of a match between `winner` and `loser`.
    ///
    /// If the two are pending against each other the pending entries are
    /// resolved, otherwise a new decided match is appended to both histories.
    pub fn apply_result(&mut self, winner: &str, loser: &str) -> Result<(), StageError> {
        if self.team(winner).is_none() {
            return Err(StageError::UnknownTeam(winner.to_string()));
        }
        if self.team(loser).is_none() {
            return Err(StageError::UnknownTeam(loser.to_string()));
        }
        if winner == loser {
            return Err(StageError::SelfMatch {
                team: winner.to_string(),
            });
        }

        let scheduled = self.team(winner).and_then(|t| t.pending_opponent()) == Some(loser)
            && self.team(loser).and_then(|t| t.pending_opponent()) == Some(winner);

        if !scheduled {
            if self.team(winner).is_some_and(|t| t.has_played(loser)) {
                return Err(StageError::Rematch {
                    team: winner.to_string(),
                    opponent: loser.to_string(),
                });
            }
            for name in [winner, loser] {
                if let Some(team) = self.team(name).filter(|t| !t.is_active()) {
                    return Err(StageError::PlayedAfterFinish {
                        team: name.to_string(),
                        record: team.record().to_string(),
                    });
                }
            }
            // A decided entry may not follow a pending one
            for name in [winner, loser] {
                if self.team(name).is_some_and(|t| t.has_pending()) {
                    return Err(StageError::PendingNotTrailing {
                        team: name.to_string(),
                    });
                }
            }
        }

        for (name, opponent, won) in [(winner, loser, true), (loser, winner, false)] {
            if let Some(team) = self.team_mut(name) {
                if scheduled {
                    team.resolve_pending(won);
                } else {
                    team.add_result(opponent, Outcome::from_won(won));
                }
            }
        }
        debug!(winner, loser, scheduled, "applied match result");
        Ok(())
    }

    /// Schedule an undecided match between `a` and `b`.
    pub fn schedule(&mut self, a: &str, b: &str) -> Result<(), StageError> {
        for name in [a, b] {
            match self.team(name) {
                None => return Err(StageError::UnknownTeam(name.to_string())),
                Some(team) if team.has_pending() => {
                    return Err(StageError::MultiplePending {
                        team: name.to_string(),
                    })
                }
                Some(team) if !team.is_active() => {
                    return Err(StageError::PlayedAfterFinish {
                        team: name.to_string(),
                        record: team.record().to_string(),
                    })
                }
                Some(_) => {}
            }
        }
        if a == b {
            return Err(StageError::SelfMatch {
                team: a.to_string(),
            });
        }
        if self.team(a).is_some_and(|t| t.has_played(b)) {
            return Err(StageError::Rematch {
                team: a.to_string(),
                opponent: b.to_string(),
            });
        }

        for (name, opponent) in [(a, b), (b, a)] {
            if let Some(team) = self.team_mut(name) {
                team.add_result(opponent, Outcome::Pending);
            }
        }
        Ok(())
    }

    /// Decide a pending match by key. `first_wins` refers to `key.first()`.
    pub fn resolve_match(&mut self, key: &MatchKey, first_wins: bool) -> Result<(), StageError> {
        if first_wins {
            self.apply_result(key.first(), key.second())
        } else {
            self.apply_result(key.second(), key.first())
        }
    }

    /// Structural checks. Any failure makes analysis meaningless.
    pub fn validate(&self) -> Result<(), StageError> {
        let mut by_name: HashMap<&str, &Team> = HashMap::with_capacity(self.teams.len());
        for team in &self.teams {
            if by_name.insert(team.name.as_str(), team).is_some() {
                return Err(StageError::DuplicateTeam(team.name.clone()));
            }
        }

        for team in &self.teams {
            let mut pending = 0;
            let mut reached = Record::new(0, 0);
            let mut decided: HashSet<&str> = HashSet::new();
            for (i, entry) in team.history.iter().enumerate() {
                if !reached.is_active() {
                    return Err(StageError::PlayedAfterFinish {
                        team: team.name.clone(),
                        record: reached.to_string(),
                    });
                }
                if entry.opponent == team.name {
                    return Err(StageError::SelfMatch {
                        team: team.name.clone(),
                    });
                }
                if !by_name.contains_key(entry.opponent.as_str()) {
                    return Err(StageError::UnknownOpponent {
                        team: team.name.clone(),
                        opponent: entry.opponent.clone(),
                    });
                }
                if entry.outcome.is_decided() {
                    if !decided.insert(entry.opponent.as_str()) {
                        return Err(StageError::Rematch {
                            team: team.name.clone(),
                            opponent: entry.opponent.clone(),
                        });
                    }
                    reached = reached.after(entry.outcome == Outcome::Won);
                }
                if entry.outcome == Outcome::Pending {
                    pending += 1;
                    if decided.contains(entry.opponent.as_str()) {
                        return Err(StageError::Rematch {
                            team: team.name.clone(),
                            opponent: entry.opponent.clone(),
                        });
                    }
                    if i + 1 != team.history.len() {
                        return Err(StageError::PendingNotTrailing {
                            team: team.name.clone(),
                        });
                    }
                }
            }
            if pending > 1 {
                return Err(StageError::MultiplePending {
                    team: team.name.clone(),
                });
            }

            if let Some(extra) = team.played.iter().find(|p| !decided.contains(p.as_str())) {
                return Err(StageError::PlayedSetMismatch {
                    team: team.name.clone(),
                    opponent: extra.clone(),
                });
            }
            if let Some(missing) = decided.iter().find(|d| !team.played.contains(**d)) {
                return Err(StageError::PlayedSetMismatch {
                    team: team.name.clone(),
                    opponent: missing.to_string(),
                });
            }

            let derived = team.derived_record();
            if derived != team.record() {
                return Err(StageError::RecordMismatch {
                    team: team.name.clone(),
                    recorded: team.record().to_string(),
                    derived: derived.to_string(),
                });
            }

            if let Some(opponent) = team.pending_opponent() {
                let mirrored = by_name
                    .get(opponent)
                    .and_then(|o| o.pending_opponent())
                    .is_some_and(|back| back == team.name);
                if !mirrored {
                    return Err(StageError::AsymmetricPending {
                        team: team.name.clone(),
                        opponent: opponent.to_string(),
                    });
                }
            }
        }

        // Every decided result needs the opposite result on the other side
        for team in &self.teams {
            for entry in team.history.iter().filter(|e| e.outcome.is_decided()) {
                let mirrored = by_name.get(entry.opponent.as_str()).is_some_and(|o| {
                    o.history.iter().any(|back| {
                        back.opponent == team.name
                            && back.outcome.is_decided()
                            && back.outcome != entry.outcome
                    })
                });
                if !mirrored {
                    return Err(StageError::AsymmetricResult {
                        team: team.name.clone(),
                        opponent: entry.opponent.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod stage_tests;
