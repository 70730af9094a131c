//! A single competitor in the Swiss stage

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{MatchEntry, Outcome, Record, Status};

/// A team with its record, the opponents it has already faced and its
/// ordered match history.
///
/// An opponent is in `played` exactly when the history holds a decided entry
/// against it. At most one pending entry exists and it is always last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub wins: u8,
    pub losses: u8,
    pub played: BTreeSet<String>,
    pub history: Vec<MatchEntry>,
}

impl Team {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            wins: 0,
            losses: 0,
            played: BTreeSet::new(),
            history: Vec::new(),
        }
    }

    #[inline]
    pub fn record(&self) -> Record {
        Record::new(self.wins, self.losses)
    }

    pub fn status(&self) -> Status {
        self.record().status()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.record().is_active()
    }

    pub fn is_qualified(&self) -> bool {
        self.status() == Status::Qualified
    }

    pub fn is_eliminated(&self) -> bool {
        self.status() == Status::Eliminated
    }

    pub fn has_played(&self, opponent: &str) -> bool {
        self.played.contains(opponent)
    }

    /// No-rematch rule: a team can meet anyone but itself and past opponents.
    pub fn can_play(&self, other: &Team) -> bool {
        self.name != other.name && !self.has_played(&other.name)
    }

    /// Append a history entry. Decided outcomes update the record and the
    /// played set; a pending one only reserves the opponent.
    pub fn add_result(&mut self, opponent: &str, outcome: Outcome) {
        match outcome {
            Outcome::Won => self.wins = self.wins.saturating_add(1),
            Outcome::Lost => self.losses = self.losses.saturating_add(1),
            Outcome::Pending => {}
        }
        if outcome.is_decided() {
            self.played.insert(opponent.to_string());
        }
        self.history.push(MatchEntry {
            opponent: opponent.to_string(),
            outcome,
        });
    }

    /// Opponent of the trailing pending entry, if any.
    pub fn pending_opponent(&self) -> Option<&str> {
        self.history
            .last()
            .filter(|entry| entry.outcome == Outcome::Pending)
            .map(|entry| entry.opponent.as_str())
    }

    pub fn has_pending(&self) -> bool {
        self.pending_opponent().is_some()
    }

    /// Decide the trailing pending entry. Returns false when nothing is pending.
    pub fn resolve_pending(&mut self, won: bool) -> bool {
        let Some(entry) = self
            .history
            .last_mut()
            .filter(|entry| entry.outcome == Outcome::Pending)
        else {
            return false;
        };

        entry.outcome = Outcome::from_won(won);
        self.played.insert(entry.opponent.clone());
        if won {
            self.wins = self.wins.saturating_add(1);
        } else {
            self.losses = self.losses.saturating_add(1);
        }
        true
    }

    /// Record implied by the decided history entries, saturating at `u8::MAX`
    pub fn derived_record(&self) -> Record {
        let wins = self
            .history
            .iter()
            .filter(|e| e.outcome == Outcome::Won)
            .count();
        let losses = self
            .history
            .iter()
            .filter(|e| e.outcome == Outcome::Lost)
            .count();
        let clamp = |n: usize| u8::try_from(n).unwrap_or(u8::MAX);
        Record::new(clamp(wins), clamp(losses))
    }
}

#[cfg(test)]
#[path = "team_tests.rs"]
mod team_tests;
