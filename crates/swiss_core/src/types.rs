//! Core value types shared by the stage model and the pairing generator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wins needed to leave the stage as qualified
pub const QUALIFY_WINS: u8 = 3;

/// Losses that knock a team out of the stage
pub const ELIMINATION_LOSSES: u8 = 3;

/// Result of one history entry from the owning team's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Won,
    Lost,
    Pending,
}

impl Outcome {
    #[inline]
    pub fn is_decided(self) -> bool {
        self != Outcome::Pending
    }

    /// Decided outcome from a `won` flag.
    pub fn from_won(won: bool) -> Self {
        if won {
            Outcome::Won
        } else {
            Outcome::Lost
        }
    }
}

/// One scheduled or played match in a team's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub opponent: String,
    pub outcome: Outcome,
}

/// A win-loss record. Teams sharing an active record form a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Record {
    pub wins: u8,
    pub losses: u8,
}

impl Record {
    pub const fn new(wins: u8, losses: u8) -> Self {
        Self { wins, losses }
    }

    /// Record still inside the stage (neither threshold reached).
    #[inline]
    pub fn is_active(self) -> bool {
        self.wins < QUALIFY_WINS && self.losses < ELIMINATION_LOSSES
    }

    #[inline]
    pub fn games(self) -> u8 {
        self.wins + self.losses
    }

    pub fn status(self) -> Status {
        if self.wins >= QUALIFY_WINS {
            Status::Qualified
        } else if self.losses >= ELIMINATION_LOSSES {
            Status::Eliminated
        } else {
            Status::Active
        }
    }

    /// Record after one more decided result.
    pub fn after(self, won: bool) -> Self {
        if won {
            Self::new(self.wins + 1, self.losses)
        } else {
            Self::new(self.wins, self.losses + 1)
        }
    }

    /// Every record a team can hold while still in the stage.
    pub fn all_active() -> impl Iterator<Item = Record> {
        (0..QUALIFY_WINS).flat_map(|w| (0..ELIMINATION_LOSSES).map(move |l| Record::new(w, l)))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.wins, self.losses)
    }
}

/// Derived standing of a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Active,
    Qualified,
    Eliminated,
}

/// Unordered pair of team names in canonical (lexicographic) order.
///
/// Used as the map key for anything keyed by a match rather than by a side,
/// such as per-match win probabilities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchKey {
    first: String,
    second: String,
}

impl MatchKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                first: a.to_string(),
                second: b.to_string(),
            }
        } else {
            Self {
                first: b.to_string(),
                second: a.to_string(),
            }
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn involves(&self, team: &str) -> bool {
        self.first == team || self.second == team
    }

    /// The other side of the match, if `team` is part of it.
    pub fn opponent_of(&self, team: &str) -> Option<&str> {
        if self.first == team {
            Some(&self.second)
        } else if self.second == team {
            Some(&self.first)
        } else {
            None
        }
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.first, self.second)
    }
}

/// A match both teams have scheduled but not played: their trailing history
/// entries point at each other as pending.
pub type PendingMatch = MatchKey;

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
