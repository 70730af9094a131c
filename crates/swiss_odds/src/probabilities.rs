//! Caller-supplied win probabilities for pending matches.
//!
//! Keys are canonical `MatchKey`s and the stored value is always the chance
//! that the key's first team wins. `insert` accepts either orientation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use swiss_core::MatchKey;

use crate::error::OddsError;

/// One line of a probability file: chance that `team` beats `opponent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinProbability {
    pub team: String,
    pub opponent: String,
    pub probability: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct OddsFile {
    #[serde(default)]
    odds: Vec<WinProbability>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WinProbabilities {
    first_wins: BTreeMap<MatchKey, f64>,
}

impl WinProbabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the chance that `team` beats `opponent`.
    pub fn insert(&mut self, team: &str, opponent: &str, probability: f64) -> Result<(), OddsError> {
        let key = MatchKey::new(team, opponent);
        if !(0.0..=1.0).contains(&probability) {
            return Err(OddsError::InvalidProbability {
                key,
                value: probability,
            });
        }
        let first_wins = if key.first() == team {
            probability
        } else {
            1.0 - probability
        };
        self.first_wins.insert(key, first_wins);
        Ok(())
    }

    /// Builder-style `insert`
    pub fn with(mut self, team: &str, opponent: &str, probability: f64) -> Result<Self, OddsError> {
        self.insert(team, opponent, probability)?;
        Ok(self)
    }

    /// Chance that `key.first()` wins
    pub fn first_wins(&self, key: &MatchKey) -> Option<f64> {
        self.first_wins.get(key).copied()
    }

    /// Chance that `team` beats `opponent`
    pub fn win_probability(&self, team: &str, opponent: &str) -> Option<f64> {
        let key = MatchKey::new(team, opponent);
        let p = self.first_wins(&key)?;
        Some(if key.first() == team { p } else { 1.0 - p })
    }

    /// Keys from `required` that have no probability yet
    pub fn missing(&self, required: &[MatchKey]) -> Vec<MatchKey> {
        required
            .iter()
            .filter(|k| !self.first_wins.contains_key(*k))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.first_wins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_wins.is_empty()
    }

    pub fn from_entries(entries: &[WinProbability]) -> Result<Self, OddsError> {
        let mut probabilities = Self::new();
        for e in entries {
            probabilities.insert(&e.team, &e.opponent, e.probability)?;
        }
        Ok(probabilities)
    }

    /// Entries oriented from each key's first team
    pub fn entries(&self) -> Vec<WinProbability> {
        self.first_wins
            .iter()
            .map(|(key, &p)| WinProbability {
                team: key.first().to_string(),
                opponent: key.second().to_string(),
                probability: p,
            })
            .collect()
    }

    /// Load a `[[odds]]` list from TOML (`.toml`) or JSON (anything else)
    pub fn load(path: &Path) -> Result<Self, OddsError> {
        let shown = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|e| OddsError::Config {
            path: shown.clone(),
            message: e.to_string(),
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let file: OddsFile = if is_toml {
            toml::from_str(&contents).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&contents).map_err(|e| e.to_string())
        }
        .map_err(|message| OddsError::Config {
            path: shown,
            message,
        })?;

        Self::from_entries(&file.odds)
    }
}

#[cfg(test)]
#[path = "probabilities_tests.rs"]
mod probabilities_tests;
