//! Loading stage snapshots from JSON or TOML files.
//!
//! The file lists each team's history only; records and played sets are
//! derived from it, so a loaded stage is consistent by construction and
//! `validate()` only has to catch dangling or one-sided references.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::StageError;
use crate::stage::SwissStage;
use crate::team::Team;
use crate::types::Outcome;

/// On-disk stage description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageFile {
    #[serde(default = "first_round")]
    pub round: u32,
    pub teams: Vec<TeamEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamEntry {
    pub name: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub opponent: String,
    pub result: Outcome,
}

fn first_round() -> u32 {
    1
}

impl StageFile {
    /// Build and validate the stage
    pub fn into_stage(self) -> Result<SwissStage, StageError> {
        let teams = self
            .teams
            .into_iter()
            .map(|entry| {
                let mut team = Team::new(&entry.name);
                for h in entry.history {
                    team.add_result(&h.opponent, h.result);
                }
                team
            })
            .collect();

        let stage = SwissStage {
            teams,
            round: self.round,
        };
        stage.validate()?;
        Ok(stage)
    }
}

impl From<&SwissStage> for StageFile {
    fn from(stage: &SwissStage) -> Self {
        Self {
            round: stage.round,
            teams: stage
                .teams
                .iter()
                .map(|t| TeamEntry {
                    name: t.name.clone(),
                    history: t
                        .history
                        .iter()
                        .map(|e| HistoryEntry {
                            opponent: e.opponent.clone(),
                            result: e.outcome,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

pub fn parse_stage_json(contents: &str) -> Result<SwissStage, StageError> {
    let file: StageFile = serde_json::from_str(contents).map_err(|e| StageError::Parse {
        path: "<json>".to_string(),
        message: e.to_string(),
    })?;
    file.into_stage()
}

pub fn parse_stage_toml(contents: &str) -> Result<SwissStage, StageError> {
    let file: StageFile = toml::from_str(contents).map_err(|e| StageError::Parse {
        path: "<toml>".to_string(),
        message: e.to_string(),
    })?;
    file.into_stage()
}

/// Load a stage from disk; `.toml` files are read as TOML, anything else as JSON.
pub fn load_stage(path: &Path) -> Result<SwissStage, StageError> {
    let shown = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|source| StageError::Io {
        path: shown.clone(),
        source,
    })?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let stage = if is_toml {
        parse_stage_toml(&contents)
    } else {
        parse_stage_json(&contents)
    }
    .map_err(|e| match e {
        StageError::Parse { message, .. } => StageError::Parse {
            path: shown.clone(),
            message,
        },
        other => other,
    })?;

    info!(path = %shown, teams = stage.teams.len(), round = stage.round, "loaded stage");
    Ok(stage)
}

#[cfg(test)]
#[path = "load_tests.rs"]
mod load_tests;
