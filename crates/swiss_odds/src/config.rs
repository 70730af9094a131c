//! Query configuration, loadable from TOML

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use swiss_core::CancelToken;
use tracing::debug;

use crate::error::OddsError;
use crate::scenario::{ScenarioOptions, DEFAULT_MAX_IMPACT_MATCHES, MAX_IMPACT_MATCHES};

/// Settings shared by every query a calculator answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OddsConfig {
    /// Monte-Carlo trials for advancement estimates
    pub trials: u32,
    /// Fixed seed for reproducible simulations
    pub seed: Option<u64>,
    pub max_impact_matches: usize,
    /// Wall-clock budget for one scenario enumeration
    pub time_limit_ms: Option<u64>,
    pub parallel: bool,
}

impl Default for OddsConfig {
    fn default() -> Self {
        Self {
            trials: 10_000,
            seed: None,
            max_impact_matches: DEFAULT_MAX_IMPACT_MATCHES,
            time_limit_ms: None,
            parallel: true,
        }
    }
}

impl OddsConfig {
    /// Load from a TOML file; missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self, OddsError> {
        let shown = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|e| OddsError::Config {
            path: shown.clone(),
            message: e.to_string(),
        })?;
        let config = Self::parse(&contents).map_err(|e| match e {
            OddsError::Config { message, .. } => OddsError::Config {
                path: shown.clone(),
                message,
            },
            other => other,
        })?;
        debug!(path = %shown, ?config, "loaded config");
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, OddsError> {
        let config: Self = toml::from_str(contents).map_err(|e| OddsError::Config {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        if config.trials == 0 {
            return Err(OddsError::InvalidTrials);
        }
        if config.max_impact_matches > MAX_IMPACT_MATCHES {
            return Err(OddsError::Config {
                path: "<inline>".to_string(),
                message: format!(
                    "max_impact_matches is {}, at most {} is supported",
                    config.max_impact_matches, MAX_IMPACT_MATCHES
                ),
            });
        }
        Ok(config)
    }

    /// Options for one enumeration; the deadline clock starts here
    pub fn scenario_options(&self) -> ScenarioOptions {
        let cancel = self.time_limit_ms.map(|ms| {
            let token = CancelToken::new(Some(Duration::from_millis(ms)));
            token.start();
            token
        });
        ScenarioOptions {
            max_impact_matches: self.max_impact_matches,
            parallel: self.parallel,
            cancel,
        }
    }

    /// Seeded when `seed` is set, from entropy otherwise
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
