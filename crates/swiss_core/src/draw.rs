//! Drawing the next round.
//!
//! Each settled bucket is paired internally: one valid pairing is sampled
//! uniformly at random without listing the alternatives. Buckets that cannot
//! be paired internally are reported instead of being merged with neighbours.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StageError;
use crate::pairing::{count_pairings, sample_pairing, Pair};
use crate::stage::SwissStage;
use crate::types::Record;

/// Why a bucket was left undrawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    OddSize,
    NoValidPairing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedBucket {
    pub record: Record,
    pub teams: Vec<String>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawnBucket {
    pub record: Record,
    pub pairs: Vec<Pair>,
    /// How many valid pairings the draw chose from
    pub alternatives: u64,
}

/// Outcome of drawing one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawnRound {
    pub round: u32,
    pub buckets: Vec<DrawnBucket>,
    pub skipped: Vec<SkippedBucket>,
}

impl DrawnRound {
    pub fn pairs(&self) -> impl Iterator<Item = &Pair> {
        self.buckets.iter().flat_map(|b| b.pairs.iter())
    }
}

impl SwissStage {
    /// Draw the next round without touching the stage.
    pub fn draw_round<R: Rng + ?Sized>(&self, rng: &mut R) -> DrawnRound {
        let mut drawn = DrawnRound {
            round: self.round,
            buckets: Vec::new(),
            skipped: Vec::new(),
        };

        for record in self.record_groups().into_keys() {
            let bucket = self.settled_bucket(record);
            if bucket.is_empty() {
                continue;
            }
            let names: Vec<String> = bucket.iter().map(|t| t.name.clone()).collect();

            if bucket.len() % 2 != 0 {
                warn!(%record, size = bucket.len(), "odd bucket left undrawn");
                drawn.skipped.push(SkippedBucket {
                    record,
                    teams: names,
                    reason: SkipReason::OddSize,
                });
                continue;
            }

            match sample_pairing(&bucket, rng) {
                Some(pairs) => {
                    let alternatives = count_pairings(&bucket);
                    debug!(%record, alternatives, "drew bucket");
                    drawn.buckets.push(DrawnBucket {
                        record,
                        pairs,
                        alternatives,
                    });
                }
                None => {
                    warn!(%record, "no valid pairing for bucket");
                    drawn.skipped.push(SkippedBucket {
                        record,
                        teams: names,
                        reason: SkipReason::NoValidPairing,
                    });
                }
            }
        }

        drawn
    }

    /// Schedule every drawn pair as a pending match and advance the round.
    pub fn apply_draw(&mut self, drawn: &DrawnRound) -> Result<(), StageError> {
        for (a, b) in drawn.pairs() {
            self.schedule(a, b)?;
        }
        self.round += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "draw_tests.rs"]
mod draw_tests;
