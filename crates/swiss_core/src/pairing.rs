//! Exhaustive pairing of a same-record bucket under the no-rematch rule.
//!
//! The generator is a pure backtracking search: every recursive call returns
//! the complete solutions for the teams it was given, so no accumulator is
//! shared between branches.
//!
//! Counting and sampling never materialize the pairings: they walk the same
//! search over bitmasks of the remaining teams with memoized subtree counts.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

use crate::team::Team;

/// Two team names drawn against each other
pub type Pair = (String, String);

/// A partition of a bucket into disjoint pairs covering every team once
pub type Pairing = Vec<Pair>;

/// Every way to split `teams` into pairs that have not met before.
///
/// An odd-sized bucket cannot be paired internally and yields no pairings.
/// An empty bucket yields exactly one (empty) pairing. The order of the
/// returned pairings is fixed by the input order: the first unpaired team is
/// always the one that picks a partner, so each partition is reached once.
pub fn generate_valid_pairings(teams: &[&Team]) -> Vec<Pairing> {
    if teams.len() % 2 != 0 {
        debug!(size = teams.len(), "odd bucket, no internal pairing");
        return Vec::new();
    }

    let legal = legality_matrix(teams);
    let remaining: Vec<usize> = (0..teams.len()).collect();

    let pairings: Vec<Pairing> = backtrack(&legal, &remaining)
        .into_iter()
        .map(|pairs| {
            pairs
                .into_iter()
                .map(|(i, j)| (teams[i].name.clone(), teams[j].name.clone()))
                .collect()
        })
        .collect();

    debug!(size = teams.len(), pairings = pairings.len(), "enumerated bucket pairings");
    pairings
}

/// Largest bucket handled with bitmask counting; (31)!! still fits in a u64.
const MASK_LIMIT: usize = 32;

/// Number of valid pairings, without materializing them.
pub fn count_pairings(teams: &[&Team]) -> u64 {
    if teams.len() % 2 != 0 {
        return 0;
    }
    let legal = legality_matrix(teams);
    if teams.len() <= MASK_LIMIT {
        return Completions::new(&legal).count(full_mask(teams.len()));
    }
    let remaining: Vec<usize> = (0..teams.len()).collect();
    count(&legal, &remaining)
}

/// One valid pairing drawn uniformly at random, or None when there is none.
///
/// Each partner of the first unpaired team is picked with weight equal to
/// the number of ways the rest can still be completed, which makes every
/// complete pairing equally likely.
pub fn sample_pairing<R: Rng + ?Sized>(teams: &[&Team], rng: &mut R) -> Option<Pairing> {
    if teams.len() % 2 != 0 {
        return None;
    }
    if teams.len() > MASK_LIMIT {
        return generate_valid_pairings(teams).choose(rng).cloned();
    }

    let legal = legality_matrix(teams);
    let mut completions = Completions::new(&legal);
    let mut remaining = full_mask(teams.len());
    if completions.count(remaining) == 0 {
        return None;
    }

    let mut pairing = Vec::with_capacity(teams.len() / 2);
    while remaining != 0 {
        let first = remaining.trailing_zeros() as usize;
        let rest = remaining & !(1u64 << first);

        let options: Vec<(usize, u64)> = members(rest)
            .filter(|&p| legal[first][p])
            .map(|p| (p, completions.count(rest & !(1u64 << p))))
            .filter(|&(_, weight)| weight > 0)
            .collect();
        let total: u64 = options.iter().map(|&(_, w)| w).sum();

        let mut pick = rng.gen_range(0..total);
        let mut partner = options[options.len() - 1].0;
        for &(p, weight) in &options {
            if pick < weight {
                partner = p;
                break;
            }
            pick -= weight;
        }

        pairing.push((teams[first].name.clone(), teams[partner].name.clone()));
        remaining = rest & !(1u64 << partner);
    }
    Some(pairing)
}

/// Whether `pairing` draws `a` against `b` (in either order)
pub fn pairing_contains(pairing: &[Pair], a: &str, b: &str) -> bool {
    pairing
        .iter()
        .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
}

fn legality_matrix(teams: &[&Team]) -> Vec<Vec<bool>> {
    teams
        .iter()
        .map(|a| teams.iter().map(|b| a.can_play(b) && b.can_play(a)).collect())
        .collect()
}

fn backtrack(legal: &[Vec<bool>], remaining: &[usize]) -> Vec<Vec<(usize, usize)>> {
    let Some((&first, rest)) = remaining.split_first() else {
        return vec![Vec::new()];
    };

    let mut solutions = Vec::new();
    for &partner in rest {
        if !legal[first][partner] {
            continue;
        }

        let next: Vec<usize> = rest.iter().copied().filter(|&t| t != partner).collect();
        if !everyone_has_partner(legal, &next) {
            continue;
        }

        // May still dead-end deeper down, in which case this is empty
        for tail in backtrack(legal, &next) {
            let mut pairing = Vec::with_capacity(tail.len() + 1);
            pairing.push((first, partner));
            pairing.extend(tail);
            solutions.push(pairing);
        }
    }
    solutions
}

fn count(legal: &[Vec<bool>], remaining: &[usize]) -> u64 {
    let Some((&first, rest)) = remaining.split_first() else {
        return 1;
    };

    rest.iter()
        .filter(|&&partner| legal[first][partner])
        .map(|&partner| {
            let next: Vec<usize> = rest.iter().copied().filter(|&t| t != partner).collect();
            if everyone_has_partner(legal, &next) {
                count(legal, &next)
            } else {
                0
            }
        })
        .sum()
}

fn full_mask(size: usize) -> u64 {
    if size >= 64 {
        u64::MAX
    } else {
        (1u64 << size) - 1
    }
}

/// Indices of the set bits, lowest first
fn members(mask: u64) -> impl Iterator<Item = usize> {
    (0..64).filter(move |&i| mask & (1u64 << i) != 0)
}

/// Pairing counts for subsets of one bucket, keyed by remaining-team mask
struct Completions<'a> {
    legal: &'a [Vec<bool>],
    memo: HashMap<u64, u64>,
}

impl<'a> Completions<'a> {
    fn new(legal: &'a [Vec<bool>]) -> Self {
        Self {
            legal,
            memo: HashMap::new(),
        }
    }

    fn count(&mut self, remaining: u64) -> u64 {
        if remaining == 0 {
            return 1;
        }
        if let Some(&known) = self.memo.get(&remaining) {
            return known;
        }

        let first = remaining.trailing_zeros() as usize;
        let rest = remaining & !(1u64 << first);
        let mut total = 0;
        for partner in members(rest) {
            if self.legal[first][partner] {
                total += self.count(rest & !(1u64 << partner));
            }
        }

        self.memo.insert(remaining, total);
        total
    }
}

/// Cheap necessary condition: nobody left is without a legal partner.
fn everyone_has_partner(legal: &[Vec<bool>], remaining: &[usize]) -> bool {
    remaining
        .iter()
        .all(|&t| remaining.iter().any(|&o| o != t && legal[t][o]))
}

#[cfg(test)]
#[path = "pairing_tests.rs"]
mod pairing_tests;
