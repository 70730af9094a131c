//! Whole-stage runs: draw, play and resolve rounds until the stage ends
//!
//! These exercise the draw, the scheduling of pending matches and result
//! resolution together, checking the stage invariants after every round.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use swiss_core::{parse_stage_json, MatchKey, StageFile, Status, SwissStage};

fn sixteen() -> SwissStage {
    let names: Vec<String> = (1..=16).map(|i| format!("T{}", i)).collect();
    let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
    SwissStage::with_teams(&refs)
}

/// Play one round; returns false when nothing could be drawn
fn play_round(stage: &mut SwissStage, rng: &mut StdRng) -> bool {
    let drawn = stage.draw_round(rng);
    let pairs: Vec<(String, String)> = drawn.pairs().cloned().collect();
    if pairs.is_empty() {
        return false;
    }

    for (a, b) in &pairs {
        let (ta, tb) = (stage.team(a).unwrap(), stage.team(b).unwrap());
        assert_eq!(ta.record(), tb.record(), "{} and {} drawn across records", a, b);
        assert!(ta.can_play(tb), "{} and {} drawn for a rematch", a, b);
    }

    stage.apply_draw(&drawn).unwrap();
    stage.validate().unwrap();
    assert_eq!(stage.pending_matches().len(), pairs.len());

    for (a, b) in &pairs {
        stage.resolve_match(&MatchKey::new(a, b), rng.gen_bool(0.5)).unwrap();
    }
    stage.validate().unwrap();
    true
}

// =============================================================================
// Full Stage Runs
// =============================================================================

#[test]
fn test_full_stage_keeps_invariants() {
    for seed in 0..10 {
        let mut stage = sixteen();
        let mut rng = StdRng::seed_from_u64(seed);

        let mut rounds = 0;
        while !stage.is_complete() && rounds < 10 && play_round(&mut stage, &mut rng) {
            rounds += 1;
        }

        let wins: u32 = stage.teams.iter().map(|t| t.wins as u32).sum();
        let losses: u32 = stage.teams.iter().map(|t| t.losses as u32).sum();
        assert_eq!(wins, losses, "seed {}", seed);

        assert!(stage.qualified_teams().len() <= 8);
        assert!(stage.eliminated_teams().len() <= 8);
        if stage.is_complete() {
            assert_eq!(stage.qualified_teams().len(), 8, "seed {}", seed);
            assert_eq!(stage.eliminated_teams().len(), 8, "seed {}", seed);
        }

        for team in &stage.teams {
            assert!(team.wins <= 3 && team.losses <= 3);
            assert_eq!(team.played.len(), team.history.len());
        }
    }
}

#[test]
fn test_first_round_buckets() {
    let mut stage = sixteen();
    let mut rng = StdRng::seed_from_u64(3);

    assert!(play_round(&mut stage, &mut rng));
    let groups = stage.record_groups();
    assert_eq!(groups.len(), 2);
    assert!(groups.values().all(|names| names.len() == 8));
    assert_eq!(stage.round, 2);

    assert!(play_round(&mut stage, &mut rng));
    let sizes: Vec<usize> = stage.record_groups().values().map(|n| n.len()).collect();
    // 0-2, 1-1, 2-0
    assert_eq!(sizes, vec![4, 8, 4]);
}

#[test]
fn test_finished_teams_are_never_drawn() {
    let mut stage = sixteen();
    let mut rng = StdRng::seed_from_u64(21);
    for _ in 0..4 {
        if !play_round(&mut stage, &mut rng) {
            break;
        }
    }

    let drawn = stage.draw_round(&mut rng);
    for (a, b) in drawn.pairs() {
        assert_eq!(stage.team(a).unwrap().status(), Status::Active);
        assert_eq!(stage.team(b).unwrap().status(), Status::Active);
    }
}

// =============================================================================
// Snapshots
// =============================================================================

#[test]
fn test_mid_stage_snapshot_reloads_identically() {
    let mut stage = sixteen();
    let mut rng = StdRng::seed_from_u64(8);
    play_round(&mut stage, &mut rng);
    let drawn = stage.draw_round(&mut rng);
    stage.apply_draw(&drawn).unwrap();

    let json = serde_json::to_string(&StageFile::from(&stage)).unwrap();
    let reloaded = parse_stage_json(&json).unwrap();
    assert_eq!(reloaded, stage);
    assert_eq!(reloaded.pending_matches().len(), 8);
}
