use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use swiss_core::{Outcome, SwissStage};

fn team_at(wins: u8, losses: u8) -> Team {
    let mut team = Team::new("X");
    for i in 0..wins {
        team.add_result(&format!("W{}", i), Outcome::Won);
    }
    for i in 0..losses {
        team.add_result(&format!("L{}", i), Outcome::Lost);
    }
    team
}

#[test]
fn test_exact_values() {
    assert!((exact_advancement(Record::new(0, 0)) - 0.5).abs() < 1e-12);
    assert!((exact_advancement(Record::new(2, 2)) - 0.5).abs() < 1e-12);
    assert!((exact_advancement(Record::new(2, 0)) - 0.875).abs() < 1e-12);
    assert!((exact_advancement(Record::new(0, 2)) - 0.125).abs() < 1e-12);
    assert_eq!(exact_advancement(Record::new(3, 1)), 1.0);
}

#[test]
fn test_rates_sum_to_one() {
    let mut rng = StdRng::seed_from_u64(42);
    for (w, l) in [(0, 0), (1, 2), (2, 1), (2, 2)] {
        let odds = simulate_advancement(&team_at(w, l), 500, &mut rng).unwrap();
        assert!((odds.qualify_rate + odds.eliminate_rate - 1.0).abs() < 1e-12);
        assert!(odds.sampled);
        assert_eq!(odds.assumption, Assumption::IndependentFairCoin);
    }
}

#[test]
fn test_converges_to_exact_from_start() {
    let mut rng = StdRng::seed_from_u64(2025);
    let odds = simulate_advancement(&team_at(0, 0), 20_000, &mut rng).unwrap();
    // Standard error is about 0.0035 at this trial count
    assert!((odds.qualify_rate - 0.5).abs() < 0.02, "got {}", odds.qualify_rate);
}

#[test]
fn test_converges_to_exact_for_every_active_record() {
    let mut rng = StdRng::seed_from_u64(7);
    for record in Record::all_active() {
        let odds = simulate_advancement(&team_at(record.wins, record.losses), 10_000, &mut rng).unwrap();
        let exact = exact_advancement(record);
        assert!(
            (odds.qualify_rate - exact).abs() < 0.03,
            "{}: simulated {} vs exact {}",
            record,
            odds.qualify_rate,
            exact
        );
    }
}

#[test]
fn test_more_wins_never_hurts() {
    for losses in 0..3 {
        for wins in 0..2 {
            assert!(
                exact_advancement(Record::new(wins + 1, losses)) >= exact_advancement(Record::new(wins, losses))
            );
        }
    }

    let mut rng = StdRng::seed_from_u64(99);
    let low = simulate_advancement(&team_at(0, 1), 10_000, &mut rng).unwrap();
    let high = simulate_advancement(&team_at(2, 1), 10_000, &mut rng).unwrap();
    assert!(high.qualify_rate > low.qualify_rate);
}

#[test]
fn test_finished_teams_are_not_sampled() {
    let mut rng = StdRng::seed_from_u64(1);

    let qualified = simulate_advancement(&team_at(3, 1), 10, &mut rng).unwrap();
    assert_eq!((qualified.qualify_rate, qualified.eliminate_rate), (1.0, 0.0));
    assert!(!qualified.sampled);

    let eliminated = simulate_advancement(&team_at(2, 3), 10, &mut rng).unwrap();
    assert_eq!((eliminated.qualify_rate, eliminated.eliminate_rate), (0.0, 1.0));
}

#[test]
fn test_zero_trials_is_rejected() {
    let stage = SwissStage::with_teams(&["A"]);
    let mut rng = StdRng::seed_from_u64(1);
    assert!(matches!(
        simulate_advancement(&stage.teams[0], 0, &mut rng),
        Err(OddsError::InvalidTrials)
    ));
}

#[test]
fn test_simulation_does_not_touch_team() {
    let team = team_at(1, 1);
    let before = team.clone();
    let mut rng = StdRng::seed_from_u64(5);
    simulate_advancement(&team, 100, &mut rng).unwrap();
    assert_eq!(team, before);
}
