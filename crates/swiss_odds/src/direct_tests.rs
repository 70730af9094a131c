use super::*;
use swiss_core::SwissStage;

fn fresh(names: &[&str]) -> SwissStage {
    SwissStage::with_teams(names)
}

#[test]
fn test_complete_four_is_one_third() {
    let stage = fresh(&["A", "B", "C", "D"]);
    let bucket: Vec<&Team> = stage.teams.iter().collect();

    let odds = direct_probability("A", "B", &bucket);
    assert_eq!(odds.total_pairings, 3);
    assert_eq!(odds.favorable_pairings, 1);
    assert!((odds.probability - 1.0 / 3.0).abs() < 1e-12);
    assert!(odds.blocked.is_none());
}

#[test]
fn test_symmetric() {
    let mut stage = fresh(&["A", "B", "C", "D", "E", "F"]);
    stage.apply_result("A", "C").unwrap();
    stage.apply_result("B", "D").unwrap();
    stage.apply_result("E", "F").unwrap();
    let bucket: Vec<&Team> = stage.teams.iter().collect();

    let ab = direct_probability("A", "B", &bucket);
    let ba = direct_probability("B", "A", &bucket);
    assert_eq!(ab.probability, ba.probability);
    assert_eq!(ab.total_pairings, ba.total_pairings);
}

#[test]
fn test_rematch_has_reason_not_ratio() {
    let mut stage = fresh(&["A", "B", "C", "D"]);
    stage.apply_result("A", "B").unwrap();
    let bucket: Vec<&Team> = stage.teams.iter().collect();

    let odds = direct_probability("A", "B", &bucket);
    assert_eq!(odds.probability, 0.0);
    assert_eq!(odds.blocked, Some(Blocker::AlreadyPlayed));

    // The rest of the bucket still pairs
    let other = direct_probability("A", "C", &bucket);
    assert_eq!(other.total_pairings, 2);
    assert!((other.probability - 0.5).abs() < 1e-12);
}

#[test]
fn test_forced_pair_is_certain() {
    // A has met C and D, so A must take B
    let mut stage = fresh(&["A", "B", "C", "D"]);
    stage.apply_result("A", "C").unwrap();
    stage.apply_result("D", "A").unwrap();
    let bucket: Vec<&Team> = stage.teams.iter().collect();

    let odds = direct_probability("A", "B", &bucket);
    assert_eq!(odds.total_pairings, 1);
    assert_eq!(odds.probability, 1.0);
}

#[test]
fn test_odd_bucket_is_infeasible() {
    let stage = fresh(&["A", "B", "C"]);
    let bucket: Vec<&Team> = stage.teams.iter().collect();

    let odds = direct_probability("A", "B", &bucket);
    assert_eq!(odds.probability, 0.0);
    assert_eq!(
        odds.blocked,
        Some(Blocker::Infeasible {
            reason: Infeasibility::OddBucket { size: 3 }
        })
    );
}

#[test]
fn test_unpairable_bucket_is_distinct_from_rematch() {
    // C, D, E and F have all met each other
    let mut stage = fresh(&["A", "B", "C", "D", "E", "F"]);
    for (w, l) in [("C", "D"), ("E", "F"), ("C", "E"), ("D", "F"), ("C", "F"), ("D", "E")] {
        stage.apply_result(w, l).unwrap();
    }
    let bucket: Vec<&Team> = stage.teams.iter().collect();

    // A and B have not played, but two of C, D, E and F would have to meet
    let odds = direct_probability("A", "B", &bucket);
    assert_eq!(
        odds.blocked,
        Some(Blocker::Infeasible {
            reason: Infeasibility::NoValidPairing
        })
    );
}

#[test]
fn test_team_outside_bucket() {
    let stage = fresh(&["A", "B", "C", "D"]);
    let bucket: Vec<&Team> = stage.teams.iter().take(2).collect();

    let odds = direct_probability("A", "C", &bucket);
    assert_eq!(
        odds.blocked,
        Some(Blocker::InvalidState {
            team: "C".to_string()
        })
    );
    assert_eq!(direct_probability("A", "A", &bucket).blocked, Some(Blocker::SameTeam));
}
