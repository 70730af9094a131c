use super::*;
use swiss_core::MatchKey;

/// A-P and C-D at 1-0, B-Q and E-F at 0-1, all four matches pending
fn round_two() -> SwissStage {
    let mut stage = SwissStage::with_teams(&["A", "P", "C", "D", "B", "Q", "E", "F"]);
    for (w, l) in [("A", "E"), ("P", "F"), ("C", "B"), ("D", "Q")] {
        stage.apply_result(w, l).unwrap();
    }
    for (x, y) in [("A", "P"), ("C", "D"), ("B", "Q"), ("E", "F")] {
        stage.schedule(x, y).unwrap();
    }
    stage.round = 2;
    stage
}

fn probabilities() -> WinProbabilities {
    WinProbabilities::new()
        .with("C", "D", 0.6)
        .unwrap()
        .with("E", "F", 0.7)
        .unwrap()
}

fn config() -> OddsConfig {
    OddsConfig {
        parallel: false,
        seed: Some(11),
        trials: 2_000,
        ..Default::default()
    }
}

#[test]
fn test_rejects_inconsistent_stage() {
    let mut stage = SwissStage::with_teams(&["A", "B"]);
    stage.teams[0].played.insert("B".to_string());
    assert!(MatchupCalculator::new(&stage, config()).is_err());
}

#[test]
fn test_blocked_before_any_computation() {
    let mut stage = round_two();
    stage.teams.push(Team::new("X"));
    for opponent in ["Y1", "Y2", "Y3"] {
        stage.teams.push(Team::new(opponent));
    }
    // X goes 3-0 against the Y teams, who are left 0-1
    for opponent in ["Y1", "Y2", "Y3"] {
        stage.apply_result("X", opponent).unwrap();
    }
    let calc = MatchupCalculator::new(&stage, config()).unwrap();

    let blocker = |a: &str, b: &str| calc.matchup(a, b, None).unwrap().blocker().cloned();
    assert_eq!(blocker("A", "Z"), Some(Blocker::NotFound { team: "Z".to_string() }));
    assert_eq!(blocker("A", "A"), Some(Blocker::SameTeam));
    assert_eq!(blocker("A", "X"), Some(Blocker::Inactive { team: "X".to_string() }));
    assert_eq!(blocker("A", "E"), Some(Blocker::AlreadyPlayed));
    assert_eq!(calc.matchup("E", "A", None).unwrap().probability(), 0.0);
}

#[test]
fn test_scheduled_match_is_certain() {
    let stage = round_two();
    let calc = MatchupCalculator::new(&stage, config()).unwrap();

    let odds = calc.matchup("A", "P", None).unwrap();
    assert_eq!(odds, MatchupOdds::Scheduled);
    assert_eq!(odds.probability(), 1.0);
    assert_eq!(calc.matchup("P", "A", None).unwrap(), MatchupOdds::Scheduled);
}

#[test]
fn test_settled_same_record_uses_direct_ratio() {
    let stage = SwissStage::with_teams(&["A", "B", "C", "D"]);
    let calc = MatchupCalculator::new(&stage, config()).unwrap();

    let odds = calc.matchup("A", "B", None).unwrap();
    assert!(matches!(odds, MatchupOdds::Direct(_)));
    assert!((odds.probability() - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_different_records_use_scenarios() {
    let stage = round_two();
    let calc = MatchupCalculator::new(&stage, config()).unwrap();
    let probs = probabilities();

    let odds = calc.matchup("A", "B", Some(&probs)).unwrap();
    match &odds {
        MatchupOdds::Scenarios(report) => assert_eq!(report.scenarios.len(), 4),
        other => panic!("expected scenarios, got {:?}", other),
    }
    assert!((odds.probability() - 0.47).abs() < 1e-9);

    let unknown = calc.matchup("A", "B", None).unwrap();
    assert!(unknown.needs_input());
    assert_eq!(unknown.probability(), 0.0);
}

#[test]
fn test_committed_same_record_teams_look_ahead() {
    let stage = round_two();
    let calc = MatchupCalculator::new(&stage, config()).unwrap();

    // Both 1-0 but still playing: they can only meet at 2-0, alone there
    let odds = calc.matchup("A", "C", None).unwrap();
    match &odds {
        MatchupOdds::Scenarios(report) => {
            assert_eq!(report.target, Some(swiss_core::Record::new(2, 0)));
            assert!(report.impact_matches.is_empty());
        }
        other => panic!("expected scenarios, got {:?}", other),
    }
    assert_eq!(odds.probability(), 1.0);
}

#[test]
fn test_all_matchups_lists_reachable_opponents() {
    let stage = round_two();
    let calc = MatchupCalculator::new(&stage, config()).unwrap();
    let probs = probabilities();

    let rows = calc.all_matchups("A", Some(&probs)).unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.opponent.as_str()).collect();
    assert_eq!(names, vec!["P", "C", "D", "B", "Q", "F"]);

    let by_name = |n: &str| rows.iter().find(|r| r.opponent == n).unwrap().probability;
    assert_eq!(by_name("P"), 1.0);
    assert_eq!(by_name("C"), 1.0);
    assert!((by_name("B") - 0.47).abs() < 1e-9);
    assert!((by_name("Q") - 0.48).abs() < 1e-9);

    // Without probabilities the cross-bucket rows stay, flagged for input
    let rows = calc.all_matchups("A", None).unwrap();
    assert_eq!(rows.len(), 6);
    assert!(rows.iter().filter(|r| r.odds.needs_input()).count() >= 3);
}

#[test]
fn test_all_matchups_for_missing_or_finished_team() {
    let stage = round_two();
    let calc = MatchupCalculator::new(&stage, config()).unwrap();
    assert!(calc.all_matchups("Nobody", None).unwrap().is_empty());
}

#[test]
fn test_impact_cap_comes_from_config() {
    let stage = round_two();
    let calc = MatchupCalculator::new(
        &stage,
        OddsConfig {
            max_impact_matches: 1,
            ..config()
        },
    )
    .unwrap();

    let err = calc.matchup("A", "B", Some(&probabilities())).unwrap_err();
    assert!(matches!(err, OddsError::TooManyImpactMatches { count: 2, limit: 1 }));
}

#[test]
fn test_advancement_uses_config_seed() {
    let stage = round_two();
    let calc = MatchupCalculator::new(&stage, config()).unwrap();

    let first = calc.advancement("A").unwrap();
    let second = calc.advancement("A").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.trials, 2_000);
    // 1-0 under fair coins: exactly 11/16
    assert!((first.qualify_rate - 0.6875).abs() < 0.04);

    assert!(matches!(
        calc.advancement("Nobody"),
        Err(OddsError::Stage(StageError::UnknownTeam(_)))
    ));
}

#[test]
fn test_serialized_odds_name_their_method() {
    let stage = round_two();
    let calc = MatchupCalculator::new(&stage, config()).unwrap();

    let json = serde_json::to_value(calc.matchup("A", "P", None).unwrap()).unwrap();
    assert_eq!(json["method"], "scheduled");

    let json = serde_json::to_value(calc.matchup("A", "B", None).unwrap()).unwrap();
    assert_eq!(json["method"], "scenarios");
    assert_eq!(json["blocked"]["kind"], "input_required");
    assert_eq!(
        json["blocked"]["matches"][0],
        serde_json::to_value(MatchKey::new("C", "D")).unwrap()
    );
}
