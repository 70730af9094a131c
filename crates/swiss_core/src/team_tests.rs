use super::*;

#[test]
fn test_add_result_updates_record_and_played() {
    let mut team = Team::new("GEN");
    team.add_result("PSG", Outcome::Won);
    team.add_result("AL", Outcome::Lost);
    team.add_result("TES", Outcome::Pending);

    assert_eq!(team.record(), Record::new(1, 1));
    assert!(team.has_played("PSG"));
    assert!(team.has_played("AL"));
    assert!(!team.has_played("TES"));
    assert_eq!(team.pending_opponent(), Some("TES"));
}

#[test]
fn test_resolve_pending() {
    let mut team = Team::new("GEN");
    team.add_result("TES", Outcome::Pending);

    assert!(team.resolve_pending(true));
    assert_eq!(team.record(), Record::new(1, 0));
    assert!(team.has_played("TES"));
    assert_eq!(team.pending_opponent(), None);

    // Nothing left to resolve
    assert!(!team.resolve_pending(false));
    assert_eq!(team.record(), Record::new(1, 0));
}

#[test]
fn test_can_play_respects_history() {
    let mut a = Team::new("A");
    let b = Team::new("B");
    let c = Team::new("C");
    a.add_result("B", Outcome::Won);

    assert!(!a.can_play(&b));
    assert!(a.can_play(&c));
    assert!(!a.can_play(&a.clone()));
}

#[test]
fn test_status_transitions() {
    let mut team = Team::new("KT");
    for opp in ["MKOI", "TSW", "TES"] {
        assert!(team.is_active());
        team.add_result(opp, Outcome::Won);
    }
    assert!(team.is_qualified());
    assert!(!team.is_eliminated());
    assert_eq!(team.derived_record(), team.record());
}

#[test]
fn test_long_history_saturates_record() {
    let mut team = Team::new("GEN");
    for i in 0..300 {
        team.add_result(&format!("T{}", i), Outcome::Won);
    }
    assert_eq!(team.wins, u8::MAX);
    assert_eq!(team.derived_record(), Record::new(u8::MAX, 0));
}
