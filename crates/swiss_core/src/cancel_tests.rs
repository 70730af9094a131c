use super::*;
use std::thread;

#[test]
fn test_manual_cancel_is_shared_between_clones() {
    let token = CancelToken::unlimited();
    let worker = token.clone();
    assert!(!worker.check());

    token.cancel();
    assert!(worker.is_cancelled());
    assert!(worker.check());
}

#[test]
fn test_deadline_expiry() {
    let token = CancelToken::new(Some(Duration::from_millis(10)));
    token.start();
    assert!(!token.is_cancelled());

    thread::sleep(Duration::from_millis(20));
    assert!(token.check());
    assert!(token.is_cancelled());
    assert_eq!(token.remaining(), Some(Duration::ZERO));
}

#[test]
fn test_deadline_needs_start() {
    let token = CancelToken::new(Some(Duration::from_millis(1)));
    thread::sleep(Duration::from_millis(5));
    assert!(!token.check());
}

#[test]
fn test_no_limit_never_expires() {
    let token = CancelToken::default();
    token.start();
    thread::sleep(Duration::from_millis(5));
    assert!(!token.check());
    assert_eq!(token.remaining(), None);
}

#[test]
fn test_start_clears_previous_stop() {
    let token = CancelToken::unlimited();
    token.cancel();
    token.start();
    assert!(!token.is_cancelled());
}
