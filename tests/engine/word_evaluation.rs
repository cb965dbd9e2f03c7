use gamehall::engine::{
    evaluate_guess, normalize_guess, GuessLog, GuessRecord, LetterStatus, WordGameState,
};

fn statuses(guess: &str, target: &str) -> Vec<LetterStatus> {
    evaluate_guess(guess, target).iter().map(|s| s.status).collect()
}

#[test]
fn test_exact_guess_all_correct() {
    assert_eq!(statuses("crane", "crane"), vec![LetterStatus::Correct; 5]);
}

#[test]
fn test_disjoint_guess_all_absent() {
    assert_eq!(statuses("fight", "crane"), vec![LetterStatus::Absent; 5]);
}

#[test]
fn test_misplaced_letters_present() {
    use LetterStatus::*;
    assert_eq!(statuses("nacre", "crane"), vec![Present, Present, Present, Present, Correct]);
}

#[test]
fn test_duplicate_letters_not_overcounted() {
    use LetterStatus::*;
    // One 'l' in the target: the exact match claims it
    assert_eq!(statuses("hello", "world"), vec![Absent, Absent, Absent, Correct, Present]);
    assert_eq!(statuses("lllll", "world"), vec![Absent, Absent, Absent, Correct, Absent]);
}

#[test]
fn test_normalised_before_evaluation() {
    let game = WordGameState::new("Crane", 6).unwrap();
    assert_eq!(game.target(), "crane");
    assert!(game.is_target(&normalize_guess("  CRANE ")));
}

#[test]
fn test_invalid_targets_refused() {
    assert!(WordGameState::new("cranes", 6).is_err());
    assert!(WordGameState::new("cr4ne", 6).is_err());
    assert!(WordGameState::new("crane", 0).is_err());
}

#[test]
fn test_guess_log_attempts() {
    let log = GuessLog::from_records(vec![
        GuessRecord {
            attempt_number: 2,
            guess: "beach".to_string(),
            created_at: 2,
        },
        GuessRecord {
            attempt_number: 1,
            guess: "apple".to_string(),
            created_at: 1,
        },
    ]);

    assert_eq!(log.attempts_used(), 2);
    assert_eq!(log.next_attempt(), 3);
    assert_eq!(log.latest().map(|g| g.guess.as_str()), Some("beach"));
    assert!(log.check_integrity(6).is_ok());
    assert!(log.check_integrity(1).is_err());
}
