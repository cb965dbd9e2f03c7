use super::error::IntegrityViolation;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const WORD_LENGTH: usize = 5;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Targets used when no word list is configured
pub const DEFAULT_WORDS: &[&str] = &[
    "apple", "beach", "chair", "dance", "eagle", "flame", "grape", "house", "igloo", "juice",
    "knife", "lemon", "mouse", "night", "ocean", "piano", "queen", "river", "snake", "table",
    "uncle", "virus", "water", "xenon", "yacht", "zebra",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterStatus {
    /// Right letter in the right position
    Correct,
    /// Letter occurs elsewhere in the target
    Present,
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterScore {
    pub letter: char,
    pub status: LetterStatus,
}

/// Trim and lowercase a submitted guess
pub fn normalize_guess(guess: &str) -> String {
    guess.trim().to_lowercase()
}

/// Score each letter of `guess` against `target`.
///
/// Exact matches are marked first. A misplaced letter is then marked present
/// only while the target still has an unmatched occurrence of it, so a letter
/// guessed twice but present once is reported once.
pub fn evaluate_guess(guess: &str, target: &str) -> Vec<LetterScore> {
    let guess: Vec<char> = guess.chars().collect();
    let target: Vec<char> = target.chars().collect();

    let mut statuses = vec![LetterStatus::Absent; guess.len()];
    let mut unmatched: HashMap<char, usize> = HashMap::new();

    for (i, &letter) in guess.iter().enumerate() {
        match target.get(i) {
            Some(&t) if t == letter => statuses[i] = LetterStatus::Correct,
            Some(&t) => *unmatched.entry(t).or_insert(0) += 1,
            None => {}
        }
    }
    // Target letters past the end of a short guess are still available
    for &t in target.iter().skip(guess.len()) {
        *unmatched.entry(t).or_insert(0) += 1;
    }

    for (i, &letter) in guess.iter().enumerate() {
        if statuses[i] == LetterStatus::Correct {
            continue;
        }
        if let Some(count) = unmatched.get_mut(&letter) {
            if *count > 0 {
                *count -= 1;
                statuses[i] = LetterStatus::Present;
            }
        }
    }

    guess
        .into_iter()
        .zip(statuses)
        .map(|(letter, status)| LetterScore { letter, status })
        .collect()
}

/// One recorded attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRecord {
    pub attempt_number: u32,
    pub guess: String,
    pub created_at: i64,
}

/// A single player's guesses, ordered by attempt number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessLog {
    records: Vec<GuessRecord>,
}

impl GuessLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(mut records: Vec<GuessRecord>) -> Self {
        records.sort_by_key(|r| r.attempt_number);
        Self { records }
    }

    pub fn attempts_used(&self) -> u32 {
        self.records.len() as u32
    }

    /// Attempt number the next accepted guess will receive
    pub fn next_attempt(&self) -> u32 {
        self.attempts_used() + 1
    }

    pub fn latest(&self) -> Option<&GuessRecord> {
        self.records.last()
    }

    pub fn records(&self) -> &[GuessRecord] {
        &self.records
    }

    pub fn push(&mut self, record: GuessRecord) {
        self.records.push(record);
    }

    /// Attempt numbers must run 1..=k without gaps and never pass `max_attempts`
    pub fn check_integrity(&self, max_attempts: u32) -> Result<(), IntegrityViolation> {
        for (i, record) in self.records.iter().enumerate() {
            let expected = i as u32 + 1;
            if record.attempt_number != expected {
                return Err(IntegrityViolation::new(format!(
                    "Attempt {} recorded where attempt {} was expected",
                    record.attempt_number, expected
                )));
            }
        }

        if self.attempts_used() > max_attempts {
            return Err(IntegrityViolation::new(format!(
                "{} attempts recorded, limit is {}",
                self.attempts_used(),
                max_attempts
            )));
        }

        Ok(())
    }
}

/// Shared word-game settings for a session.
///
/// The target is never part of an event or a public view while the session
/// is running; `Debug` output redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct WordGameState {
    target: String,
    pub max_attempts: u32,
}

impl WordGameState {
    pub fn new(target: &str, max_attempts: u32) -> Result<Self, IntegrityViolation> {
        let target = normalize_guess(target);
        if !is_valid_word(&target) {
            return Err(IntegrityViolation::new(format!(
                "Target must be {} letters a-z",
                WORD_LENGTH
            )));
        }
        if max_attempts == 0 {
            return Err(IntegrityViolation::new("Max attempts must be at least 1"));
        }

        Ok(Self {
            target,
            max_attempts,
        })
    }

    /// Pick a target uniformly from `words`, falling back to the built-in list
    pub fn random<R: Rng + ?Sized>(words: &[String], max_attempts: u32, rng: &mut R) -> Self {
        let candidates: Vec<String> = words
            .iter()
            .map(|w| normalize_guess(w))
            .filter(|w| is_valid_word(w))
            .collect();

        let target = match candidates.choose(rng) {
            Some(word) => word.clone(),
            None => DEFAULT_WORDS
                .choose(rng)
                .map(|w| w.to_string())
                .unwrap_or_else(|| DEFAULT_WORDS[0].to_string()),
        };

        Self {
            target,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn evaluate(&self, guess: &str) -> Vec<LetterScore> {
        evaluate_guess(guess, &self.target)
    }

    pub fn is_target(&self, guess: &str) -> bool {
        guess == self.target
    }
}

impl fmt::Debug for WordGameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordGameState")
            .field("target", &"*****")
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

fn is_valid_word(word: &str) -> bool {
    word.chars().count() == WORD_LENGTH && word.chars().all(|c| c.is_ascii_lowercase())
}
