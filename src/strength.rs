//! Password strength estimate used as a gate before encrypting.
//!
//! This is a coarse heuristic over length and character classes, not an
//! entropy estimate. It never influences the container itself.

use std::fmt;

use serde::Serialize;

/// Minimum number of characters an acceptable password must have.
pub const MIN_PASSWORD_CHARS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Weak,
    Fair,
    Good,
    Strong,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::Weak => "Weak",
            Level::Fair => "Fair",
            Level::Good => "Good",
            Level::Strong => "Strong",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Strength {
    score: u8,
    level: Level,
    chars: usize,
}

impl Strength {
    /// Score from 0 to 100.
    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Long enough and at least [`Level::Good`].
    pub fn is_acceptable(&self) -> bool {
        self.chars >= MIN_PASSWORD_CHARS && self.level >= Level::Good
    }
}

pub fn estimate(password: &str) -> Strength {
    let chars = password.chars().count();
    let mut score = 0u8;

    if chars >= 8 {
        score += 20;
    }
    if chars >= 12 {
        score += 20;
    }
    if chars >= 16 {
        score += 10;
    }

    if password.chars().any(|c| c.is_ascii_lowercase()) {
        score += 10;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 10;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 15;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 15;
    }

    let level = match score {
        0..30 => Level::Weak,
        30..50 => Level::Fair,
        50..70 => Level::Good,
        _ => Level::Strong,
    };

    Strength {
        score,
        level,
        chars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_password_scores_zero() {
        let s = estimate("");
        assert_eq!(s.score(), 0);
        assert_eq!(s.level(), Level::Weak);
        assert!(!s.is_acceptable());
    }

    #[test]
    fn all_classes_and_length_score_full() {
        let s = estimate("CorrectHorseBatteryStaple!1");
        assert_eq!(s.score(), 100);
        assert_eq!(s.level(), Level::Strong);
        assert!(s.is_acceptable());
    }

    #[test]
    fn short_passwords_are_rejected_even_if_varied() {
        // 8 chars + all four classes = 70
        let s = estimate("aB3$eF7!");
        assert_eq!(s.level(), Level::Strong);
        assert!(!s.is_acceptable());
    }

    #[test]
    fn long_lowercase_only_is_good() {
        // 20 + 20 + 10 + 10
        let s = estimate("abcdefghijklmnopqrst");
        assert_eq!(s.score(), 60);
        assert_eq!(s.level(), Level::Good);
        assert!(s.is_acceptable());
    }

    #[test]
    fn level_boundaries() {
        // 8 lowercase: 20 + 10
        assert_eq!(estimate("abcdefgh").level(), Level::Fair);
        // 3 lowercase: 10
        assert_eq!(estimate("abc").level(), Level::Weak);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let s = estimate("ééééééééééé");
        assert_eq!(s.score(), 20 + 15);
    }
}
