//! Core vocabulary types shared by the stores and the quiz engine.

use serde::{Deserialize, Serialize};

/// A single dictionary entry: the word being learned, its translation, and
/// how many times in a row it has been answered correctly.
///
/// A word is uniquely identified by [`Word::text`] within a store. The
/// streak is mutated only by grading (increment) or a progress reset (zero).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// The word being learned.
    pub text: String,
    /// Its translation, shown on the answer buttons.
    pub translation: String,
    /// Consecutive correct answers so far.
    pub streak: u32,
}

impl Word {
    /// Create an entry with a zero streak.
    #[must_use]
    pub fn new(text: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            translation: translation.into(),
            streak: 0,
        }
    }

    /// Parse one `text|translation[|streak]` line.
    ///
    /// Returns `None` for lines with fewer than two pipe-delimited fields.
    /// A missing or unparseable streak field defaults to 0. Fields are
    /// trimmed.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.split('|');
        let text = fields.next()?.trim();
        let translation = fields.next()?.trim();
        let streak = fields
            .next()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(0);

        Some(Self {
            text: text.to_owned(),
            translation: translation.to_owned(),
            streak,
        })
    }

    /// Serialize back to the pipe-delimited save format.
    ///
    /// `parse_line(to_line(w)) == w`, so a saved file round-trips through
    /// import exactly.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!("{}|{}|{}", self.text, self.translation, self.streak)
    }

    /// Whether this word counts as learned under `threshold`.
    #[must_use]
    pub fn is_learned(&self, threshold: u32) -> bool {
        self.streak >= threshold
    }
}

/// One multiple-choice quiz turn.
///
/// Holds the four answer options and the position of the correct one.
/// Created per turn by the trainer, discarded once graded or replaced —
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    variants: Vec<Word>,
    correct_index: usize,
}

impl Question {
    pub(crate) fn new(variants: Vec<Word>, correct_index: usize) -> Self {
        debug_assert!(correct_index < variants.len());
        Self {
            variants,
            correct_index,
        }
    }

    /// The answer options, in presentation order.
    #[must_use]
    pub fn variants(&self) -> &[Word] {
        &self.variants
    }

    /// Position of the correct answer within [`Question::variants`].
    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    /// The word being asked.
    #[must_use]
    pub fn correct(&self) -> &Word {
        &self.variants[self.correct_index]
    }
}

/// Aggregate learning progress, derived from a store at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    /// Words at or above the learning threshold.
    pub learned: usize,
    /// Total words in the store.
    pub total: usize,
    /// `round(100 * learned / total)`, 0 for an empty store.
    pub percent: u32,
}

impl Statistics {
    /// Compute statistics from the two counts.
    #[must_use]
    pub fn compute(learned: usize, total: usize) -> Self {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = if total == 0 {
            0
        } else {
            (100.0 * learned as f64 / total as f64).round() as u32
        };
        Self {
            learned,
            total,
            percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_line() {
        let word = Word::parse_line("apple|яблоко|2").expect("parse");
        assert_eq!(word.text, "apple");
        assert_eq!(word.translation, "яблоко");
        assert_eq!(word.streak, 2);
    }

    #[test]
    fn parse_defaults_missing_streak_to_zero() {
        let word = Word::parse_line("bread|хлеб").expect("parse");
        assert_eq!(word.streak, 0);

        let word = Word::parse_line("bread|хлеб|not-a-number").expect("parse");
        assert_eq!(word.streak, 0);
    }

    #[test]
    fn parse_rejects_short_lines() {
        assert!(Word::parse_line("").is_none());
        assert!(Word::parse_line("loner").is_none());
    }

    #[test]
    fn parse_trims_fields() {
        let word = Word::parse_line(" cat | кот | 1 ").expect("parse");
        assert_eq!(word.text, "cat");
        assert_eq!(word.translation, "кот");
        assert_eq!(word.streak, 1);
    }

    #[test]
    fn line_round_trip() {
        let word = Word {
            text: "dog".into(),
            translation: "собака".into(),
            streak: 3,
        };
        assert_eq!(Word::parse_line(&word.to_line()), Some(word));
    }

    #[test]
    fn statistics_rounding() {
        assert_eq!(Statistics::compute(1, 3).percent, 33);
        assert_eq!(Statistics::compute(2, 3).percent, 67);
        assert_eq!(Statistics::compute(1, 2).percent, 50);
        assert_eq!(Statistics::compute(4, 4).percent, 100);
    }

    #[test]
    fn statistics_empty_store_is_zero_percent() {
        let stats = Statistics::compute(0, 0);
        assert_eq!(stats.percent, 0);
    }
}
