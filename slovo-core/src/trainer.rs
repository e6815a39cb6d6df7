//! Quiz engine: question selection, grading, and progress statistics.
//!
//! One [`Trainer`] exists per chat session and owns that chat's word
//! store. Its state machine is small: no outstanding question → question
//! pending → back to none once graded. When every word in the store is
//! learned, [`Trainer::next_question`] returns `None`.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::Result;
use crate::store::WordStore;
use crate::word::{Question, Statistics, Word};

/// Number of answer options offered per question.
pub const VARIANT_COUNT: usize = 4;

/// Multiple-choice quiz engine over a single word store.
pub struct Trainer {
    store: Box<dyn WordStore>,
    current: Option<Question>,
}

impl std::fmt::Debug for Trainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trainer")
            .field("question_pending", &self.current.is_some())
            .finish_non_exhaustive()
    }
}

impl Trainer {
    /// Create a trainer over `store`.
    #[must_use]
    pub fn new(store: Box<dyn WordStore>) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// The underlying store, for word management and imports.
    pub fn store_mut(&mut self) -> &mut dyn WordStore {
        self.store.as_mut()
    }

    /// The outstanding question, if one is pending.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    /// Select the next question, or `None` when every word is learned.
    ///
    /// The word asked is drawn uniformly from the unlearned subset. The
    /// three distractors are distinct words from the rest of the store,
    /// any mastery level; a store with fewer than four words pads the
    /// options by repetition so there are always [`VARIANT_COUNT`] of
    /// them. The correct answer lands at a uniformly random position.
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub fn next_question(&mut self) -> Result<Option<Question>> {
        let mut rng = rand::thread_rng();

        let unlearned = self.store.unlearned_words()?;
        let Some(correct) = unlearned.choose(&mut rng).cloned() else {
            self.current = None;
            debug!("no unlearned words left");
            return Ok(None);
        };

        let mut options: Vec<Word> = unlearned
            .iter()
            .filter(|w| w.text != correct.text)
            .cloned()
            .chain(self.store.learned_words()?)
            .collect();
        options.shuffle(&mut rng);
        options.truncate(VARIANT_COUNT - 1);
        while options.len() < VARIANT_COUNT - 1 {
            let filler = options.last().cloned().unwrap_or_else(|| correct.clone());
            options.push(filler);
        }

        let correct_index = rng.gen_range(0..VARIANT_COUNT);
        options.insert(correct_index, correct);

        let question = Question::new(options, correct_index);
        self.current = Some(question.clone());
        Ok(Some(question))
    }

    /// Grade the outstanding question against `choice`.
    ///
    /// Returns `true` and bumps the word's streak only when `choice`
    /// matches the correct position. A wrong, missing, or out-of-range
    /// choice returns `false` and leaves every streak unchanged. Either
    /// way the outstanding question is cleared, so a replayed answer
    /// cannot be double-counted; with no question pending this is a no-op
    /// returning `false`.
    ///
    /// # Errors
    ///
    /// Propagates store write failures.
    pub fn submit_answer(&mut self, choice: Option<usize>) -> Result<bool> {
        let Some(question) = self.current.take() else {
            return Ok(false);
        };
        if choice != Some(question.correct_index()) {
            return Ok(false);
        }

        let word = question.correct();
        self.store.record_answer(&word.text, word.streak + 1)?;
        debug!(word = %word.text, streak = word.streak + 1, "correct answer recorded");
        Ok(true)
    }

    /// Learning progress, computed fresh from the store.
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub fn statistics(&self) -> Result<Statistics> {
        let total = self.store.size()?;
        let learned = self.store.learned_count()?;
        Ok(Statistics::compute(learned, total))
    }

    /// Zero every streak and clear the outstanding question.
    ///
    /// # Errors
    ///
    /// Propagates store write failures.
    pub fn reset_progress(&mut self) -> Result<()> {
        self.current = None;
        self.store.reset_progress()
    }
}
