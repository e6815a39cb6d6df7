//! Word storage backends.
//!
//! Two interchangeable backends sit behind the [`WordStore`] trait: a
//! line-delimited file ([`FileStore`]) and a SQLite table
//! ([`SqliteStore`]). Anything implementing the trait is substitutable —
//! the trainer and the session registry only ever see `dyn WordStore`.
//!
//! Invariants shared by every backend:
//! - a word's text is unique across the store,
//! - words keep their insertion order, including across replacing imports,
//! - every mutation is persisted synchronously before the call returns.

mod file;
mod sqlite;

pub use file::FileStore;
pub use sqlite::SqliteStore;

use std::path::Path;

use crate::error::{CoreError, Result};
use crate::word::Word;

/// Consecutive correct answers after which a word counts as learned,
/// unless the configuration overrides it.
pub const DEFAULT_LEARNING_THRESHOLD: u32 = 3;

/// Capability contract shared by the file and table backends.
pub trait WordStore: Send {
    /// Number of words in the store.
    fn size(&self) -> Result<usize>;

    /// Number of words at or above the learning threshold.
    fn learned_count(&self) -> Result<usize>;

    /// Words at or above the learning threshold, in insertion order.
    fn learned_words(&self) -> Result<Vec<Word>>;

    /// Words below the learning threshold, in insertion order.
    fn unlearned_words(&self) -> Result<Vec<Word>>;

    /// Overwrite the streak of an existing word.
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::WordNotFound`] if `word` is absent. Both
    /// backends fail explicitly here so they cannot diverge on unknown
    /// words.
    fn record_answer(&mut self, word: &str, new_streak: u32) -> Result<()>;

    /// Set every word's streak back to 0.
    fn reset_progress(&mut self) -> Result<()>;

    /// Import `text|translation[|streak]` lines.
    ///
    /// Lines with fewer than two fields are skipped; a missing or
    /// unparseable streak defaults to 0. A duplicate word replaces the
    /// earlier entry in place, so re-importing a refreshed list updates
    /// rather than duplicates. The import is atomic: on failure the store
    /// keeps its pre-import contents.
    ///
    /// Returns the number of lines applied.
    fn import_bulk(&mut self, lines: &[String]) -> Result<usize>;

    /// Insert or replace a single word.
    fn add_word(&mut self, word: &Word) -> Result<()>;

    /// Delete a word, reporting whether it existed.
    fn remove_word(&mut self, word: &str) -> Result<bool>;

    /// Remove every word.
    fn clear(&mut self) -> Result<()>;

    /// Read `path` and import its lines via [`WordStore::import_bulk`].
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::SourceMissing`] if the path does not exist;
    /// the store is left untouched.
    fn import_file(&mut self, path: &Path) -> Result<usize> {
        if !path.exists() {
            return Err(CoreError::SourceMissing(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let lines: Vec<String> = content.lines().map(str::to_owned).collect();
        self.import_bulk(&lines)
    }
}

/// Replace `word` in place if its text is already present, append otherwise.
///
/// In-place replacement keeps insertion order stable across re-imports.
fn upsert(words: &mut Vec<Word>, word: Word) {
    match words.iter_mut().find(|w| w.text == word.text) {
        Some(existing) => *existing = word,
        None => words.push(word),
    }
}
