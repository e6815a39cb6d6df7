//! Line-delimited file backend.
//!
//! The save format is the import format — one `text|translation|streak`
//! line per word — so a stored file round-trips through import exactly.
//! The whole dictionary is held in memory and rewritten to disk after
//! every mutation.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{upsert, WordStore};
use crate::error::{CoreError, Result};
use crate::word::Word;

/// Word store backed by a pipe-delimited UTF-8 text file.
pub struct FileStore {
    path: PathBuf,
    threshold: u32,
    words: Vec<Word>,
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .field("threshold", &self.threshold)
            .field("words", &self.words.len())
            .finish()
    }
}

impl FileStore {
    /// Open the dictionary file at `path`, creating an empty one if it
    /// does not exist.
    ///
    /// Lines that do not parse as words are dropped; a duplicate word
    /// keeps the last occurrence, at the position of the first.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StoreUnavailable`] if the file cannot be read
    /// or created.
    pub fn open<P: AsRef<Path>>(path: P, threshold: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = if path.exists() {
            fs::read_to_string(&path)
                .map_err(|e| CoreError::StoreUnavailable(format!("{}: {e}", path.display())))?
        } else {
            fs::write(&path, "")
                .map_err(|e| CoreError::StoreUnavailable(format!("{}: {e}", path.display())))?;
            String::new()
        };

        let mut words = Vec::new();
        for line in content.lines() {
            if let Some(word) = Word::parse_line(line) {
                upsert(&mut words, word);
            }
        }

        debug!(path = %path.display(), words = words.len(), "opened file word store");
        Ok(Self {
            path,
            threshold,
            words,
        })
    }

    /// Write the whole dictionary back to disk.
    fn save(&self) -> Result<()> {
        let mut out = String::new();
        for word in &self.words {
            out.push_str(&word.to_line());
            out.push('\n');
        }
        fs::write(&self.path, out)?;
        Ok(())
    }

    /// Swap in `staged` and persist it, restoring the previous contents
    /// if the write fails. Every mutation funnels through here so memory
    /// and disk never diverge.
    fn commit(&mut self, staged: Vec<Word>) -> Result<()> {
        let previous = std::mem::replace(&mut self.words, staged);
        if let Err(e) = self.save() {
            self.words = previous;
            return Err(e);
        }
        Ok(())
    }
}

impl WordStore for FileStore {
    fn size(&self) -> Result<usize> {
        Ok(self.words.len())
    }

    fn learned_count(&self) -> Result<usize> {
        Ok(self
            .words
            .iter()
            .filter(|w| w.is_learned(self.threshold))
            .count())
    }

    fn learned_words(&self) -> Result<Vec<Word>> {
        Ok(self
            .words
            .iter()
            .filter(|w| w.is_learned(self.threshold))
            .cloned()
            .collect())
    }

    fn unlearned_words(&self) -> Result<Vec<Word>> {
        Ok(self
            .words
            .iter()
            .filter(|w| !w.is_learned(self.threshold))
            .cloned()
            .collect())
    }

    fn record_answer(&mut self, word: &str, new_streak: u32) -> Result<()> {
        if !self.words.iter().any(|w| w.text == word) {
            return Err(CoreError::WordNotFound(word.to_owned()));
        }
        let mut staged = self.words.clone();
        for entry in &mut staged {
            if entry.text == word {
                entry.streak = new_streak;
            }
        }
        self.commit(staged)
    }

    fn reset_progress(&mut self) -> Result<()> {
        let mut staged = self.words.clone();
        for entry in &mut staged {
            entry.streak = 0;
        }
        self.commit(staged)
    }

    fn import_bulk(&mut self, lines: &[String]) -> Result<usize> {
        let mut staged = self.words.clone();
        let mut applied = 0;
        for line in lines {
            if let Some(word) = Word::parse_line(line) {
                upsert(&mut staged, word);
                applied += 1;
            }
        }
        self.commit(staged)?;
        Ok(applied)
    }

    fn add_word(&mut self, word: &Word) -> Result<()> {
        let mut staged = self.words.clone();
        upsert(&mut staged, word.clone());
        self.commit(staged)
    }

    fn remove_word(&mut self, word: &str) -> Result<bool> {
        let mut staged = self.words.clone();
        let before = staged.len();
        staged.retain(|w| w.text != word);
        let existed = staged.len() < before;
        self.commit(staged)?;
        Ok(existed)
    }

    fn clear(&mut self) -> Result<()> {
        self.commit(Vec::new())
    }
}
