//! SQLite table backend.
//!
//! One table, keyed by the word text:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS words (
//!     text        TEXT PRIMARY KEY,
//!     translation TEXT NOT NULL,
//!     streak      INTEGER NOT NULL DEFAULT 0
//! );
//! ```
//!
//! Upserts go through `ON CONFLICT ... DO UPDATE`, so a replaced word
//! keeps its rowid — and with it its insertion order. Bulk imports run
//! inside a single transaction and roll back on failure.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, Row};
use tracing::debug;

use super::WordStore;
use crate::error::{CoreError, Result};
use crate::word::Word;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS words (
    text        TEXT PRIMARY KEY,
    translation TEXT NOT NULL,
    streak      INTEGER NOT NULL DEFAULT 0
);";

const UPSERT: &str = "INSERT INTO words (text, translation, streak)
     VALUES (?1, ?2, ?3)
     ON CONFLICT(text) DO UPDATE SET
        translation = excluded.translation,
        streak = excluded.streak";

/// Word store backed by a SQLite database.
pub struct SqliteStore {
    conn: Connection,
    threshold: u32,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

fn word_from_row(row: &Row<'_>) -> rusqlite::Result<Word> {
    Ok(Word {
        text: row.get(0)?,
        translation: row.get(1)?,
        streak: row.get(2)?,
    })
}

impl SqliteStore {
    /// Open (or create) a database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StoreUnavailable`] if the database cannot be
    /// opened or the schema cannot be created.
    pub fn open<P: AsRef<Path>>(path: P, threshold: u32) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&db_path, flags)
            .map_err(|e| CoreError::StoreUnavailable(format!("{}: {e}", db_path.display())))?;
        Self::init(conn, threshold, db_path)
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StoreUnavailable`] on SQLite failures.
    pub fn open_in_memory(threshold: u32) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CoreError::StoreUnavailable(e.to_string()))?;
        Self::init(conn, threshold, PathBuf::from(":memory:"))
    }

    fn init(conn: Connection, threshold: u32, db_path: PathBuf) -> Result<Self> {
        conn.execute_batch("PRAGMA busy_timeout = 5000;")
            .map_err(|e| CoreError::StoreUnavailable(e.to_string()))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| CoreError::StoreUnavailable(e.to_string()))?;

        debug!(path = %db_path.display(), "opened sqlite word store");
        Ok(Self {
            conn,
            threshold,
            db_path,
        })
    }

    fn select_where(&self, predicate: &str) -> Result<Vec<Word>> {
        let sql = format!(
            "SELECT text, translation, streak FROM words WHERE {predicate} ORDER BY rowid"
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![self.threshold], word_from_row)?;
        let mut words = Vec::new();
        for row in rows {
            words.push(row?);
        }
        Ok(words)
    }
}

impl WordStore for SqliteStore {
    fn size(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
        #[allow(clippy::cast_sign_loss)]
        Ok(count as usize)
    }

    fn learned_count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM words WHERE streak >= ?1",
            params![self.threshold],
            |row| row.get(0),
        )?;
        #[allow(clippy::cast_sign_loss)]
        Ok(count as usize)
    }

    fn learned_words(&self) -> Result<Vec<Word>> {
        self.select_where("streak >= ?1")
    }

    fn unlearned_words(&self) -> Result<Vec<Word>> {
        self.select_where("streak < ?1")
    }

    fn record_answer(&mut self, word: &str, new_streak: u32) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE words SET streak = ?1 WHERE text = ?2",
            params![new_streak, word],
        )?;
        if updated == 0 {
            return Err(CoreError::WordNotFound(word.to_owned()));
        }
        Ok(())
    }

    fn reset_progress(&mut self) -> Result<()> {
        self.conn.execute("UPDATE words SET streak = 0", [])?;
        Ok(())
    }

    fn import_bulk(&mut self, lines: &[String]) -> Result<usize> {
        let words: Vec<Word> = lines.iter().filter_map(|l| Word::parse_line(l)).collect();
        let applied = words.len();

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(UPSERT)?;
            for word in &words {
                stmt.execute(params![word.text, word.translation, word.streak])?;
            }
        }
        tx.commit()?;

        debug!(path = %self.db_path.display(), applied, "imported words");
        Ok(applied)
    }

    fn add_word(&mut self, word: &Word) -> Result<()> {
        self.conn
            .execute(UPSERT, params![word.text, word.translation, word.streak])?;
        Ok(())
    }

    fn remove_word(&mut self, word: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM words WHERE text = ?1", params![word])?;
        Ok(deleted > 0)
    }

    fn clear(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM words", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory(3).expect("open")
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn import_and_partition() {
        let mut store = store();
        store
            .import_bulk(&lines(&["apple|яблоко|4", "bread|хлеб|0", "cat|кот|3"]))
            .expect("import");

        assert_eq!(store.size().expect("size"), 3);
        assert_eq!(store.learned_count().expect("learned"), 2);
        let learned = store.learned_words().expect("learned").len();
        let unlearned = store.unlearned_words().expect("unlearned").len();
        assert_eq!(learned + unlearned, 3);
    }

    #[test]
    fn upsert_keeps_insertion_order() {
        let mut store = store();
        store
            .import_bulk(&lines(&["apple|яблоко|0", "bread|хлеб|0", "cat|кот|0"]))
            .expect("import");
        store
            .import_bulk(&lines(&["bread|батон|1"]))
            .expect("reimport");

        let words = store.unlearned_words().expect("words");
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, ["apple", "bread", "cat"]);
        assert_eq!(words[1].translation, "батон");
    }

    #[test]
    fn import_is_idempotent() {
        let mut store = store();
        let batch = lines(&["apple|яблоко|1", "bread|хлеб|2"]);

        store.import_bulk(&batch).expect("first");
        store.import_bulk(&batch).expect("second");

        assert_eq!(store.size().expect("size"), 2);
        let words = store.unlearned_words().expect("words");
        assert_eq!(words[0].streak, 1);
        assert_eq!(words[1].streak, 2);
    }

    #[test]
    fn record_answer_requires_existing_word() {
        let mut store = store();
        store.import_bulk(&lines(&["apple|яблоко"])).expect("seed");

        store.record_answer("apple", 2).expect("record");
        let words = store.unlearned_words().expect("words");
        assert_eq!(words[0].streak, 2);

        let err = store.record_answer("ghost", 1).expect_err("unknown word");
        assert!(matches!(err, CoreError::WordNotFound(w) if w == "ghost"));
    }

    #[test]
    fn reset_zeroes_every_streak() {
        let mut store = store();
        store
            .import_bulk(&lines(&["apple|яблоко|5", "bread|хлеб|4"]))
            .expect("seed");

        store.reset_progress().expect("reset");
        assert_eq!(store.learned_count().expect("learned"), 0);
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("words.db");

        let mut store = SqliteStore::open(&path, 3).expect("open");
        store
            .import_bulk(&lines(&["apple|яблоко|3"]))
            .expect("import");
        drop(store);

        let reopened = SqliteStore::open(&path, 3).expect("reopen");
        assert_eq!(reopened.size().expect("size"), 1);
        assert_eq!(reopened.learned_count().expect("learned"), 1);
    }

    #[test]
    fn add_remove_clear() {
        let mut store = store();

        store.add_word(&Word::new("apple", "яблоко")).expect("add");
        store
            .add_word(&Word {
                text: "apple".into(),
                translation: "яблочко".into(),
                streak: 1,
            })
            .expect("replace");
        assert_eq!(store.size().expect("size"), 1);
        assert_eq!(
            store.unlearned_words().expect("words")[0].translation,
            "яблочко"
        );

        assert!(store.remove_word("apple").expect("remove"));
        assert!(!store.remove_word("apple").expect("remove again"));

        store.add_word(&Word::new("bread", "хлеб")).expect("add");
        store.clear().expect("clear");
        assert_eq!(store.size().expect("size"), 0);
    }

    #[test]
    fn import_file_missing_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store();
        let err = store
            .import_file(&dir.path().join("missing.txt"))
            .expect_err("missing");
        assert!(matches!(err, CoreError::SourceMissing(_)));
    }
}
