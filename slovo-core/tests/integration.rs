//! Integration tests — full quiz lifecycle over real stores.
//!
//! These drive the same path the dispatcher does: build a registry from a
//! storage config, resolve sessions, answer questions until the deck is
//! exhausted, and confirm progress survives a reopen.

use slovo_core::config::{StorageBackend, StorageConfig};
use slovo_core::{SessionRegistry, Trainer, WordStore};

fn storage_config(dir: &tempfile::TempDir, backend: StorageBackend) -> StorageConfig {
    let seed = dir.path().join("seed.txt");
    std::fs::write(&seed, "apple|яблоко\nbread|хлеб\ncat|кот\ndog|собака\n")
        .expect("write seed");
    StorageConfig {
        backend,
        data_dir: dir.path().join("data"),
        seed_file: Some(seed),
        learning_threshold: 3,
    }
}

/// Answer correctly until the trainer reports the deck exhausted.
fn learn_everything(trainer: &mut Trainer) {
    let mut guard = 0;
    while let Some(question) = trainer.next_question().expect("next question") {
        let graded = trainer
            .submit_answer(Some(question.correct_index()))
            .expect("grade");
        assert!(graded);
        guard += 1;
        assert!(guard < 1000, "quiz never finished");
    }
}

#[test]
fn full_quiz_lifecycle_file_backend() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = storage_config(&dir, StorageBackend::File);
    let registry = SessionRegistry::new(config.store_factory());

    let session = registry.session_for(1).expect("session");
    {
        let mut session = session.lock();
        let stats = session.trainer().statistics().expect("stats");
        assert_eq!((stats.learned, stats.total), (0, 4));

        learn_everything(session.trainer_mut());

        let stats = session.trainer().statistics().expect("stats");
        assert_eq!((stats.learned, stats.total, stats.percent), (4, 4, 100));
    }

    // A fresh registry (new process) sees the persisted progress.
    let registry = SessionRegistry::new(config.store_factory());
    let session = registry.session_for(1).expect("session");
    let mut session = session.lock();
    let stats = session.trainer().statistics().expect("stats");
    assert_eq!(stats.percent, 100);
    assert!(session.trainer_mut().next_question().expect("next").is_none());
}

#[test]
fn full_quiz_lifecycle_sqlite_backend() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = storage_config(&dir, StorageBackend::Sqlite);
    let registry = SessionRegistry::new(config.store_factory());

    let session = registry.session_for(2).expect("session");
    let mut session = session.lock();
    learn_everything(session.trainer_mut());

    let stats = session.trainer().statistics().expect("stats");
    assert_eq!((stats.learned, stats.total, stats.percent), (4, 4, 100));
}

#[test]
fn chats_learn_independently() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = storage_config(&dir, StorageBackend::File);
    let registry = SessionRegistry::new(config.store_factory());

    let first = registry.session_for(10).expect("session");
    learn_everything(first.lock().trainer_mut());

    let second = registry.session_for(20).expect("session");
    let stats = second.lock().trainer().statistics().expect("stats");
    assert_eq!(stats.learned, 0, "chat 20 starts from scratch");
}

#[test]
fn reset_after_learning_restarts_the_quiz() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = storage_config(&dir, StorageBackend::Sqlite);
    let registry = SessionRegistry::new(config.store_factory());

    let session = registry.session_for(3).expect("session");
    let mut session = session.lock();
    learn_everything(session.trainer_mut());
    assert!(session.trainer_mut().next_question().expect("next").is_none());

    session.trainer_mut().reset_progress().expect("reset");
    let stats = session.trainer().statistics().expect("stats");
    assert_eq!((stats.learned, stats.percent), (0, 0));
    assert!(session.trainer_mut().next_question().expect("next").is_some());
}

#[test]
fn seed_import_applies_replace_semantics() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = storage_config(&dir, StorageBackend::File);
    let registry = SessionRegistry::new(config.store_factory());

    let session = registry.session_for(4).expect("session");
    let mut session = session.lock();

    // A refreshed word list re-imported over the live store updates
    // translations without duplicating entries.
    let refreshed = vec!["apple|яблочко|0".to_owned(), "fish|рыба|0".to_owned()];
    session
        .trainer_mut()
        .store_mut()
        .import_bulk(&refreshed)
        .expect("import");

    let store = session.trainer_mut().store_mut();
    assert_eq!(store.size().expect("size"), 5);
    let words = store.unlearned_words().expect("words");
    let apple = words.iter().find(|w| w.text == "apple").expect("apple");
    assert_eq!(apple.translation, "яблочко");
}
