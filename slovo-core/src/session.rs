//! Session registry: one quiz session per conversation.
//!
//! Sessions are created lazily on first contact and kept for the process
//! lifetime. Each session owns its own word store, so distinct chats
//! never share mastery progress. The registry hands out
//! `Arc<Mutex<Session>>` handles; the per-session mutex makes the
//! single-owner invariant explicit — at most one mutation per
//! conversation at a time, different conversations independent.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::error::Result;
use crate::store::WordStore;
use crate::trainer::Trainer;

/// Builder for a conversation-scoped word store.
pub type StoreFactory = dyn Fn(i64) -> Result<Box<dyn WordStore>> + Send + Sync;

/// One conversation's quiz state.
pub struct Session {
    chat_id: i64,
    trainer: Trainer,
}

impl Session {
    fn new(chat_id: i64, trainer: Trainer) -> Self {
        Self { chat_id, trainer }
    }

    /// The conversation this session belongs to.
    #[must_use]
    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    /// The session's quiz engine.
    #[must_use]
    pub fn trainer(&self) -> &Trainer {
        &self.trainer
    }

    /// The session's quiz engine, mutably.
    pub fn trainer_mut(&mut self) -> &mut Trainer {
        &mut self.trainer
    }
}

/// Lazily creates and owns one [`Session`] per chat id.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<i64, Arc<Mutex<Session>>>>,
    factory: Box<StoreFactory>,
}

impl SessionRegistry {
    /// Create a registry that builds per-chat stores with `factory`.
    #[must_use]
    pub fn new(factory: Box<StoreFactory>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            factory,
        }
    }

    /// Fetch or create the session for `chat_id`.
    ///
    /// Creation happens under the registry lock, so concurrent first
    /// access for the same chat id yields exactly one session.
    ///
    /// # Errors
    ///
    /// Propagates store construction failures; nothing is inserted in
    /// that case, so a later attempt retries from scratch.
    pub fn session_for(&self, chat_id: i64) -> Result<Arc<Mutex<Session>>> {
        let mut sessions = self.sessions.lock();
        if let Some(session) = sessions.get(&chat_id) {
            return Ok(Arc::clone(session));
        }

        let store = (self.factory)(chat_id)?;
        let session = Arc::new(Mutex::new(Session::new(chat_id, Trainer::new(store))));
        sessions.insert(chat_id, Arc::clone(&session));
        info!(chat = chat_id, "created quiz session");
        Ok(session)
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Whether any session exists yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
