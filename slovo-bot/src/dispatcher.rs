//! Long-poll dispatch loop: fetch updates, route them to quiz sessions,
//! send replies.
//!
//! The loop is strictly sequential — one fetch, one batch, one sleep —
//! so envelopes for the same conversation are never handled
//! concurrently. A transport failure anywhere in a cycle abandons that
//! cycle without advancing the offset; the whole batch is fetched and
//! replayed on the next one (at-least-once delivery — the trainer
//! tolerates replayed answers because grading clears the outstanding
//! question).

use std::sync::Arc;
use std::time::Duration;

use slovo_core::{CoreError, Question, SessionRegistry, Trainer};
use slovo_telegram::types::Envelope;
use slovo_telegram::{InlineButton, TelegramClient, TelegramError};
use tokio::time::sleep;
use tracing::{debug, info, warn};

// Free-text commands.
const CMD_HELLO: &str = "hello";
const CMD_MENU: &str = "menu";
const CMD_START: &str = "/start";

// Callback action tokens.
const LEARN_WORDS_CLICKED: &str = "learn_words_clicked";
const STATISTIC_CLICKED: &str = "statistic_clicked";
const RESET_CLICKED: &str = "reset_clicked";
const ANSWER_PREFIX: &str = "answer_";

// User-facing strings.
const MSG_GREETING: &str = "hello";
const MSG_MENU: &str = "Основное меню";
const MSG_CORRECT: &str = "Правильно!";
const MSG_WRONG: &str = "Неправильно";
const MSG_ALL_LEARNED: &str = "Все слова в словаре выучены";
const MSG_RESET_DONE: &str = "Прогресс сброшен";
const MSG_STORE_UNAVAILABLE: &str = "Словарь недоступен, попробуйте позже";
const MSG_SOURCE_MISSING: &str = "Файл со словами не найден";
const MSG_INTERNAL: &str = "Что-то пошло не так, попробуйте позже";
const BTN_LEARN: &str = "Изучать слова";
const BTN_STATS: &str = "Статистика";
const BTN_RESET: &str = "Сбросить прогресс";

/// Drives the polling loop and owns the poll offset.
///
/// The offset is process-scoped state: it starts at zero and is reset
/// only by a restart. It advances past a batch only after every envelope
/// in the batch has been handled.
pub struct Dispatcher {
    client: TelegramClient,
    registry: Arc<SessionRegistry>,
    interval: Duration,
    offset: i64,
}

impl Dispatcher {
    /// Create a dispatcher. Polling starts from offset zero.
    pub fn new(
        client: TelegramClient,
        registry: Arc<SessionRegistry>,
        interval: Duration,
    ) -> Self {
        Self {
            client,
            registry,
            interval,
            offset: 0,
        }
    }

    /// Run forever. Nothing short of process termination stops the loop.
    pub async fn run(mut self) -> std::convert::Infallible {
        info!(interval_ms = self.interval.as_millis() as u64, "dispatcher started");
        loop {
            sleep(self.interval).await;
            if let Err(e) = self.poll_once().await {
                warn!(error = %e, offset = self.offset, "poll cycle abandoned");
            }
        }
    }

    /// One fetch → process-batch cycle.
    async fn poll_once(&mut self) -> Result<(), TelegramError> {
        let updates = self.client.get_updates(self.offset).await?;
        if updates.is_empty() {
            return Ok(());
        }

        // Arrival order is not guaranteed, and an abandoned cycle can
        // replay ids the server already handed out.
        let mut envelopes: Vec<Envelope> = updates.into_iter().map(Envelope::from).collect();
        envelopes.sort_by_key(|e| e.update_id);
        envelopes.dedup_by_key(|e| e.update_id);

        let last_id = envelopes.last().map(|e| e.update_id);
        for envelope in envelopes {
            self.handle_envelope(envelope).await?;
        }
        if let Some(last) = last_id {
            self.offset = last + 1;
        }
        Ok(())
    }

    async fn handle_envelope(&self, envelope: Envelope) -> Result<(), TelegramError> {
        let Some(chat_id) = envelope.chat_id else {
            debug!(update = envelope.update_id, "envelope without chat id discarded");
            return Ok(());
        };

        debug!(update = envelope.update_id, chat = chat_id, "handling envelope");

        match envelope.text.as_deref() {
            Some(CMD_HELLO) => return self.client.send_message(chat_id, MSG_GREETING).await,
            Some(CMD_MENU | CMD_START) => return self.send_menu(chat_id).await,
            _ => {}
        }

        if let Some(callback) = envelope.callback.as_deref() {
            return self.handle_callback(chat_id, callback).await;
        }

        // Never drop an event silently.
        let text = envelope.text.unwrap_or_default();
        self.client
            .send_message(chat_id, &format!("Неизвестная команда: {text}"))
            .await
    }

    async fn handle_callback(&self, chat_id: i64, callback: &str) -> Result<(), TelegramError> {
        match callback {
            LEARN_WORDS_CLICKED => self.send_next_question(chat_id).await,
            STATISTIC_CLICKED => self.send_statistics(chat_id).await,
            RESET_CLICKED => self.reset_progress(chat_id).await,
            _ if callback.starts_with(ANSWER_PREFIX) => self.grade_answer(chat_id, callback).await,
            _ => {
                self.client
                    .send_message(chat_id, &format!("Неизвестная команда: {callback}"))
                    .await
            }
        }
    }

    /// Resolve the chat's session and run `f` on its trainer.
    ///
    /// The session lock is only ever held inside this synchronous call,
    /// never across an await.
    fn quiz_turn<T>(
        &self,
        chat_id: i64,
        f: impl FnOnce(&mut Trainer) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let session = self.registry.session_for(chat_id)?;
        let mut session = session.lock();
        f(session.trainer_mut())
    }

    async fn send_next_question(&self, chat_id: i64) -> Result<(), TelegramError> {
        match self.quiz_turn(chat_id, Trainer::next_question) {
            Ok(Some(question)) => self.send_question(chat_id, &question).await,
            Ok(None) => self.client.send_message(chat_id, MSG_ALL_LEARNED).await,
            Err(e) => self.report_core_error(chat_id, &e).await,
        }
    }

    async fn send_question(&self, chat_id: i64, question: &Question) -> Result<(), TelegramError> {
        let row: Vec<InlineButton> = question
            .variants()
            .iter()
            .enumerate()
            .map(|(index, word)| InlineButton {
                text: word.translation.clone(),
                callback_data: format!("{ANSWER_PREFIX}{index}"),
            })
            .collect();
        self.client
            .send_keyboard(chat_id, &question.correct().text, vec![row])
            .await
    }

    async fn grade_answer(&self, chat_id: i64, callback: &str) -> Result<(), TelegramError> {
        let choice = callback
            .strip_prefix(ANSWER_PREFIX)
            .and_then(|suffix| suffix.parse::<usize>().ok());

        match self.quiz_turn(chat_id, |trainer| trainer.submit_answer(choice)) {
            Ok(correct) => {
                let verdict = if correct { MSG_CORRECT } else { MSG_WRONG };
                self.client.send_message(chat_id, verdict).await?;
                self.send_next_question(chat_id).await
            }
            Err(e) => self.report_core_error(chat_id, &e).await,
        }
    }

    async fn send_statistics(&self, chat_id: i64) -> Result<(), TelegramError> {
        match self.quiz_turn(chat_id, |trainer| trainer.statistics()) {
            Ok(stats) => {
                let message = format!(
                    "Результат изучения: {}/{} ({}%)",
                    stats.learned, stats.total, stats.percent
                );
                self.client.send_message(chat_id, &message).await
            }
            Err(e) => self.report_core_error(chat_id, &e).await,
        }
    }

    async fn reset_progress(&self, chat_id: i64) -> Result<(), TelegramError> {
        match self.quiz_turn(chat_id, Trainer::reset_progress) {
            Ok(()) => self.client.send_message(chat_id, MSG_RESET_DONE).await,
            Err(e) => self.report_core_error(chat_id, &e).await,
        }
    }

    async fn send_menu(&self, chat_id: i64) -> Result<(), TelegramError> {
        let keyboard = vec![
            vec![
                InlineButton {
                    text: BTN_LEARN.to_owned(),
                    callback_data: LEARN_WORDS_CLICKED.to_owned(),
                },
                InlineButton {
                    text: BTN_STATS.to_owned(),
                    callback_data: STATISTIC_CLICKED.to_owned(),
                },
            ],
            vec![InlineButton {
                text: BTN_RESET.to_owned(),
                callback_data: RESET_CLICKED.to_owned(),
            }],
        ];
        self.client.send_keyboard(chat_id, MSG_MENU, keyboard).await
    }

    /// One conversation's store failure must not take down the loop:
    /// tell the user, log, and report success to the batch.
    async fn report_core_error(
        &self,
        chat_id: i64,
        error: &CoreError,
    ) -> Result<(), TelegramError> {
        warn!(chat = chat_id, error = %error, "session failed to handle update");
        let message = match error {
            CoreError::StoreUnavailable(_) => MSG_STORE_UNAVAILABLE,
            CoreError::SourceMissing(_) => MSG_SOURCE_MISSING,
            _ => MSG_INTERNAL,
        };
        self.client.send_message(chat_id, message).await
    }
}
