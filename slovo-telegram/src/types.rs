//! Telegram Bot API wire types — only the subset the trainer uses.
//!
//! Serde skips unknown fields by default, so the real API's much larger
//! payloads deserialize into these without trouble.

use serde::{Deserialize, Serialize};

/// One long-poll update as delivered by `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonically increasing update identifier.
    pub update_id: i64,
    /// Present for plain text messages.
    #[serde(default)]
    pub message: Option<Message>,
    /// Present when an inline keyboard button was pressed.
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

/// `getUpdates` response envelope.
#[derive(Debug, Deserialize)]
pub struct UpdatesResponse {
    /// Whether the API accepted the request.
    pub ok: bool,
    /// The updates themselves.
    #[serde(default)]
    pub result: Vec<Update>,
}

/// An inbound chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Message text, absent for stickers, photos, and the like.
    #[serde(default)]
    pub text: Option<String>,
    /// The conversation the message arrived in.
    pub chat: Chat,
}

/// A button press on a previously sent inline keyboard.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    /// The button's `callback_data`.
    #[serde(default)]
    pub data: Option<String>,
    /// The message the keyboard was attached to.
    #[serde(default)]
    pub message: Option<Message>,
}

/// Conversation identifier.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Chat {
    /// Unique chat id.
    pub id: i64,
}

/// Outbound `sendMessage` payload.
#[derive(Debug, Serialize)]
pub struct SendMessageRequest {
    /// Destination chat.
    pub chat_id: i64,
    /// Message text.
    pub text: String,
    /// Optional inline keyboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

/// Inline keyboard attachment.
#[derive(Debug, Serialize)]
pub struct ReplyMarkup {
    /// Button rows.
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

/// One labeled choice button.
#[derive(Debug, Clone, Serialize)]
pub struct InlineButton {
    /// Button label shown to the user.
    pub text: String,
    /// Token echoed back in a [`CallbackQuery`] when pressed.
    pub callback_data: String,
}

/// Normalized inbound event, stripped of transport framing.
///
/// This is the shape the dispatcher routes on: the update id for
/// ordering and offset bookkeeping, the originating chat if one could be
/// resolved, and whichever of text / callback data the update carried.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Sequence id for ordering and deduplication.
    pub update_id: i64,
    /// Originating conversation, when resolvable.
    pub chat_id: Option<i64>,
    /// Free text, for command routing.
    pub text: Option<String>,
    /// Callback token, for action routing.
    pub callback: Option<String>,
}

impl From<Update> for Envelope {
    fn from(update: Update) -> Self {
        let chat_id = update
            .message
            .as_ref()
            .map(|m| m.chat.id)
            .or_else(|| {
                update
                    .callback_query
                    .as_ref()
                    .and_then(|q| q.message.as_ref())
                    .map(|m| m.chat.id)
            });

        Self {
            update_id: update.update_id,
            chat_id,
            text: update.message.and_then(|m| m.text),
            callback: update.callback_query.and_then(|q| q.data),
        }
    }
}
