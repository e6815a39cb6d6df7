//! # slovo-telegram
//!
//! Boundary crate for the Telegram Bot API: the subset of wire types the
//! trainer exchanges, a thin [`client::TelegramClient`] over `getUpdates`
//! and `sendMessage`, and the [`types::Envelope`] normalization the
//! dispatcher routes on. Nothing in here knows about words or quizzes.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod types;

pub use client::TelegramClient;
pub use error::TelegramError;
pub use types::{Envelope, InlineButton, Update};
