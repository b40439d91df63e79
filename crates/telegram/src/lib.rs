//! Telegram integration - approval notification side channel.
//!
//! This crate is the only place that talks to the Telegram Bot API:
//! - **Client** (`client`) - `Notifier` trait, HTTP implementation, and
//!   a recording double for tests
//! - **Messages** (`message`) - approval alert composition (HTML
//!   escaping, inline-keyboard deep-link rules)
//!
//! The server treats dispatch as fire-once: a failed send is surfaced to
//! the caller immediately and the just-created approval row is rolled
//! back. Nothing is retried or queued.

pub mod client;
pub mod message;

pub use client::{
    BotApiNotifier, Notifier, NotifyError, OutboundMessage, RecordingNotifier, TelegramDelivery,
};
pub use message::{ApprovalAlert, InlineKeyboard, InlineKeyboardButton};
