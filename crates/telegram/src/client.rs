use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use quotedesk_core::config::TelegramConfig;

use crate::message::InlineKeyboard;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Missing Telegram config")]
    Misconfigured,
    #[error("telegram request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Api(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub text: String,
    pub parse_mode: Option<&'static str>,
    pub disable_web_page_preview: bool,
    pub reply_markup: Option<InlineKeyboard>,
}

/// Correlation ids returned by a successful send, persisted best-effort
/// onto the approval row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelegramDelivery {
    pub message_id: i64,
    pub chat_id: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<TelegramDelivery, NotifyError>;
}

/// Real dispatcher against the Telegram Bot API. One POST per send, no
/// retries; the caller decides what a failure means.
pub struct BotApiNotifier {
    client: reqwest::Client,
    bot_token: SecretString,
    chat_id: String,
    api_base: String,
}

impl BotApiNotifier {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            api_base: TELEGRAM_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboard>,
}

#[derive(Default, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    ok: bool,
    description: Option<String>,
    result: Option<ApiResult>,
}

#[derive(Deserialize)]
struct ApiResult {
    message_id: Option<i64>,
    chat: Option<ApiChat>,
}

#[derive(Deserialize)]
struct ApiChat {
    // Telegram sends numeric ids, but usernames appear as strings.
    id: Option<serde_json::Value>,
}

#[async_trait]
impl Notifier for BotApiNotifier {
    async fn send(&self, message: &OutboundMessage) -> Result<TelegramDelivery, NotifyError> {
        let token = self.bot_token.expose_secret().trim();
        if token.is_empty() || self.chat_id.trim().is_empty() {
            return Err(NotifyError::Misconfigured);
        }

        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let payload = SendMessagePayload {
            chat_id: &self.chat_id,
            text: &message.text,
            disable_web_page_preview: message.disable_web_page_preview,
            parse_mode: message.parse_mode,
            reply_markup: message.reply_markup.as_ref(),
        };

        let response = self.client.post(&url).json(&payload).send().await?;
        let status = response.status();
        // An unparsable body is treated like an empty one; the status and
        // `ok` flag decide the outcome.
        let body: ApiResponse = response.json().await.unwrap_or_default();

        if !status.is_success() || !body.ok {
            let description =
                body.description.unwrap_or_else(|| "Telegram request failed".to_string());
            return Err(NotifyError::Api(description));
        }

        let result = body.result;
        let message_id =
            result.as_ref().and_then(|r| r.message_id).unwrap_or_default();
        let chat_id = result
            .and_then(|r| r.chat)
            .and_then(|chat| chat.id)
            .map(|id| match id {
                serde_json::Value::String(value) => value,
                other => other.to_string(),
            })
            .unwrap_or_else(|| self.chat_id.clone());

        debug!(message_id, chat_id = %chat_id, "telegram message delivered");
        Ok(TelegramDelivery { message_id, chat_id })
    }
}

/// Test double: records every message and can be told to fail, which is
/// how the compensating-rollback path is exercised.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<OutboundMessage>>,
    fail_with: Option<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(description: impl Into<String>) -> Self {
        Self { sent: Mutex::new(Vec::new()), fail_with: Some(description.into()) }
    }

    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &OutboundMessage) -> Result<TelegramDelivery, NotifyError> {
        if let Some(description) = &self.fail_with {
            return Err(NotifyError::Api(description.clone()));
        }

        let mut sent = self.sent.lock().await;
        sent.push(message.clone());
        Ok(TelegramDelivery { message_id: sent.len() as i64, chat_id: "-1001234567".to_string() })
    }
}
