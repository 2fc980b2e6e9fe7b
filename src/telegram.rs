//! Telegram Bot API transport.
//!
//! Inbound updates arrive as the serde types below; the rest of the crate
//! never sees raw API shapes. The one normalization that matters happens
//! here: `Message::topic_id()` collapses Telegram's
//! `is_topic_message`/`message_thread_id` pair into a single canonical
//! topic id, where 0 means "the chat as a whole".

use crate::config::Config;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Statuses that count as chat administrators for `/start`.
const ADMIN_STATUSES: [&str; 2] = ["creator", "administrator"];

// ==================== Inbound types ====================

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    #[serde(default)]
    pub message_thread_id: Option<i64>,
    #[serde(default)]
    pub is_topic_message: Option<bool>,
}

impl Message {
    /// Canonical topic id: the forum thread id when this message belongs to
    /// one, 0 otherwise. Telegram also sets `message_thread_id` on plain
    /// replies, so `is_topic_message` is the authoritative signal.
    pub fn topic_id(&self) -> i64 {
        if self.is_topic_message.unwrap_or(false) {
            self.message_thread_id.unwrap_or(0)
        } else {
            0
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub r#type: String,
}

impl Chat {
    pub fn is_group(&self) -> bool {
        matches!(self.r#type.as_str(), "group" | "supergroup")
    }
}

#[derive(Debug, Deserialize)]
struct ChatMember {
    status: String,
}

/// Standard Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

// ==================== Outbound types ====================

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_thread_id: Option<i64>,
}

/// Escape text for Telegram's HTML parse mode.
///
/// Relayed bodies are arbitrary user/provider content; without this a
/// translation containing `<b>` or a stray `&` would either inject markup
/// or make the API reject the whole message.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

// ==================== Client ====================

#[derive(Clone)]
pub struct Telegram {
    client: reqwest::Client,
    base_url: String,
    token: String,
    poll_timeout_secs: u64,
}

impl Telegram {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client for Telegram")?;

        Ok(Self {
            client,
            base_url: config.telegram_api_url.clone(),
            token: config.telegram_bot_token.clone(),
            poll_timeout_secs: config.poll_timeout_secs,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &impl Serialize,
        timeout: Option<Duration>,
    ) -> Result<T> {
        let mut request = self.client.post(self.method_url(method)).json(body);
        if let Some(t) = timeout {
            request = request.timeout(t);
        }

        let response = request
            .send()
            .await
            .context(format!("Failed to send {} request to Telegram", method))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            anyhow::bail!("Telegram API error on {} ({}): {}", method, status, body);
        }

        let api_response: ApiResponse<T> = response
            .json()
            .await
            .context(format!("Failed to parse {} response", method))?;

        if !api_response.ok {
            anyhow::bail!(
                "Telegram rejected {}: {}",
                method,
                api_response
                    .description
                    .unwrap_or_else(|| "no description".to_string())
            );
        }

        api_response
            .result
            .context(format!("Telegram {} response contained no result", method))
    }

    /// Long-poll for new updates past `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": self.poll_timeout_secs,
            "allowed_updates": ["message"],
        });
        // The HTTP timeout must outlive the server-side long-poll window
        let timeout = Duration::from_secs(self.poll_timeout_secs + 10);
        self.call("getUpdates", &body, Some(timeout)).await
    }

    /// Send an HTML-formatted message, optionally as a reply and optionally
    /// scoped to a forum topic. The caller is responsible for escaping any
    /// untrusted content in `text`.
    pub async fn send_message(
        &self,
        chat_id: i64,
        topic_id: Option<i64>,
        text: &str,
        reply_to_message_id: Option<i64>,
    ) -> Result<()> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
            reply_to_message_id,
            message_thread_id: topic_id,
        };
        let _: serde_json::Value = self.call("sendMessage", &request, None).await?;
        Ok(())
    }

    /// Reply in the same chat/topic/thread as an inbound message.
    pub async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        let topic_id = match message.topic_id() {
            0 => None,
            id => Some(id),
        };
        self.send_message(message.chat.id, topic_id, text, Some(message.message_id))
            .await
    }

    /// Whether the user is a creator or administrator of the chat.
    pub async fn is_chat_admin(&self, chat_id: i64, user_id: i64) -> Result<bool> {
        let body = serde_json::json!({ "chat_id": chat_id, "user_id": user_id });
        let member: ChatMember = self.call("getChatMember", &body, None).await?;
        Ok(ADMIN_STATUSES.contains(&member.status.as_str()))
    }

    /// Drop any configured webhook so long polling can take over.
    pub async fn delete_webhook(&self) -> Result<()> {
        let _: serde_json::Value = self
            .call("deleteWebhook", &serde_json::json!({}), None)
            .await?;
        info!("Webhook deleted, polling enabled");
        Ok(())
    }

    /// Register the command list shown in the Telegram UI.
    pub async fn set_my_commands(&self) -> Result<()> {
        let body = serde_json::json!({
            "commands": [
                { "command": "start", "description": "Activate translation in this topic (admin only)" },
                { "command": "help", "description": "Show help information" },
                { "command": "language", "description": "Manually set your language" },
            ]
        });
        let _: serde_json::Value = self.call("setMyCommands", &body, None).await?;
        info!("Bot commands registered");
        Ok(())
    }
}
