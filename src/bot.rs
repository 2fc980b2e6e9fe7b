//! Update handling: command routing and the per-message translation
//! pipeline.
//!
//! Pipeline order matters: the topic gate is checked before anything is
//! written, and the sender's resolved language and membership are persisted
//! before the chat language map is read, so a sender who just joined is
//! already visible to the fanout for their own message.

use crate::fanout;
use crate::i18n::LanguageRegistry;
use crate::store::Store;
use crate::telegram::{Message, Telegram, Update, User};
use crate::translation::Translator;
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Applied when neither detection nor a stored preference can resolve a
/// sender's language.
const DEFAULT_LANGUAGE: &str = "en";

const HELP_TEXT: &str = "\
<b>🌍 Translation Relay</b>\n\n\
I automatically translate messages between users who speak different languages in group chats.\n\n\
<b>Commands:</b>\n\
/start - Activate translation in this topic (admin only)\n\
/help - Show this help message\n\
/language [code] - Manually set your language (e.g., /language es)\n\n\
<b>How it works:</b>\n\
1. An admin activates me in a topic using /start\n\
2. I detect each user's language from their messages\n\
3. Messages are relayed as translated replies for members who speak something else";

const LANGUAGE_USAGE: &str = "\
Please specify a language code. For example:\n\
/language en - for English\n\
/language es - for Spanish\n\
/language fr - for French\n\
See the full list of language codes: https://cloud.google.com/translate/docs/languages";

pub struct Bot {
    telegram: Telegram,
    translator: Translator,
    store: Store,
}

/// Split `/command@BotName arg` into the command name and its argument.
/// Returns `None` for text that is not a command.
fn parse_command(text: &str) -> Option<(&str, Option<&str>)> {
    static COMMAND_RE: OnceLock<Regex> = OnceLock::new();
    let re = COMMAND_RE
        .get_or_init(|| Regex::new(r"^/([a-zA-Z0-9_]+)(?:@\w+)?(?:\s+(\S.*?))?\s*$").unwrap());

    let caps = re.captures(text)?;
    let command = caps.get(1)?.as_str();
    let arg = caps.get(2).map(|m| m.as_str());
    Some((command, arg))
}

impl Bot {
    pub fn new(telegram: Telegram, translator: Translator, store: Store) -> Self {
        Self {
            telegram,
            translator,
            store,
        }
    }

    /// Entry point per update. Never fails the caller: errors are logged
    /// and the worst case for any single update is "nothing sent".
    pub async fn handle_update(&self, update: Update) {
        let message = match update.message {
            Some(m) => m,
            None => return,
        };
        if let Err(e) = self.handle_message(&message).await {
            warn!("Failed to handle update {}: {}", update.update_id, e);
        }
    }

    async fn handle_message(&self, message: &Message) -> Result<()> {
        let text = match &message.text {
            Some(t) => t,
            None => return Ok(()),
        };
        let sender = match &message.from {
            Some(u) => u,
            None => return Ok(()),
        };
        if sender.is_bot {
            return Ok(());
        }

        if text.starts_with('/') {
            if let Some((command, arg)) = parse_command(text) {
                return self.handle_command(message, sender, command, arg).await;
            }
            // Command-prefixed but unparseable: never relay it
            return Ok(());
        }

        self.relay_message(message, sender, text).await
    }

    // ==================== Commands ====================

    async fn handle_command(
        &self,
        message: &Message,
        sender: &User,
        command: &str,
        arg: Option<&str>,
    ) -> Result<()> {
        match command {
            "start" => self.start_command(message, sender).await,
            "help" => self.telegram.reply_to(message, HELP_TEXT).await,
            "language" => self.language_command(message, sender, arg).await,
            // Stay quiet on unrecognized commands; they are usually meant
            // for other bots in the same group
            _ => {
                debug!("Ignoring unknown command /{}", command);
                Ok(())
            }
        }
    }

    /// `/start`: activate translation for the current (chat, topic).
    /// Group-only and admin-only.
    async fn start_command(&self, message: &Message, sender: &User) -> Result<()> {
        if !message.chat.is_group() {
            return self
                .telegram
                .reply_to(
                    message,
                    "This bot is designed for group chats. Please add me to a group!",
                )
                .await;
        }

        // A failed role lookup counts as "not an admin"
        let is_admin = match self
            .telegram
            .is_chat_admin(message.chat.id, sender.id)
            .await
        {
            Ok(admin) => admin,
            Err(e) => {
                warn!("Failed to check admin status: {}", e);
                false
            }
        };
        if !is_admin {
            return self
                .telegram
                .reply_to(
                    message,
                    "Only group administrators can activate the translation bot.",
                )
                .await;
        }

        let topic_id = message.topic_id();
        self.store.activate_topic(message.chat.id, topic_id).await?;
        self.store
            .register_membership(sender.id, message.chat.id)
            .await?;
        info!(
            "Activated translation in chat {} topic {}",
            message.chat.id, topic_id
        );

        let scope = if topic_id != 0 {
            format!("topic #{}", topic_id)
        } else {
            "this group".to_string()
        };
        self.telegram
            .reply_to(
                message,
                &format!(
                    "✅ Translation activated in {}!\n\n\
                     I'll detect each member's language from their messages and relay \
                     translated copies to members who speak something different.",
                    scope
                ),
            )
            .await
    }

    /// `/language <code>`: explicitly set the caller's preferred language.
    async fn language_command(
        &self,
        message: &Message,
        sender: &User,
        arg: Option<&str>,
    ) -> Result<()> {
        let code = match arg {
            Some(c) => c.to_lowercase(),
            None => return self.telegram.reply_to(message, LANGUAGE_USAGE).await,
        };

        let registry = LanguageRegistry::get();
        if !registry.is_valid(&code) {
            return self
                .telegram
                .reply_to(
                    message,
                    &format!(
                        "Invalid language code: {}\n\
                         Please use a valid ISO language code like 'en', 'es', 'fr'.",
                        code
                    ),
                )
                .await;
        }

        self.store.set_user_language(sender.id, &code).await?;
        self.store
            .register_membership(sender.id, message.chat.id)
            .await?;
        info!("User {} set language to {}", sender.id, code);

        self.telegram
            .reply_to(
                message,
                &format!(
                    "Your language has been set to {} ({}).",
                    registry.display_name(&code),
                    code
                ),
            )
            .await
    }

    // ==================== Relay pipeline ====================

    async fn relay_message(&self, message: &Message, sender: &User, text: &str) -> Result<()> {
        let chat_id = message.chat.id;
        let topic_id = message.topic_id();

        // Gate first: an inactive topic causes no writes at all. A store
        // failure here degrades to "inactive".
        let active = match self.store.is_topic_active(chat_id, topic_id).await {
            Ok(a) => a,
            Err(e) => {
                warn!("Topic gate check failed for chat {}: {}", chat_id, e);
                false
            }
        };
        if !active {
            return Ok(());
        }

        let sender_lang = self.resolve_sender_language(sender.id, text).await;

        // Persist the resolved value unconditionally, fallback or not, so
        // the next message reuses it instead of re-falling-back
        if let Err(e) = self.store.set_user_language(sender.id, &sender_lang).await {
            warn!("Failed to persist language for user {}: {}", sender.id, e);
        }
        if let Err(e) = self.store.register_membership(sender.id, chat_id).await {
            warn!(
                "Failed to register user {} in chat {}: {}",
                sender.id, chat_id, e
            );
        }

        let chat_langs = match self.store.languages_in_chat(chat_id).await {
            Ok(langs) => langs,
            Err(e) => {
                warn!("Failed to load language map for chat {}: {}", chat_id, e);
                return Ok(());
            }
        };

        let sent = fanout::dispatch(
            &self.telegram,
            &self.translator,
            message,
            sender.id,
            &sender_lang,
            &chat_langs,
        )
        .await;

        if sent > 0 {
            info!(
                "Relayed message {} from {} in chat {} to {} recipient(s)",
                message.message_id, sender.first_name, chat_id, sent
            );
        }
        Ok(())
    }

    /// Fallback chain: detection result, then the stored preference, then
    /// the default language.
    async fn resolve_sender_language(&self, sender_id: i64, text: &str) -> String {
        if let Some(detected) = self.translator.detect(text).await {
            return detected;
        }

        match self.store.user_language(sender_id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => DEFAULT_LANGUAGE.to_string(),
            Err(e) => {
                warn!(
                    "Failed to read stored language for user {}: {}",
                    sender_id, e
                );
                DEFAULT_LANGUAGE.to_string()
            }
        }
    }
}
