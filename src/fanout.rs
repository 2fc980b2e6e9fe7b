//! Fanout engine: decides who receives a translated copy of a message and
//! dispatches the sends.
//!
//! Recipient selection is a pure function over the chat's language map so
//! it can be tested without any I/O. Dispatch is best-effort per recipient:
//! a translation or send failure for one recipient never affects the
//! others, and there are no retries — a failed translation for a given
//! message is skipped for good.

use crate::i18n::LanguageRegistry;
use crate::telegram::{escape_html, Message, Telegram};
use crate::translation::Translator;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Select the recipients that need a translated copy.
///
/// The sender is excluded by identity, not by language mismatch: under a
/// race the sender can show up in the map with a stale language and must
/// still never receive their own message back. Recipients whose language
/// exactly matches the sender's resolved language are excluded (plain ISO
/// code comparison, no locale subtag handling).
pub fn plan_recipients(
    sender_id: i64,
    sender_lang: &str,
    chat_langs: &HashMap<i64, String>,
) -> Vec<(i64, String)> {
    chat_langs
        .iter()
        .filter(|(recipient_id, recipient_lang)| {
            **recipient_id != sender_id && recipient_lang.as_str() != sender_lang
        })
        .map(|(id, lang)| (*id, lang.clone()))
        .collect()
}

/// Render the relayed message body: a header naming the source language
/// plus the escaped translation. The translated text is untrusted content
/// and must not be able to inject HTML.
pub fn render_translation(source_lang: &str, translated: &str) -> String {
    let language_name = LanguageRegistry::get().display_name(source_lang);
    format!(
        "<b>🔄 Translated from {}:</b>\n{}",
        language_name,
        escape_html(translated)
    )
}

/// Translate and send one copy per planned recipient, replying to the
/// original message in its chat (and topic, when it came from one).
///
/// Returns the number of messages actually sent.
pub async fn dispatch(
    telegram: &Telegram,
    translator: &Translator,
    message: &Message,
    sender_id: i64,
    sender_lang: &str,
    chat_langs: &HashMap<i64, String>,
) -> usize {
    let recipients = plan_recipients(sender_id, sender_lang, chat_langs);
    if recipients.is_empty() {
        debug!("No recipients need a translation in chat {}", message.chat.id);
        return 0;
    }

    let text = match &message.text {
        Some(t) => t,
        None => return 0,
    };

    let mut sent = 0;
    for (recipient_id, recipient_lang) in recipients {
        let translated = match translator
            .translate(text, Some(sender_lang), &recipient_lang)
            .await
        {
            Some(t) => t,
            // Failed or identity translation: skip this recipient silently
            None => continue,
        };

        let body = render_translation(sender_lang, &translated);
        match telegram.reply_to(message, &body).await {
            Ok(()) => {
                sent += 1;
                debug!(
                    "Sent {} -> {} translation for recipient {} in chat {}",
                    sender_lang, recipient_lang, recipient_id, message.chat.id
                );
            }
            Err(e) => {
                warn!(
                    "Failed to send translation to chat {} for recipient {}: {}",
                    message.chat.id, recipient_id, e
                );
            }
        }
    }

    sent
}
