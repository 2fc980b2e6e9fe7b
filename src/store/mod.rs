//! Persistence for language preferences, chat membership, and topic
//! activation flags.
//!
//! Two backends sit behind the same `Store` surface: a volatile in-process
//! map store (default, good for tests and throwaway deployments) and a
//! SQLite store for durable state. The message pipeline and fanout engine
//! only ever see `Store`, so the backend can be swapped without touching
//! them.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use anyhow::Result;
use std::collections::HashMap;

/// Per-user/per-chat translation state.
///
/// All mutations are atomic upserts: concurrent writes to the same key
/// serialize to one of the written values, never a torn read-modify-write.
/// Reads issued after a write from the same task observe that write.
#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    /// Volatile store, state lives for the process lifetime only.
    pub fn memory() -> Self {
        Store::Memory(MemoryStore::new())
    }

    /// Durable store backed by SQLite; creates the schema if missing.
    pub async fn sqlite(url: &str) -> Result<Self> {
        Ok(Store::Sqlite(SqliteStore::connect(url).await?))
    }

    /// Record a user's preferred language, overwriting any previous value.
    pub async fn set_user_language(&self, user_id: i64, lang: &str) -> Result<()> {
        match self {
            Store::Memory(s) => s.set_user_language(user_id, lang),
            Store::Sqlite(s) => s.set_user_language(user_id, lang).await,
        }
    }

    /// Last known language for a user, if any.
    pub async fn user_language(&self, user_id: i64) -> Result<Option<String>> {
        match self {
            Store::Memory(s) => s.user_language(user_id),
            Store::Sqlite(s) => s.user_language(user_id).await,
        }
    }

    /// Record that a user has been observed in a chat. Idempotent; there is
    /// no removal path (a user who leaves the chat stays registered).
    pub async fn register_membership(&self, user_id: i64, chat_id: i64) -> Result<()> {
        match self {
            Store::Memory(s) => s.register_membership(user_id, chat_id),
            Store::Sqlite(s) => s.register_membership(user_id, chat_id).await,
        }
    }

    /// Language preference of every registered member of a chat. Members
    /// without a stored preference are absent from the result.
    pub async fn languages_in_chat(&self, chat_id: i64) -> Result<HashMap<i64, String>> {
        match self {
            Store::Memory(s) => s.languages_in_chat(chat_id),
            Store::Sqlite(s) => s.languages_in_chat(chat_id).await,
        }
    }

    /// Turn translation on for a (chat, topic). Upsert: creates the record
    /// when absent. Topic 0 means the chat as a whole.
    pub async fn activate_topic(&self, chat_id: i64, topic_id: i64) -> Result<()> {
        match self {
            Store::Memory(s) => s.activate_topic(chat_id, topic_id),
            Store::Sqlite(s) => s.activate_topic(chat_id, topic_id).await,
        }
    }

    /// Turn translation off. A deactivate on a never-activated topic is a
    /// no-op, not an error, and creates no record.
    pub async fn deactivate_topic(&self, chat_id: i64, topic_id: i64) -> Result<()> {
        match self {
            Store::Memory(s) => s.deactivate_topic(chat_id, topic_id),
            Store::Sqlite(s) => s.deactivate_topic(chat_id, topic_id).await,
        }
    }

    /// Whether translation is active for a (chat, topic). Defaults to false
    /// for anything never explicitly activated.
    pub async fn is_topic_active(&self, chat_id: i64, topic_id: i64) -> Result<bool> {
        match self {
            Store::Memory(s) => s.is_topic_active(chat_id, topic_id),
            Store::Sqlite(s) => s.is_topic_active(chat_id, topic_id).await,
        }
    }
}
