//! SQLite-backed store via sqlx.
//!
//! All writes are expressed as single-statement atomic upserts so that
//! concurrent handlers never lose updates to a read-modify-write race.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database and ensure the schema exists.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .context(format!("Invalid database URL: {}", url))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to open SQLite database")?;

        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    async fn create_tables(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS active_topics (
                chat_id INTEGER NOT NULL,
                topic_id INTEGER NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                PRIMARY KEY (chat_id, topic_id)
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create active_topics table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS user_languages (
                user_id INTEGER PRIMARY KEY,
                language_code TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create user_languages table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS user_chats (
                user_id INTEGER NOT NULL,
                chat_id INTEGER NOT NULL,
                PRIMARY KEY (user_id, chat_id)
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create user_chats table")?;

        Ok(())
    }

    pub async fn set_user_language(&self, user_id: i64, lang: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_languages (user_id, language_code) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET language_code = excluded.language_code",
        )
        .bind(user_id)
        .bind(lang)
        .execute(&self.pool)
        .await
        .context("Failed to upsert user language")?;
        Ok(())
    }

    pub async fn user_language(&self, user_id: i64) -> Result<Option<String>> {
        let row = sqlx::query("SELECT language_code FROM user_languages WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query user language")?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    pub async fn register_membership(&self, user_id: i64, chat_id: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO user_chats (user_id, chat_id) VALUES (?1, ?2)")
            .bind(user_id)
            .bind(chat_id)
            .execute(&self.pool)
            .await
            .context("Failed to register chat membership")?;
        Ok(())
    }

    pub async fn languages_in_chat(&self, chat_id: i64) -> Result<HashMap<i64, String>> {
        let rows = sqlx::query(
            "SELECT uc.user_id, ul.language_code
             FROM user_chats uc
             JOIN user_languages ul ON ul.user_id = uc.user_id
             WHERE uc.chat_id = ?1",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query chat languages")?;

        Ok(rows
            .into_iter()
            .map(|r| (r.get::<i64, _>(0), r.get::<String, _>(1)))
            .collect())
    }

    pub async fn activate_topic(&self, chat_id: i64, topic_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO active_topics (chat_id, topic_id, is_active) VALUES (?1, ?2, 1)
             ON CONFLICT(chat_id, topic_id) DO UPDATE SET is_active = 1",
        )
        .bind(chat_id)
        .bind(topic_id)
        .execute(&self.pool)
        .await
        .context("Failed to activate topic")?;
        Ok(())
    }

    pub async fn deactivate_topic(&self, chat_id: i64, topic_id: i64) -> Result<()> {
        // UPDATE only: a deactivate on a never-activated topic must not
        // create a record
        sqlx::query("UPDATE active_topics SET is_active = 0 WHERE chat_id = ?1 AND topic_id = ?2")
            .bind(chat_id)
            .bind(topic_id)
            .execute(&self.pool)
            .await
            .context("Failed to deactivate topic")?;
        Ok(())
    }

    pub async fn is_topic_active(&self, chat_id: i64, topic_id: i64) -> Result<bool> {
        let row =
            sqlx::query("SELECT is_active FROM active_topics WHERE chat_id = ?1 AND topic_id = ?2")
                .bind(chat_id)
                .bind(topic_id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to query topic activation")?;
        Ok(row.map(|r| r.get::<i64, _>(0) != 0).unwrap_or(false))
    }
}
