//! SQLite chat exchange log.
//!
//! `record_exchange` appends the log row and charges the profile in a single
//! transaction, so a logged exchange is always counted and vice versa.

use chrono::Utc;
use rafway_core::chat::repository::ChatLogRepository;
use rafway_types::chat::ChatExchange;
use rafway_types::error::RepositoryError;
use rafway_types::profile::{Profile, UserId};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::profile::ProfileRow;
use super::{format_datetime, parse_datetime};

pub struct SqliteChatLogRepository {
    pool: DatabasePool,
}

impl SqliteChatLogRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ExchangeRow {
    id: String,
    uid: String,
    text: String,
    response: String,
    created_at: String,
}

impl ExchangeRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            uid: row.try_get("uid")?,
            text: row.try_get("text")?,
            response: row.try_get("response")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_exchange(self) -> Result<ChatExchange, RepositoryError> {
        Ok(ChatExchange {
            id: Uuid::parse_str(&self.id)
                .map_err(|e| RepositoryError::Query(format!("invalid exchange id: {e}")))?,
            uid: self
                .uid
                .parse::<UserId>()
                .map_err(|e| RepositoryError::Query(format!("invalid uid: {e}")))?,
            text: self.text,
            response: self.response,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl ChatLogRepository for SqliteChatLogRepository {
    async fn record_exchange(&self, exchange: &ChatExchange) -> Result<Profile, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let updated = sqlx::query(
            "UPDATE profiles SET message_count = message_count + 1, last_active_at = ? WHERE uid = ?",
        )
        .bind(format_datetime(&Utc::now()))
        .bind(exchange.uid.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls it back
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            "INSERT INTO chat_exchanges (id, uid, text, response, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(exchange.id.to_string())
        .bind(exchange.uid.to_string())
        .bind(&exchange.text)
        .bind(&exchange.response)
        .bind(format_datetime(&exchange.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let row = sqlx::query("SELECT * FROM profiles WHERE uid = ?")
            .bind(exchange.uid.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let profile = ProfileRow::from_row(&row)
            .map_err(|e| RepositoryError::Query(e.to_string()))?
            .into_profile()?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(profile)
    }

    async fn list_exchanges(
        &self,
        uid: &UserId,
        limit: i64,
    ) -> Result<Vec<ChatExchange>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chat_exchanges WHERE uid = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(uid.to_string())
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                ExchangeRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_exchange()
            })
            .collect()
    }
}
