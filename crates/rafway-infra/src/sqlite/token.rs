//! SQLite bearer token repository.

use chrono::Utc;
use rafway_core::auth::repository::TokenRepository;
use rafway_types::error::RepositoryError;
use rafway_types::profile::UserId;
use sqlx::Row;
use uuid::Uuid;

use super::format_datetime;
use super::pool::DatabasePool;

pub struct SqliteTokenRepository {
    pool: DatabasePool,
}

impl SqliteTokenRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl TokenRepository for SqliteTokenRepository {
    async fn insert(&self, uid: &UserId, token_hash: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO auth_tokens (id, uid, token_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(uid.to_string())
        .bind(token_hash)
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.message().contains("FOREIGN KEY") => {
                RepositoryError::NotFound
            }
            other => RepositoryError::Query(other.to_string()),
        })?;
        Ok(())
    }

    async fn find_user(&self, token_hash: &str) -> Result<Option<UserId>, RepositoryError> {
        let row = sqlx::query("SELECT id, uid FROM auth_tokens WHERE token_hash = ?")
            .bind(token_hash)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: String = row
            .try_get("id")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let uid: String = row
            .try_get("uid")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Update last_used_at (best effort, don't fail the lookup)
        let _ = sqlx::query("UPDATE auth_tokens SET last_used_at = ? WHERE id = ?")
            .bind(format_datetime(&Utc::now()))
            .bind(&id)
            .execute(&self.pool.writer)
            .await;

        uid.parse::<UserId>()
            .map(Some)
            .map_err(|e| RepositoryError::Query(format!("invalid uid: {e}")))
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::profile::SqliteProfileRepository;
    use crate::sqlite::test_pool;
    use rafway_core::profile::repository::ProfileRepository;
    use rafway_types::profile::Profile;

    #[tokio::test]
    async fn test_insert_find_revoke() {
        let pool = test_pool().await;
        let profiles = SqliteProfileRepository::new(pool.clone());
        let tokens = SqliteTokenRepository::new(pool.clone());

        let profile = Profile::new(UserId::new(), None, None, None);
        profiles.create(&profile).await.unwrap();

        tokens.insert(&profile.uid, "abc123").await.unwrap();
        assert_eq!(tokens.find_user("abc123").await.unwrap(), Some(profile.uid.clone()));

        let last_used: (Option<String>,) =
            sqlx::query_as("SELECT last_used_at FROM auth_tokens WHERE token_hash = 'abc123'")
                .fetch_one(&pool.reader)
                .await
                .unwrap();
        assert!(last_used.0.is_some());

        assert!(tokens.revoke("abc123").await.unwrap());
        assert!(tokens.find_user("abc123").await.unwrap().is_none());
        assert!(!tokens.revoke("abc123").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_for_unknown_user() {
        let tokens = SqliteTokenRepository::new(test_pool().await);
        let result = tokens.insert(&UserId::new(), "abc123").await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }
}
