//! SQLite profile repository implementation.
//!
//! Implements `ProfileRepository` from `rafway-core` using sqlx with split read/write pools.

use rafway_core::profile::repository::ProfileRepository;
use rafway_types::error::RepositoryError;
use rafway_types::profile::{Profile, UserId};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `ProfileRepository`.
pub struct SqliteProfileRepository {
    pool: DatabasePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Profile.
pub(crate) struct ProfileRow {
    uid: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    is_premium: bool,
    message_count: i64,
    created_at: String,
    last_active_at: Option<String>,
}

impl ProfileRow {
    pub(crate) fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            uid: row.try_get("uid")?,
            email: row.try_get("email")?,
            display_name: row.try_get("display_name")?,
            photo_url: row.try_get("photo_url")?,
            is_premium: row.try_get("is_premium")?,
            message_count: row.try_get("message_count")?,
            created_at: row.try_get("created_at")?,
            last_active_at: row.try_get("last_active_at")?,
        })
    }

    pub(crate) fn into_profile(self) -> Result<Profile, RepositoryError> {
        let uid = self
            .uid
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid uid: {e}")))?;

        let message_count = u32::try_from(self.message_count)
            .map_err(|e| RepositoryError::Query(format!("invalid message_count: {e}")))?;

        Ok(Profile {
            uid,
            email: self.email,
            display_name: self.display_name,
            photo_url: self.photo_url,
            is_premium: self.is_premium,
            message_count,
            created_at: parse_datetime(&self.created_at)?,
            last_active_at: self
                .last_active_at
                .as_deref()
                .map(parse_datetime)
                .transpose()?,
        })
    }
}

fn map_row(row: Option<sqlx::sqlite::SqliteRow>) -> Result<Option<Profile>, RepositoryError> {
    match row {
        Some(row) => {
            let profile_row =
                ProfileRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            Ok(Some(profile_row.into_profile()?))
        }
        None => Ok(None),
    }
}

impl ProfileRepository for SqliteProfileRepository {
    async fn create(&self, profile: &Profile) -> Result<Profile, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO profiles (uid, email, display_name, photo_url, is_premium, message_count, created_at, last_active_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(profile.uid.to_string())
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(&profile.photo_url)
        .bind(profile.is_premium)
        .bind(i64::from(profile.message_count))
        .bind(format_datetime(&profile.created_at))
        .bind(profile.last_active_at.as_ref().map(format_datetime))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(profile.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                Err(RepositoryError::Conflict(format!(
                    "profile '{}' already exists",
                    profile.email.clone().unwrap_or_else(|| profile.uid.to_string())
                )))
            }
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn get(&self, uid: &UserId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM profiles WHERE uid = ?")
            .bind(uid.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        map_row(row)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM profiles WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        map_row(row)
    }

    async fn save(&self, profile: &Profile) -> Result<(), RepositoryError> {
        // MAX() keeps the counter monotonic against stale writes
        let result = sqlx::query(
            "UPDATE profiles
             SET email = ?, display_name = ?, photo_url = ?, is_premium = ?,
                 message_count = MAX(message_count, ?),
                 last_active_at = COALESCE(?, last_active_at)
             WHERE uid = ?",
        )
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(&profile.photo_url)
        .bind(profile.is_premium)
        .bind(i64::from(profile.message_count))
        .bind(profile.last_active_at.as_ref().map(format_datetime))
        .bind(profile.uid.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn increment_message_count(&self, uid: &UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE profiles
             SET message_count = message_count + 1, last_active_at = ?
             WHERE uid = ?",
        )
        .bind(format_datetime(&chrono::Utc::now()))
        .bind(uid.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_pool;

    fn make_profile(email: Option<&str>) -> Profile {
        Profile::new(
            UserId::new(),
            email.map(String::from),
            Some("Léa Martin".to_string()),
            None,
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        let profile = make_profile(Some("lea@example.com"));
        repo.create(&profile).await.unwrap();

        let fetched = repo.get(&profile.uid).await.unwrap().unwrap();
        assert_eq!(fetched.uid, profile.uid);
        assert_eq!(fetched.display_name.as_deref(), Some("Léa Martin"));
        assert!(!fetched.is_premium);
        assert_eq!(fetched.message_count, 0);
        assert!(fetched.last_active_at.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        assert!(repo.get(&UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_email() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        let profile = make_profile(Some("lea@example.com"));
        repo.create(&profile).await.unwrap();

        let fetched = repo.get_by_email("lea@example.com").await.unwrap().unwrap();
        assert_eq!(fetched.uid, profile.uid);
        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        repo.create(&make_profile(Some("lea@example.com"))).await.unwrap();

        let result = repo.create(&make_profile(Some("lea@example.com"))).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_anonymous_profiles_do_not_conflict() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        repo.create(&make_profile(None)).await.unwrap();
        repo.create(&make_profile(None)).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_updates_plan_and_counter() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        let mut profile = make_profile(None);
        repo.create(&profile).await.unwrap();

        profile.message_count = 3;
        profile.is_premium = true;
        repo.save(&profile).await.unwrap();

        let fetched = repo.get(&profile.uid).await.unwrap().unwrap();
        assert_eq!(fetched.message_count, 3);
        assert!(fetched.is_premium);
    }

    #[tokio::test]
    async fn test_save_never_lowers_counter() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        let mut profile = make_profile(None);
        profile.message_count = 4;
        repo.create(&profile).await.unwrap();

        profile.message_count = 2;
        repo.save(&profile).await.unwrap();

        let fetched = repo.get(&profile.uid).await.unwrap().unwrap();
        assert_eq!(fetched.message_count, 4);
    }

    #[tokio::test]
    async fn test_save_missing_profile() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        let result = repo.save(&make_profile(None)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_increment_keeps_concurrent_charges() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        let mut profile = make_profile(None);
        profile.message_count = 1;
        repo.create(&profile).await.unwrap();

        // Two writers that each read the profile at 1
        repo.increment_message_count(&profile.uid).await.unwrap();
        repo.increment_message_count(&profile.uid).await.unwrap();

        let fetched = repo.get(&profile.uid).await.unwrap().unwrap();
        assert_eq!(fetched.message_count, 3);
        assert!(fetched.last_active_at.is_some());
    }

    #[tokio::test]
    async fn test_increment_missing_profile() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        let result = repo.increment_message_count(&UserId::new()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }
}
