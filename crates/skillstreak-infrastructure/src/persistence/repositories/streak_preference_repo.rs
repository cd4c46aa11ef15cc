use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::persistence::ResultExt;
use skillstreak_domain::shared::{DomainError, UserId};
use skillstreak_domain::streak::StreakPreferenceRepository;

pub struct SqliteStreakPreferenceRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteStreakPreferenceRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StreakPreferenceRepository for SqliteStreakPreferenceRepository {
    async fn auto_freeze_enabled(&self, user_id: &UserId) -> Result<Option<bool>, DomainError> {
        sqlx::query_scalar(
            "SELECT auto_freeze_enabled FROM user_streak_preferences WHERE user_id = ?1",
        )
        .bind(user_id.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_repo_error("Load streak preference")
    }

    async fn set_auto_freeze(&self, user_id: &UserId, enabled: bool) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO user_streak_preferences (user_id, auto_freeze_enabled, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id) DO UPDATE SET
                auto_freeze_enabled = ?2,
                updated_at = ?3
            "#,
        )
        .bind(user_id.as_str())
        .bind(enabled)
        .bind(Utc::now())
        .execute(&*self.pool)
        .await
        .map_repo_error("Save streak preference")?;

        Ok(())
    }
}
