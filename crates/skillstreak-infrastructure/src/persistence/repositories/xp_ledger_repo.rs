use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::persistence::ResultExt;
use skillstreak_domain::shared::{DomainError, UserId};
use skillstreak_domain::xp::{XpLedger, XpSource, XpTransaction};

pub struct SqliteXpLedger {
    pool: Arc<SqlitePool>,
}

impl SqliteXpLedger {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl XpLedger for SqliteXpLedger {
    async fn award_xp(
        &self,
        user_id: &UserId,
        amount: i64,
        source: XpSource,
        reference_id: &str,
        description: &str,
    ) -> Result<XpTransaction, DomainError> {
        let entry = XpTransaction::new(user_id.clone(), amount, source, reference_id, description)?;

        sqlx::query(
            r#"
            INSERT INTO xp_transactions (id, user_id, amount, source, reference_id, description, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(entry.id.as_str())
        .bind(entry.user_id.as_str())
        .bind(entry.amount)
        .bind(entry.source.as_str())
        .bind(&entry.reference_id)
        .bind(&entry.description)
        .bind(entry.created_at)
        .execute(&*self.pool)
        .await
        .map_repo_error("Award XP")?;

        Ok(entry)
    }

    async fn total_for_user(&self, user_id: &UserId) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM xp_transactions WHERE user_id = ?1")
            .bind(user_id.as_str())
            .fetch_one(&*self.pool)
            .await
            .map_repo_error("Sum XP")
    }
}
