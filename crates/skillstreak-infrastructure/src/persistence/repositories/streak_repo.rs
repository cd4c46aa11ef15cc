use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

use crate::persistence::{ResultExt, SqliteUnitOfWork};
use skillstreak_domain::shared::transaction::{TransactionContext, UnitOfWork};
use skillstreak_domain::shared::{DomainError, UserId};
use skillstreak_domain::streak::{
    StreakKey, StreakRecord, StreakRepository, StreakType, Transition, TransitionFn,
    TransitionKind,
};

const SELECT_COLUMNS: &str = "SELECT user_id, streak_type, current_streak, longest_streak, \
     last_activity, freezes_used, max_freezes, last_freeze_at, created_at, updated_at, version \
     FROM user_streaks";

#[derive(FromRow)]
struct StreakRow {
    user_id: String,
    streak_type: String,
    current_streak: i64,
    longest_streak: i64,
    last_activity: DateTime<Utc>,
    freezes_used: i64,
    max_freezes: i64,
    last_freeze_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

fn counter(value: i64, column: &str) -> Result<u32, DomainError> {
    u32::try_from(value).map_err(|_| {
        DomainError::DataIntegrity(format!("user_streaks.{} out of range: {}", column, value))
    })
}

impl StreakRow {
    fn into_record(self) -> Result<StreakRecord, DomainError> {
        StreakRecord::restore(
            UserId::from_string(&self.user_id),
            StreakType::from_str(&self.streak_type)?,
            counter(self.current_streak, "current_streak")?,
            counter(self.longest_streak, "longest_streak")?,
            self.last_activity,
            counter(self.freezes_used, "freezes_used")?,
            counter(self.max_freezes, "max_freezes")?,
            self.last_freeze_at,
            self.created_at,
            self.updated_at,
            self.version,
        )
    }
}

pub struct SqliteStreakRepository {
    pool: Arc<SqlitePool>,
    uow: SqliteUnitOfWork,
}

impl SqliteStreakRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            uow: SqliteUnitOfWork::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl StreakRepository for SqliteStreakRepository {
    async fn transact(
        &self,
        key: &StreakKey,
        compute: &TransitionFn<'_>,
    ) -> Result<Transition, DomainError> {
        let document_id = key.document_id();
        let mut tx = self.uow.begin().await?;

        let row: Option<StreakRow> = sqlx::query_as(&format!("{} WHERE id = ?1", SELECT_COLUMNS))
            .bind(&document_id)
            .fetch_optional(tx.connection())
            .await
            .map_repo_error("Load streak")?;
        let existing = row.map(StreakRow::into_record).transpose()?;

        let transition = compute(existing.as_ref());

        if !transition.kind.requires_write() {
            tx.rollback().await.map_repo_error("Release streak transaction")?;
            return Ok(transition);
        }

        let record = &transition.record;
        let update_of = match (&transition.kind, &existing) {
            (TransitionKind::Started, _) => None,
            (_, Some(previous)) if record.version() == previous.version() + 1 => Some(previous),
            (_, Some(previous)) => {
                tx.rollback().await.map_repo_error("Rollback streak write")?;
                return Err(DomainError::DataIntegrity(format!(
                    "streak {} write must advance version {} by one, got {}",
                    document_id,
                    previous.version(),
                    record.version()
                )));
            }
            (_, None) => {
                tx.rollback().await.map_repo_error("Rollback streak write")?;
                return Err(DomainError::DataIntegrity(format!(
                    "streak {} has no stored record to update",
                    document_id
                )));
            }
        };

        let result = match update_of {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO user_streaks (
                        id, user_id, streak_type, current_streak, longest_streak,
                        last_activity, freezes_used, max_freezes, last_freeze_at,
                        created_at, updated_at, version
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(&document_id)
                .bind(record.user_id().as_str())
                .bind(record.streak_type().as_str())
                .bind(record.current_streak() as i64)
                .bind(record.longest_streak() as i64)
                .bind(record.last_activity())
                .bind(record.freezes_used() as i64)
                .bind(record.max_freezes() as i64)
                .bind(record.last_freeze_at())
                .bind(record.created_at())
                .bind(record.updated_at())
                .bind(record.version())
                .execute(tx.connection())
                .await
            }
            Some(previous) => {
                sqlx::query(
                    r#"
                    UPDATE user_streaks SET
                        current_streak = ?1,
                        longest_streak = ?2,
                        last_activity = ?3,
                        freezes_used = ?4,
                        last_freeze_at = ?5,
                        updated_at = ?6,
                        version = ?7
                    WHERE id = ?8 AND version = ?9
                    "#,
                )
                .bind(record.current_streak() as i64)
                .bind(record.longest_streak() as i64)
                .bind(record.last_activity())
                .bind(record.freezes_used() as i64)
                .bind(record.last_freeze_at())
                .bind(record.updated_at())
                .bind(record.version())
                .bind(&document_id)
                .bind(previous.version())
                .execute(tx.connection())
                .await
            }
        }
        .map_repo_error("Write streak")?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_repo_error("Rollback streak write")?;
            return Err(DomainError::Conflict(format!(
                "streak {} changed since it was read",
                document_id
            )));
        }

        tx.commit().await.map_repo_error("Commit streak")?;

        tracing::debug!(
            document_id = %document_id,
            kind = ?transition.kind,
            current_streak = record.current_streak(),
            version = record.version(),
            "streak committed"
        );

        Ok(transition)
    }

    async fn find(&self, key: &StreakKey) -> Result<Option<StreakRecord>, DomainError> {
        let row: Option<StreakRow> = sqlx::query_as(&format!("{} WHERE id = ?1", SELECT_COLUMNS))
            .bind(key.document_id())
            .fetch_optional(&*self.pool)
            .await
            .map_repo_error("Find streak")?;

        row.map(StreakRow::into_record).transpose()
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<StreakRecord>, DomainError> {
        let rows: Vec<StreakRow> = sqlx::query_as(&format!(
            "{} WHERE user_id = ?1 ORDER BY current_streak DESC, streak_type ASC",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_repo_error("Find streaks by user")?;

        rows.into_iter().map(StreakRow::into_record).collect()
    }
}
