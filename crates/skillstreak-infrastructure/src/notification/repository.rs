use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

use skillstreak_domain::notification::{
    NewNotification, Notification, NotificationKind, NotificationRepository,
};
use skillstreak_domain::shared::{DomainError, NotificationId, UserId};

use crate::persistence::RepositoryErrorMapper;

#[derive(FromRow)]
struct NotificationRow {
    id: String,
    recipient_id: String,
    kind: String,
    title: String,
    message: String,
    data: String,
    read: bool,
    created_at: DateTime<Utc>,
}

impl NotificationRow {
    #[allow(clippy::wrong_self_convention)]
    fn to_domain(self) -> Result<Notification, DomainError> {
        let kind = NotificationKind::from_str(&self.kind)?;
        let data = serde_json::from_str(&self.data).map_err(|e| {
            DomainError::Deserialization(format!("notification {} data: {}", self.id, e))
        })?;

        Ok(Notification::from_persistence(
            NotificationId::from_string(&self.id),
            UserId::from_string(&self.recipient_id),
            kind,
            self.title,
            self.message,
            data,
            self.read,
            self.created_at,
        ))
    }
}

pub struct SqliteNotificationRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteNotificationRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepository {
    async fn create(&self, payload: NewNotification) -> Result<Notification, DomainError> {
        let notification = Notification::new(payload)?;
        let data_json = serde_json::to_string(notification.data())
            .map_err(|e| DomainError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO notifications (id, recipient_id, kind, title, message, data, read, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(notification.id().as_str())
        .bind(notification.recipient_id().as_str())
        .bind(notification.kind().as_str())
        .bind(notification.title())
        .bind(notification.message())
        .bind(&data_json)
        .bind(notification.is_read())
        .bind(notification.created_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "notifications"))?;

        Ok(notification)
    }

    async fn find_by_recipient(
        &self,
        recipient_id: &UserId,
    ) -> Result<Vec<Notification>, DomainError> {
        let rows: Vec<NotificationRow> = sqlx::query_as(
            r#"
            SELECT id, recipient_id, kind, title, message, data, read, created_at
            FROM notifications
            WHERE recipient_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(recipient_id.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "notifications"))?;

        rows.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?1")
            .bind(id.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "notifications"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("Notification {}", id)));
        }

        Ok(())
    }
}
