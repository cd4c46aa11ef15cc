use async_trait::async_trait;

use super::aggregate::Notification;
use super::value_objects::NewNotification;
use crate::shared::{DomainError, NotificationId, UserId};

/// Durable notification store
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Persist a new notification and return it
    async fn create(&self, notification: NewNotification) -> Result<Notification, DomainError>;

    /// Notifications for a recipient, newest first
    async fn find_by_recipient(&self, recipient_id: &UserId)
        -> Result<Vec<Notification>, DomainError>;

    async fn mark_read(&self, id: &NotificationId) -> Result<(), DomainError>;
}
