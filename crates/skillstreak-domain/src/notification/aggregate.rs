use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::{NewNotification, NotificationKind};
use crate::shared::{DomainError, NotificationId, UserId};

/// Persisted in-app notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    recipient_id: UserId,
    kind: NotificationKind,
    title: String,
    message: String,
    data: serde_json::Value,
    read: bool,
    created_at: DateTime<Utc>,
}

impl Notification {
    /// Create a new unread notification
    pub fn new(payload: NewNotification) -> Result<Self, DomainError> {
        payload.validate()?;

        Ok(Self {
            id: NotificationId::new(),
            recipient_id: payload.recipient_id,
            kind: payload.kind,
            title: payload.title,
            message: payload.message,
            data: payload.data,
            read: false,
            created_at: Utc::now(),
        })
    }

    /// Reconstruct from persistence
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: NotificationId,
        recipient_id: UserId,
        kind: NotificationKind,
        title: String,
        message: String,
        data: serde_json::Value,
        read: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            recipient_id,
            kind,
            title,
            message,
            data,
            read,
            created_at,
        }
    }

    // Getters
    pub fn id(&self) -> &NotificationId {
        &self.id
    }

    pub fn recipient_id(&self) -> &UserId {
        &self.recipient_id
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn mark_read(&mut self) {
        self.read = true;
    }
}
