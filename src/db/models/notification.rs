// src/db/models/notification.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_channel", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    InApp,
    Whatsapp,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, FromRow, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    /// Recipient profile; `None` for messages sent to a raw address.
    pub profile_id: Option<Uuid>,
    pub title: String,
    pub message: String,
    pub channel: NotificationChannel,
    pub sent: bool,
    pub created_at: DateTime<Utc>,
}
