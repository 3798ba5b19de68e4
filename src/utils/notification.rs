use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::models::notification::{Notification, NotificationChannel};
use crate::db::models::stock_request::StockRequest;

/// Notification builder for system notifications
pub struct NotificationBuilder {
    title: String,
    message: String,
    profile_id: Option<Uuid>,
    channel: NotificationChannel,
    sent: bool,
}

impl NotificationBuilder {
    /// Create a new in-app notification with the required fields
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            profile_id: None,
            channel: NotificationChannel::InApp,
            sent: false,
        }
    }

    /// Address the notification to a profile
    pub fn target_profile(mut self, profile_id: Uuid) -> Self {
        self.profile_id = Some(profile_id);
        self
    }

    pub fn channel(mut self, channel: NotificationChannel) -> Self {
        self.channel = channel;
        self
    }

    /// Mark the notification as already delivered
    pub fn sent(mut self, sent: bool) -> Self {
        self.sent = sent;
        self
    }

    pub fn build(self, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            profile_id: self.profile_id,
            title: self.title,
            message: self.message,
            channel: self.channel,
            sent: self.sent,
            created_at,
        }
    }
}

/// Tell the requester how their request was decided.
pub fn decision_notification(request: &StockRequest, comments: Option<&str>) -> NotificationBuilder {
    let mut message = format!(
        "Your {} request for {} unit(s) was {}.",
        request.request_type.as_str().replace('_', " "),
        request.quantity,
        request.status
    );
    if let Some(comments) = comments.map(str::trim).filter(|c| !c.is_empty()) {
        message.push_str(&format!(" Comments: {comments}"));
    }

    NotificationBuilder::new(format!("Stock request {}", request.status), message)
        .target_profile(request.requested_by)
}
