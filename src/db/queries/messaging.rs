use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::models::notification::NotificationChannel;
use crate::db::store::{ActivityStore, RequestStore};
use crate::utils::messaging::request_summary;
use crate::utils::notification::NotificationBuilder;

/// Either a stock request to summarize or a raw message.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum SendMessageRequest {
    Request {
        #[serde(rename = "requestId")]
        request_id: Uuid,
    },
    Direct {
        to: String,
        message: String,
    },
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendMessageResponse {
    pub success: bool,
    pub message: String,
    pub recipient: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageError {
    pub error: String,
    pub details: String,
}

type MessageFailure = (StatusCode, Json<MessageError>);

fn failure(status: StatusCode, error: impl Into<String>, details: impl Into<String>) -> MessageFailure {
    (
        status,
        Json(MessageError { error: error.into(), details: details.into() }),
    )
}

/// Outbound message function.
///
/// Logs the message and records it as a sent `whatsapp` notification.
#[utoipa::path(
    post,
    path = "/functions/send-whatsapp-message",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message sent", body = SendMessageResponse),
        (status = 400, description = "Malformed payload", body = MessageError),
        (status = 415, description = "Body is not declared as JSON", body = MessageError),
        (status = 404, description = "Stock request not found", body = MessageError),
        (status = 500, description = "Failed to record message", body = MessageError)
    ),
    tag = "Functions",
    security(("bearerAuth" = []))
)]
pub async fn send_whatsapp_message(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, MessageFailure> {
    let Json(body) = body.map_err(|rejection| {
        failure(
            rejection.status(),
            "Request body must be a JSON object",
            rejection.body_text(),
        )
    })?;
    let payload: SendMessageRequest = serde_json::from_value(body).map_err(|e| {
        failure(
            StatusCode::BAD_REQUEST,
            "Expected either requestId or to and message",
            e.to_string(),
        )
    })?;

    let (recipient, content, profile_id) = match payload {
        SendMessageRequest::Request { request_id } => {
            let view = state
                .store
                .get_request_view(request_id)
                .await
                .map_err(|e| failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load stock request", e.to_string()))?
                .ok_or_else(|| {
                    failure(
                        StatusCode::NOT_FOUND,
                        "Stock request not found",
                        format!("no stock request with id {request_id}"),
                    )
                })?;
            (
                state.messenger.default_recipient().to_string(),
                request_summary(&view),
                Some(view.request.requested_by),
            )
        }
        SendMessageRequest::Direct { to, message } => {
            let (to, message) = (to.trim().to_string(), message.trim().to_string());
            if to.is_empty() || message.is_empty() {
                return Err(failure(
                    StatusCode::BAD_REQUEST,
                    "Missing recipient or message",
                    "both to and message must be non-empty",
                ));
            }
            (to, message, None)
        }
    };

    state.messenger.dispatch(&recipient, &content);

    let mut builder = NotificationBuilder::new(format!("WhatsApp message to {recipient}"), content.clone())
        .channel(NotificationChannel::Whatsapp)
        .sent(true);
    if let Some(profile_id) = profile_id {
        builder = builder.target_profile(profile_id);
    }
    state
        .store
        .insert_notification(&builder.build(Utc::now()))
        .await
        .map_err(|e| {
            error!("Failed to record outbound message: {e}");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to record message", e.to_string())
        })?;

    Ok(Json(SendMessageResponse {
        success: true,
        message: "Message sent successfully".to_string(),
        recipient,
        content,
    }))
}

#[derive(OpenApi)]
#[openapi(
    paths(send_whatsapp_message),
    components(schemas(SendMessageRequest, SendMessageResponse, MessageError)),
    tags((name = "Functions", description = "Outbound messaging function"))
)]
pub struct MessagingDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_accepts_request_id_or_direct_message() {
        let id = Uuid::new_v4();
        let parsed: SendMessageRequest = serde_json::from_value(json!({ "requestId": id })).unwrap();
        assert!(matches!(parsed, SendMessageRequest::Request { request_id } if request_id == id));

        let parsed: SendMessageRequest =
            serde_json::from_value(json!({ "to": "+254711000000", "message": "Chalk delivered" })).unwrap();
        assert!(matches!(parsed, SendMessageRequest::Direct { ref to, .. } if to == "+254711000000"));

        assert!(serde_json::from_value::<SendMessageRequest>(json!({ "to": "+254711000000" })).is_err());
    }
}
