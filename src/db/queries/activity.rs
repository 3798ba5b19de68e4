use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};

use crate::app_state::AppState;
use crate::db::models::audit_log::AuditLog;
use crate::db::models::notification::{Notification, NotificationChannel};
use crate::db::models::profile::Profile;
use crate::db::store::ActivityStore;
use crate::middleware::auth::require_admin;
use crate::utils::api_response::ApiResponse;

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditLogQuery {
    /// Defaults to 100, capped at 500.
    pub limit: Option<u32>,
}

/// Notifications addressed to the caller, newest first
#[utoipa::path(
    get,
    path = "/notifications",
    responses(
        (status = 200, description = "Notifications retrieved successfully", body = Vec<Notification>),
        (status = 500, description = "Failed to retrieve notifications")
    ),
    tag = "Notifications",
    security(("bearerAuth" = []))
)]
pub async fn get_notifications(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
) -> Result<ApiResponse<Vec<Notification>>, ApiResponse<()>> {
    let notifications = state.store.list_notifications(profile.id).await?;
    Ok(ApiResponse::success(StatusCode::OK, "Notifications retrieved", notifications))
}

#[utoipa::path(
    get,
    path = "/audit-logs",
    params(AuditLogQuery),
    responses(
        (status = 200, description = "Audit trail, newest first", body = Vec<AuditLog>),
        (status = 403, description = "Administrator access required")
    ),
    tag = "Audit",
    security(("bearerAuth" = []))
)]
pub async fn get_audit_logs(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Query(query): Query<AuditLogQuery>,
) -> Result<ApiResponse<Vec<AuditLog>>, ApiResponse<()>> {
    require_admin(&profile)?;
    let limit = query.limit.unwrap_or(100).clamp(1, 500);
    let logs = state.store.list_audit_logs(limit).await?;
    Ok(ApiResponse::success(StatusCode::OK, "Audit logs retrieved", logs))
}

#[derive(OpenApi)]
#[openapi(
    paths(get_notifications, get_audit_logs),
    components(schemas(Notification, NotificationChannel, AuditLog)),
    tags(
        (name = "Notifications", description = "In-app and outbound notifications"),
        (name = "Audit", description = "Append-only audit trail")
    )
)]
pub struct ActivityDoc;
