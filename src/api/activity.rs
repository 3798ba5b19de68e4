use axum::{routing::get, Router};

use crate::app_state::AppState;
use crate::db::queries::activity::*;

pub fn activity_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(get_notifications))
        .route("/audit-logs", get(get_audit_logs))
}
