use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;
use crate::db::queries::stock_requests::*;

pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/requests", post(create_stock_request).get(list_stock_requests))
        .route("/requests/{request_id}", get(get_stock_request))
        .route("/requests/{request_id}/approve", post(approve_stock_request))
        .route("/requests/{request_id}/reject", post(reject_stock_request))
}
