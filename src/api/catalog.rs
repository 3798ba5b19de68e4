use axum::{routing::get, Router};

use crate::app_state::AppState;
use crate::db::queries::catalog::*;

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items))
        .route("/items/summary", get(inventory_summary))
        .route("/stores", get(list_stores))
        .route("/suppliers", get(list_suppliers))
        .route("/assets", get(list_assets))
        .route("/assets/valuation", get(asset_valuation))
}
