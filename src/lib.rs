//! School store backend: stock-request approvals over an inventory catalogue.

use axum::middleware::from_fn_with_state;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_swagger_ui::SwaggerUi;

pub mod api;
pub mod app_state;
pub mod config;
pub mod db;
pub mod lifecycle;
pub mod middleware;
pub mod utils;

use crate::api::auth::AuthDoc;
use crate::app_state::AppState;
use crate::db::queries::activity::ActivityDoc;
use crate::db::queries::catalog::CatalogDoc;
use crate::db::queries::messaging::MessagingDoc;
use crate::db::queries::stock_requests::StockRequestDoc;
use crate::middleware::auth::{jwt_middleware, profile_middleware};

pub fn api_doc() -> utoipa::openapi::OpenApi {
    AuthDoc::openapi()
        .merge_from(StockRequestDoc::openapi())
        .merge_from(CatalogDoc::openapi())
        .merge_from(ActivityDoc::openapi())
        .merge_from(MessagingDoc::openapi())
}

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new().merge(api::auth::auth_routes());

    // Layers run bottom-up: JWT first, then the profile lookup.
    let private_routes = Router::new()
        .merge(api::requests::request_routes())
        .merge(api::catalog::catalog_routes())
        .merge(api::activity::activity_routes())
        .merge(api::messaging::messaging_routes())
        .merge(api::auth::secure_auth_routes())
        .route_layer(from_fn_with_state(state.clone(), profile_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_middleware));

    let doc = api_doc();
    Router::new()
        .merge(api::health::health_routes())
        .merge(public_routes)
        .merge(private_routes)
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", doc.clone()))
        .merge(RapiDoc::with_openapi("/api-docs/rapidoc.json", doc).path("/rapidoc"))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
