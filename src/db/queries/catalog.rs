use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};

use crate::app_state::AppState;
use crate::db::models::catalog::{
    Asset, AssetValuation, AssetValuationReport, CategoryValuation, InventorySummary, Item,
    ItemFilter, Store, Supplier,
};
use crate::db::store::CatalogStore;
use crate::utils::api_response::ApiResponse;

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ValuationQuery {
    /// Valuation date; defaults to today (UTC).
    pub as_of: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/items",
    params(ItemFilter),
    responses(
        (status = 200, description = "Inventory items", body = Vec<Item>),
        (status = 500, description = "Failed to retrieve items")
    ),
    tag = "Inventory",
    security(("bearerAuth" = []))
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(filter): Query<ItemFilter>,
) -> Result<ApiResponse<Vec<Item>>, ApiResponse<()>> {
    let items = state.store.list_items(&filter).await?;
    Ok(ApiResponse::success(StatusCode::OK, "Items retrieved", items))
}

#[utoipa::path(
    get,
    path = "/items/summary",
    responses(
        (status = 200, description = "Inventory totals", body = InventorySummary),
        (status = 500, description = "Failed to compute summary")
    ),
    tag = "Inventory",
    security(("bearerAuth" = []))
)]
pub async fn inventory_summary(
    State(state): State<AppState>,
) -> Result<ApiResponse<InventorySummary>, ApiResponse<()>> {
    let summary = state.store.inventory_summary().await?;
    Ok(ApiResponse::success(StatusCode::OK, "Inventory summary", summary))
}

#[utoipa::path(
    get,
    path = "/stores",
    responses(
        (status = 200, description = "Stores", body = Vec<Store>),
        (status = 500, description = "Failed to retrieve stores")
    ),
    tag = "Inventory",
    security(("bearerAuth" = []))
)]
pub async fn list_stores(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Store>>, ApiResponse<()>> {
    let stores = state.store.list_stores().await?;
    Ok(ApiResponse::success(StatusCode::OK, "Stores retrieved", stores))
}

#[utoipa::path(
    get,
    path = "/suppliers",
    responses(
        (status = 200, description = "Suppliers", body = Vec<Supplier>),
        (status = 500, description = "Failed to retrieve suppliers")
    ),
    tag = "Inventory",
    security(("bearerAuth" = []))
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Supplier>>, ApiResponse<()>> {
    let suppliers = state.store.list_suppliers().await?;
    Ok(ApiResponse::success(StatusCode::OK, "Suppliers retrieved", suppliers))
}

#[utoipa::path(
    get,
    path = "/assets",
    responses(
        (status = 200, description = "Assets", body = Vec<Asset>),
        (status = 500, description = "Failed to retrieve assets")
    ),
    tag = "Inventory",
    security(("bearerAuth" = []))
)]
pub async fn list_assets(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Asset>>, ApiResponse<()>> {
    let assets = state.store.list_assets().await?;
    Ok(ApiResponse::success(StatusCode::OK, "Assets retrieved", assets))
}

#[utoipa::path(
    get,
    path = "/assets/valuation",
    params(ValuationQuery),
    responses(
        (status = 200, description = "Depreciated asset values", body = AssetValuationReport),
        (status = 500, description = "Failed to retrieve assets")
    ),
    tag = "Inventory",
    security(("bearerAuth" = []))
)]
pub async fn asset_valuation(
    State(state): State<AppState>,
    Query(query): Query<ValuationQuery>,
) -> Result<ApiResponse<AssetValuationReport>, ApiResponse<()>> {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let assets = state.store.list_assets().await?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Asset valuation",
        AssetValuationReport::build(assets, as_of),
    ))
}

#[derive(OpenApi)]
#[openapi(
    paths(list_items, inventory_summary, list_stores, list_suppliers, list_assets, asset_valuation),
    components(schemas(
        Item,
        InventorySummary,
        Store,
        Supplier,
        Asset,
        AssetValuation,
        AssetValuationReport,
        CategoryValuation
    )),
    tags((name = "Inventory", description = "Items, stores, suppliers and assets"))
)]
pub struct CatalogDoc;
