use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::models::approval::{Approval, Decision, DecisionRecord};
use crate::db::models::profile::Profile;
use crate::db::models::stock_request::{
    DecisionPayload, NewStockRequest, StockRequest, StockRequestDetail, StockRequestFilter,
    StockRequestStatus, StockRequestType, StockRequestView,
};
use crate::middleware::auth::require_approver;
use crate::utils::api_response::ApiResponse;

#[utoipa::path(
    post,
    path = "/requests",
    request_body = NewStockRequest,
    responses(
        (status = 201, description = "Stock request created", body = StockRequest),
        (status = 400, description = "Invalid quantity or reason"),
        (status = 404, description = "Item not found"),
        (status = 500, description = "Failed to insert stock request")
    ),
    tag = "Stock Requests",
    security(("bearerAuth" = []))
)]
pub async fn create_stock_request(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Json(payload): Json<NewStockRequest>,
) -> Result<ApiResponse<StockRequest>, ApiResponse<()>> {
    let request = state.lifecycle.create_request(payload, profile.id).await?;
    Ok(ApiResponse::success(StatusCode::CREATED, "Stock request created", request))
}

#[utoipa::path(
    get,
    path = "/requests",
    params(StockRequestFilter),
    responses(
        (status = 200, description = "Stock requests, newest first", body = Vec<StockRequestView>),
        (status = 500, description = "Failed to retrieve requests")
    ),
    tag = "Stock Requests",
    security(("bearerAuth" = []))
)]
pub async fn list_stock_requests(
    State(state): State<AppState>,
    Query(filter): Query<StockRequestFilter>,
) -> Result<ApiResponse<Vec<StockRequestView>>, ApiResponse<()>> {
    let requests = state.lifecycle.list_requests(&filter).await?;
    Ok(ApiResponse::success(StatusCode::OK, "Stock requests retrieved", requests))
}

#[utoipa::path(
    get,
    path = "/requests/{request_id}",
    params(
        ("request_id" = Uuid, Path, description = "Stock request ID")
    ),
    responses(
        (status = 200, description = "Stock request with its approvals", body = StockRequestDetail),
        (status = 404, description = "Stock request not found")
    ),
    tag = "Stock Requests",
    security(("bearerAuth" = []))
)]
pub async fn get_stock_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<ApiResponse<StockRequestDetail>, ApiResponse<()>> {
    let detail = state.lifecycle.request_detail(request_id).await?;
    Ok(ApiResponse::success(StatusCode::OK, "Stock request retrieved", detail))
}

#[utoipa::path(
    post,
    path = "/requests/{request_id}/approve",
    params(
        ("request_id" = Uuid, Path, description = "Stock request ID")
    ),
    request_body = DecisionPayload,
    responses(
        (status = 200, description = "Stock request approved", body = DecisionRecord),
        (status = 403, description = "Caller's role cannot decide requests"),
        (status = 404, description = "Stock request not found"),
        (status = 409, description = "Stock request is not pending")
    ),
    tag = "Stock Requests",
    security(("bearerAuth" = []))
)]
pub async fn approve_stock_request(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Path(request_id): Path<Uuid>,
    payload: Option<Json<DecisionPayload>>,
) -> Result<ApiResponse<DecisionRecord>, ApiResponse<()>> {
    decide(state, profile, request_id, Decision::Approved, payload).await
}

#[utoipa::path(
    post,
    path = "/requests/{request_id}/reject",
    params(
        ("request_id" = Uuid, Path, description = "Stock request ID")
    ),
    request_body = DecisionPayload,
    responses(
        (status = 200, description = "Stock request rejected", body = DecisionRecord),
        (status = 403, description = "Caller's role cannot decide requests"),
        (status = 404, description = "Stock request not found"),
        (status = 409, description = "Stock request is not pending")
    ),
    tag = "Stock Requests",
    security(("bearerAuth" = []))
)]
pub async fn reject_stock_request(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Path(request_id): Path<Uuid>,
    payload: Option<Json<DecisionPayload>>,
) -> Result<ApiResponse<DecisionRecord>, ApiResponse<()>> {
    decide(state, profile, request_id, Decision::Rejected, payload).await
}

async fn decide(
    state: AppState,
    profile: Profile,
    request_id: Uuid,
    decision: Decision,
    payload: Option<Json<DecisionPayload>>,
) -> Result<ApiResponse<DecisionRecord>, ApiResponse<()>> {
    require_approver(&profile)?;
    let comments = payload.and_then(|Json(p)| p.comments);

    let record = match decision {
        Decision::Approved => state.lifecycle.approve_request(request_id, profile.id, comments).await?,
        Decision::Rejected => state.lifecycle.reject_request(request_id, profile.id, comments).await?,
    };

    Ok(ApiResponse::success(
        StatusCode::OK,
        format!("Stock request {}", record.request.status),
        record,
    ))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create_stock_request,
        list_stock_requests,
        get_stock_request,
        approve_stock_request,
        reject_stock_request
    ),
    components(schemas(
        StockRequest,
        StockRequestView,
        StockRequestDetail,
        NewStockRequest,
        DecisionPayload,
        DecisionRecord,
        Approval,
        Decision,
        StockRequestStatus,
        StockRequestType
    )),
    tags(
        (name = "Stock Requests", description = "Creating and deciding stock requests")
    )
)]
pub struct StockRequestDoc;
