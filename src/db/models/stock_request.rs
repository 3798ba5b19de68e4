// src/db/models/stock_request.rs
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::db::models::approval::Approval;

/// Largest page a single listing may return.
pub const MAX_PAGE_SIZE: u32 = 500;
const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, ToSchema)]
#[sqlx(type_name = "stock_request_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StockRequestType {
    AddStock,
    RemoveStock,
    TransferStock,
}

impl StockRequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockRequestType::AddStock => "add_stock",
            StockRequestType::RemoveStock => "remove_stock",
            StockRequestType::TransferStock => "transfer_stock",
        }
    }
}

impl fmt::Display for StockRequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, ToSchema)]
#[sqlx(type_name = "stock_request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StockRequestStatus {
    Pending,
    Approved,
    Rejected,
    /// Present in the schema; nothing moves a request here yet.
    Completed,
}

impl StockRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockRequestStatus::Pending => "pending",
            StockRequestStatus::Approved => "approved",
            StockRequestStatus::Rejected => "rejected",
            StockRequestStatus::Completed => "completed",
        }
    }

    /// Only pending requests may be decided, and only once.
    pub fn can_transition_to(&self, next: StockRequestStatus) -> bool {
        matches!(
            (self, next),
            (StockRequestStatus::Pending, StockRequestStatus::Approved)
                | (StockRequestStatus::Pending, StockRequestStatus::Rejected)
        )
    }

    pub fn is_pending(&self) -> bool {
        *self == StockRequestStatus::Pending
    }
}

impl fmt::Display for StockRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow, ToSchema)]
pub struct StockRequest {
    pub id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    pub request_type: StockRequestType,
    pub reason: String,
    pub requested_by: Uuid,
    pub status: StockRequestStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockRequest {
    /// Build a fresh pending request stamped with `now`.
    pub fn pending(new: NewStockRequest, requested_by: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id: new.item_id,
            quantity: new.quantity,
            request_type: new.request_type,
            reason: new.reason.trim().to_string(),
            requested_by,
            status: StockRequestStatus::Pending,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of `POST /requests`. The requester comes from the session.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct NewStockRequest {
    pub item_id: Uuid,
    pub quantity: i32,
    pub request_type: StockRequestType,
    pub reason: String,
}

impl NewStockRequest {
    /// Returns the first problem found with the payload, if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.quantity <= 0 {
            return Err(format!("quantity must be a positive integer, got {}", self.quantity));
        }
        if self.reason.trim().is_empty() {
            return Err("reason must not be empty".to_string());
        }
        Ok(())
    }
}

/// A request joined with the names the dashboards display.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow, ToSchema)]
pub struct StockRequestView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: StockRequest,
    pub item_name: String,
    pub requester_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct StockRequestDetail {
    #[serde(flatten)]
    pub request: StockRequestView,
    pub approvals: Vec<Approval>,
}

/// Body of the approve/reject endpoints.
#[derive(Debug, Serialize, Deserialize, Default, Clone, ToSchema)]
pub struct DecisionPayload {
    pub comments: Option<String>,
}

/// Server-side filter for request listings.
#[derive(Debug, Serialize, Deserialize, Default, Clone, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct StockRequestFilter {
    pub status: Option<StockRequestStatus>,
    pub request_type: Option<StockRequestType>,
    pub requested_by: Option<Uuid>,
    /// Case-insensitive match against item name, reason and requester name.
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl StockRequestFilter {
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }

    /// Trimmed search term, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn matches(&self, view: &StockRequestView) -> bool {
        let request = &view.request;
        if self.status.is_some_and(|s| s != request.status) {
            return false;
        }
        if self.request_type.is_some_and(|t| t != request.request_type) {
            return false;
        }
        if self.requested_by.is_some_and(|id| id != request.requested_by) {
            return false;
        }
        match self.search_term() {
            Some(term) => {
                let term = term.to_lowercase();
                [&view.item_name, &request.reason, &view.requester_name]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            None => true,
        }
    }
}
