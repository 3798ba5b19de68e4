// src/db/models/approval.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::models::stock_request::{StockRequest, StockRequestStatus};

/// The outcome an approver records against a pending request.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "approval_decision", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// Request status this decision moves a request into.
    pub fn status(&self) -> StockRequestStatus {
        match self {
            Decision::Approved => StockRequestStatus::Approved,
            Decision::Rejected => StockRequestStatus::Rejected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
        }
    }
}

/// Append-only record of a decision.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow, ToSchema)]
pub struct Approval {
    pub id: Uuid,
    pub request_id: Uuid,
    pub status: Decision,
    pub comments: Option<String>,
    pub approved_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Everything written by one approve/reject call.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct DecisionRecord {
    pub request: StockRequest,
    pub approval: Approval,
}
