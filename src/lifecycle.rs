//! Stock-request lifecycle: create, approve, reject.
//!
//! Requests start `pending` and are decided exactly once. The decision,
//! its approval row and its audit row are persisted together by the store;
//! the requester notification is written afterwards and is best effort.

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::models::approval::{Decision, DecisionRecord};
use crate::db::models::audit_log::AuditLog;
use crate::db::models::stock_request::{
    NewStockRequest, StockRequest, StockRequestDetail, StockRequestFilter, StockRequestStatus,
    StockRequestView,
};
use crate::db::store::{
    ActivityStore, CatalogStore, DecisionWrite, ProfileStore, RequestStore, SharedStore, StoreError,
};
use crate::utils::notification::decision_notification;

pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Invalid stock request: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Stock request {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: StockRequestStatus,
        to: StockRequestStatus,
    },

    #[error("Data access failed: {0}")]
    DataAccess(#[source] StoreError),
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => LifecycleError::NotFound { entity, id },
            other => LifecycleError::DataAccess(other),
        }
    }
}

#[derive(Clone)]
pub struct RequestLifecycle {
    store: SharedStore,
}

impl RequestLifecycle {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Record a new pending request for `requested_by`.
    pub async fn create_request(
        &self,
        payload: NewStockRequest,
        requested_by: Uuid,
    ) -> LifecycleResult<StockRequest> {
        payload.validate().map_err(LifecycleError::Validation)?;

        if self.store.get_item(payload.item_id).await?.is_none() {
            return Err(LifecycleError::NotFound { entity: "Item", id: payload.item_id });
        }
        if self.store.get_profile(requested_by).await?.is_none() {
            return Err(LifecycleError::NotFound { entity: "Profile", id: requested_by });
        }

        let now = Utc::now();
        let request = StockRequest::pending(payload, requested_by, now);
        let audit = AuditLog::new(
            Some(requested_by),
            "stock_request.created",
            "stock_request",
            Some(request.id),
            json!({
                "item_id": request.item_id,
                "quantity": request.quantity,
                "request_type": request.request_type,
            }),
            now,
        );

        let created = self.store.insert_request(&request, &audit).await?;
        info!(
            request_id = %created.id,
            item_id = %created.item_id,
            quantity = created.quantity,
            request_type = %created.request_type,
            "stock request created"
        );
        Ok(created)
    }

    pub async fn approve_request(
        &self,
        request_id: Uuid,
        approver_id: Uuid,
        comments: Option<String>,
    ) -> LifecycleResult<DecisionRecord> {
        self.decide(request_id, Decision::Approved, approver_id, comments).await
    }

    pub async fn reject_request(
        &self,
        request_id: Uuid,
        approver_id: Uuid,
        comments: Option<String>,
    ) -> LifecycleResult<DecisionRecord> {
        self.decide(request_id, Decision::Rejected, approver_id, comments).await
    }

    async fn decide(
        &self,
        request_id: Uuid,
        decision: Decision,
        approver_id: Uuid,
        comments: Option<String>,
    ) -> LifecycleResult<DecisionRecord> {
        let target = decision.status();

        if self.store.get_profile(approver_id).await?.is_none() {
            return Err(LifecycleError::NotFound { entity: "Profile", id: approver_id });
        }

        // Fail fast on the common case; the store re-checks under its guard.
        let current = self
            .store
            .get_request(request_id)
            .await?
            .ok_or(LifecycleError::NotFound { entity: "Stock request", id: request_id })?;
        if !current.status.can_transition_to(target) {
            return Err(LifecycleError::InvalidTransition {
                id: request_id,
                from: current.status,
                to: target,
            });
        }

        let comments = comments
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let now = Utc::now();
        let write = DecisionWrite {
            request_id,
            decision,
            approver_id,
            comments: comments.clone(),
            decided_at: now,
            approval_id: Uuid::new_v4(),
            audit: AuditLog::new(
                Some(approver_id),
                format!("stock_request.{}", decision.as_str()),
                "stock_request",
                Some(request_id),
                json!({ "comments": comments }),
                now,
            ),
        };

        let record = self.store.record_decision(&write).await.map_err(|err| match err {
            StoreError::NotPending { id, current } => {
                LifecycleError::InvalidTransition { id, from: current, to: target }
            }
            other => other.into(),
        })?;

        info!(
            request_id = %request_id,
            approver_id = %approver_id,
            status = %record.request.status,
            "stock request decided"
        );

        let notification = decision_notification(&record.request, write.comments.as_deref()).build(now);
        if let Err(e) = self.store.insert_notification(&notification).await {
            warn!(request_id = %request_id, error = %e, "failed to notify requester");
        }

        Ok(record)
    }

    pub async fn list_requests(&self, filter: &StockRequestFilter) -> LifecycleResult<Vec<StockRequestView>> {
        Ok(self.store.list_requests(filter).await?)
    }

    /// A request with its approval history.
    pub async fn request_detail(&self, request_id: Uuid) -> LifecycleResult<StockRequestDetail> {
        let request = self
            .store
            .get_request_view(request_id)
            .await?
            .ok_or(LifecycleError::NotFound { entity: "Stock request", id: request_id })?;
        let approvals = self.store.list_approvals(request_id).await?;
        Ok(StockRequestDetail { request, approvals })
    }
}
