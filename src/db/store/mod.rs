//! Persistence seams.
//!
//! Handlers and the request lifecycle only ever see these traits. `PgStore`
//! backs production; `MemoryStore` backs tests and the demo mode.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::models::approval::{Approval, Decision, DecisionRecord};
use crate::db::models::audit_log::AuditLog;
use crate::db::models::catalog::{Asset, InventorySummary, Item, ItemFilter, Store, Supplier};
use crate::db::models::notification::Notification;
use crate::db::models::profile::{NewProfile, Profile, ProfileRole};
use crate::db::models::stock_request::{
    StockRequest, StockRequestFilter, StockRequestStatus, StockRequestView,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Stock request {id} is already {current}")]
    NotPending { id: Uuid, current: StockRequestStatus },
}

/// A decision to persist atomically: status update, approval row and audit row.
#[derive(Debug, Clone)]
pub struct DecisionWrite {
    pub request_id: Uuid,
    pub decision: Decision,
    pub approver_id: Uuid,
    pub comments: Option<String>,
    pub decided_at: DateTime<Utc>,
    pub approval_id: Uuid,
    pub audit: AuditLog,
}

impl DecisionWrite {
    pub fn approval(&self) -> Approval {
        Approval {
            id: self.approval_id,
            request_id: self.request_id,
            status: self.decision,
            comments: self.comments.clone(),
            approved_by: self.approver_id,
            created_at: self.decided_at,
        }
    }
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create_profile(&self, profile: NewProfile) -> StoreResult<Profile>;
    async fn get_profile(&self, id: Uuid) -> StoreResult<Option<Profile>>;
    async fn find_profile_by_email(&self, email: &str) -> StoreResult<Option<Profile>>;
    /// `None` when no profile has this id.
    async fn update_profile_role(&self, id: Uuid, role: ProfileRole) -> StoreResult<Option<Profile>>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Cheap round trip used by readiness checks.
    async fn ping(&self) -> StoreResult<()>;
    async fn get_item(&self, id: Uuid) -> StoreResult<Option<Item>>;
    async fn list_items(&self, filter: &ItemFilter) -> StoreResult<Vec<Item>>;
    async fn inventory_summary(&self) -> StoreResult<InventorySummary>;
    async fn list_stores(&self) -> StoreResult<Vec<Store>>;
    async fn list_suppliers(&self) -> StoreResult<Vec<Supplier>>;
    async fn list_assets(&self) -> StoreResult<Vec<Asset>>;
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Inserts the request together with its audit row.
    async fn insert_request(&self, request: &StockRequest, audit: &AuditLog) -> StoreResult<StockRequest>;
    async fn get_request(&self, id: Uuid) -> StoreResult<Option<StockRequest>>;
    async fn get_request_view(&self, id: Uuid) -> StoreResult<Option<StockRequestView>>;
    /// Newest first.
    async fn list_requests(&self, filter: &StockRequestFilter) -> StoreResult<Vec<StockRequestView>>;
    /// Oldest first.
    async fn list_approvals(&self, request_id: Uuid) -> StoreResult<Vec<Approval>>;
    /// Applies the decision only if the request is still pending.
    ///
    /// Returns `NotPending` without writing anything otherwise.
    async fn record_decision(&self, write: &DecisionWrite) -> StoreResult<DecisionRecord>;
}

#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()>;
    /// Newest first.
    async fn list_notifications(&self, profile_id: Uuid) -> StoreResult<Vec<Notification>>;
    /// Newest first.
    async fn list_audit_logs(&self, limit: u32) -> StoreResult<Vec<AuditLog>>;
}

pub trait DataStore: ProfileStore + CatalogStore + RequestStore + ActivityStore {}

impl<T> DataStore for T where T: ProfileStore + CatalogStore + RequestStore + ActivityStore {}

pub type SharedStore = Arc<dyn DataStore>;
