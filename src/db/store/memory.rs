// src/db/store/memory.rs
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    ActivityStore, CatalogStore, DecisionWrite, ProfileStore, RequestStore, StoreError, StoreResult,
};
use crate::db::models::approval::{Approval, DecisionRecord};
use crate::db::models::audit_log::AuditLog;
use crate::db::models::catalog::{Asset, InventorySummary, Item, ItemFilter, Store, Supplier};
use crate::db::models::notification::Notification;
use crate::db::models::profile::{NewProfile, Profile, ProfileRole};
use crate::db::models::stock_request::{StockRequest, StockRequestFilter, StockRequestView};

#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, Profile>,
    stores: HashMap<Uuid, Store>,
    items: HashMap<Uuid, Item>,
    suppliers: HashMap<Uuid, Supplier>,
    assets: HashMap<Uuid, Asset>,
    requests: HashMap<Uuid, StockRequest>,
    approvals: Vec<Approval>,
    audit_logs: Vec<AuditLog>,
    notifications: Vec<Notification>,
}

impl Tables {
    fn view(&self, request: &StockRequest) -> StockRequestView {
        StockRequestView {
            request: request.clone(),
            item_name: self
                .items
                .get(&request.item_id)
                .map(|i| i.name.clone())
                .unwrap_or_default(),
            requester_name: self
                .profiles
                .get(&request.requested_by)
                .map(|p| p.full_name.clone())
                .unwrap_or_default(),
        }
    }
}

/// In-process store with the same semantics as [`super::PgStore`].
///
/// Every write happens under one lock, which gives decisions the same
/// all-or-nothing behavior the Postgres transaction provides.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_store(&self, store: Store) {
        self.tables.write().await.stores.insert(store.id, store);
    }

    pub async fn insert_item(&self, item: Item) {
        self.tables.write().await.items.insert(item.id, item);
    }

    pub async fn insert_supplier(&self, supplier: Supplier) {
        self.tables.write().await.suppliers.insert(supplier.id, supplier);
    }

    pub async fn insert_asset(&self, asset: Asset) {
        self.tables.write().await.assets.insert(asset.id, asset);
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn create_profile(&self, profile: NewProfile) -> StoreResult<Profile> {
        let profile = profile.into_profile(Utc::now());
        let mut tables = self.tables.write().await;
        if tables.profiles.values().any(|p| p.email == profile.email) {
            return Err(StoreError::Conflict(format!(
                "email {} is already registered",
                profile.email
            )));
        }
        tables.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn get_profile(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&id).cloned())
    }

    async fn find_profile_by_email(&self, email: &str) -> StoreResult<Option<Profile>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .profiles
            .values()
            .find(|p| p.email == email)
            .cloned())
    }

    async fn update_profile_role(&self, id: Uuid, role: ProfileRole) -> StoreResult<Option<Profile>> {
        let mut tables = self.tables.write().await;
        Ok(tables.profiles.get_mut(&id).map(|profile| {
            profile.role = role;
            profile.clone()
        }))
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn get_item(&self, id: Uuid) -> StoreResult<Option<Item>> {
        Ok(self.tables.read().await.items.get(&id).cloned())
    }

    async fn list_items(&self, filter: &ItemFilter) -> StoreResult<Vec<Item>> {
        let tables = self.tables.read().await;
        let mut items: Vec<Item> = tables
            .items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn inventory_summary(&self) -> StoreResult<InventorySummary> {
        let tables = self.tables.read().await;
        Ok(InventorySummary {
            total_items: tables.items.len() as i64,
            total_quantity: tables.items.values().map(|i| i64::from(i.quantity)).sum(),
            low_stock_count: tables.items.values().filter(|i| i.is_low_stock()).count() as i64,
            store_count: tables.stores.len() as i64,
        })
    }

    async fn list_stores(&self) -> StoreResult<Vec<Store>> {
        let mut stores: Vec<Store> = self.tables.read().await.stores.values().cloned().collect();
        stores.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stores)
    }

    async fn list_suppliers(&self) -> StoreResult<Vec<Supplier>> {
        let mut suppliers: Vec<Supplier> =
            self.tables.read().await.suppliers.values().cloned().collect();
        suppliers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(suppliers)
    }

    async fn list_assets(&self) -> StoreResult<Vec<Asset>> {
        let mut assets: Vec<Asset> = self.tables.read().await.assets.values().cloned().collect();
        assets.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
        Ok(assets)
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn insert_request(&self, request: &StockRequest, audit: &AuditLog) -> StoreResult<StockRequest> {
        let mut tables = self.tables.write().await;
        if !tables.items.contains_key(&request.item_id) {
            return Err(StoreError::NotFound { entity: "Item", id: request.item_id });
        }
        if !tables.profiles.contains_key(&request.requested_by) {
            return Err(StoreError::NotFound { entity: "Profile", id: request.requested_by });
        }
        tables.requests.insert(request.id, request.clone());
        tables.audit_logs.push(audit.clone());
        Ok(request.clone())
    }

    async fn get_request(&self, id: Uuid) -> StoreResult<Option<StockRequest>> {
        Ok(self.tables.read().await.requests.get(&id).cloned())
    }

    async fn get_request_view(&self, id: Uuid) -> StoreResult<Option<StockRequestView>> {
        let tables = self.tables.read().await;
        Ok(tables.requests.get(&id).map(|r| tables.view(r)))
    }

    async fn list_requests(&self, filter: &StockRequestFilter) -> StoreResult<Vec<StockRequestView>> {
        let tables = self.tables.read().await;
        let mut views: Vec<StockRequestView> = tables
            .requests
            .values()
            .map(|r| tables.view(r))
            .filter(|v| filter.matches(v))
            .collect();
        views.sort_by(|a, b| b.request.created_at.cmp(&a.request.created_at));
        Ok(views
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .collect())
    }

    async fn list_approvals(&self, request_id: Uuid) -> StoreResult<Vec<Approval>> {
        Ok(self
            .tables
            .read()
            .await
            .approvals
            .iter()
            .filter(|a| a.request_id == request_id)
            .cloned()
            .collect())
    }

    async fn record_decision(&self, write: &DecisionWrite) -> StoreResult<DecisionRecord> {
        let mut tables = self.tables.write().await;
        let request = tables
            .requests
            .get_mut(&write.request_id)
            .ok_or(StoreError::NotFound { entity: "Stock request", id: write.request_id })?;

        if !request.status.is_pending() {
            return Err(StoreError::NotPending { id: write.request_id, current: request.status });
        }

        request.status = write.decision.status();
        request.approved_by = Some(write.approver_id);
        request.approved_at = Some(write.decided_at);
        request.updated_at = write.decided_at;
        let request = request.clone();

        let approval = write.approval();
        tables.approvals.push(approval.clone());
        tables.audit_logs.push(write.audit.clone());

        Ok(DecisionRecord { request, approval })
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()> {
        self.tables.write().await.notifications.push(notification.clone());
        Ok(())
    }

    async fn list_notifications(&self, profile_id: Uuid) -> StoreResult<Vec<Notification>> {
        let tables = self.tables.read().await;
        let mut notifications: Vec<Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.profile_id == Some(profile_id))
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn list_audit_logs(&self, limit: u32) -> StoreResult<Vec<AuditLog>> {
        let tables = self.tables.read().await;
        Ok(tables
            .audit_logs
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
