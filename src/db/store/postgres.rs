// src/db/store/postgres.rs
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    ActivityStore, CatalogStore, DecisionWrite, ProfileStore, RequestStore, StoreError, StoreResult,
};
use crate::db::models::approval::{Approval, DecisionRecord};
use crate::db::models::audit_log::AuditLog;
use crate::db::models::catalog::{Asset, InventorySummary, Item, ItemFilter, Store, Supplier};
use crate::db::models::notification::Notification;
use crate::db::models::profile::{NewProfile, Profile, ProfileRole};
use crate::db::models::stock_request::{
    StockRequest, StockRequestFilter, StockRequestStatus, StockRequestView,
};

const PROFILE_COLUMNS: &str =
    "id, full_name, email, role, department, password_hash, created_at";

const ITEM_COLUMNS: &str =
    "id, name, unit, quantity, minimum_stock, store_id, category, unit_price, created_at";

const REQUEST_COLUMNS: &str = "id, item_id, quantity, request_type, reason, requested_by, status, \
     approved_by, approved_at, created_at, updated_at";

const REQUEST_VIEW_SELECT: &str = r#"
    SELECT r.id, r.item_id, r.quantity, r.request_type, r.reason, r.requested_by, r.status,
           r.approved_by, r.approved_at, r.created_at, r.updated_at,
           i.name AS item_name, p.full_name AS requester_name
    FROM stock_requests r
    JOIN items i ON i.id = r.item_id
    JOIN profiles p ON p.id = r.requested_by
"#;

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// `%term%` with LIKE wildcards in `term` matched literally. Pair with `ESCAPE '\'`.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

async fn insert_audit<'e, E>(executor: E, audit: &AuditLog) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, actor_id, action, entity, entity_id, details, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(audit.id)
    .bind(audit.actor_id)
    .bind(&audit.action)
    .bind(&audit.entity)
    .bind(audit.entity_id)
    .bind(&audit.details)
    .bind(audit.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn create_profile(&self, profile: NewProfile) -> StoreResult<Profile> {
        let profile = profile.into_profile(chrono::Utc::now());
        let sql = format!(
            "INSERT INTO profiles ({PROFILE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {PROFILE_COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(profile.id)
            .bind(&profile.full_name)
            .bind(&profile.email)
            .bind(profile.role)
            .bind(&profile.department)
            .bind(&profile.password_hash)
            .bind(profile.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Conflict(format!("email {} is already registered", profile.email))
                } else {
                    e.into()
                }
            })
    }

    async fn get_profile(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_profile_by_email(&self, email: &str) -> StoreResult<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = $1");
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_profile_role(&self, id: Uuid, role: ProfileRole) -> StoreResult<Option<Profile>> {
        let sql = format!("UPDATE profiles SET role = $1 WHERE id = $2 RETURNING {PROFILE_COLUMNS}");
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(role)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_item(&self, id: Uuid) -> StoreResult<Option<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1");
        Ok(sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_items(&self, filter: &ItemFilter) -> StoreResult<Vec<Item>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {ITEM_COLUMNS} FROM items WHERE TRUE"));

        if let Some(store_id) = filter.store_id {
            query.push(" AND store_id = ").push_bind(store_id);
        }
        if filter.low_stock_only.unwrap_or(false) {
            query.push(" AND quantity <= minimum_stock");
        }
        if let Some(term) = filter.search_term() {
            let pattern = contains_pattern(term);
            query
                .push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(r" ESCAPE '\' OR category ILIKE ")
                .push_bind(pattern)
                .push(r" ESCAPE '\')");
        }
        query.push(" ORDER BY name ASC");

        Ok(query.build_query_as::<Item>().fetch_all(&self.pool).await?)
    }

    async fn inventory_summary(&self) -> StoreResult<InventorySummary> {
        Ok(sqlx::query_as::<_, InventorySummary>(
            r#"
            SELECT
                COUNT(*)::BIGINT AS total_items,
                COALESCE(SUM(quantity), 0)::BIGINT AS total_quantity,
                COUNT(*) FILTER (WHERE quantity <= minimum_stock)::BIGINT AS low_stock_count,
                (SELECT COUNT(*) FROM stores)::BIGINT AS store_count
            FROM items
            "#,
        )
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_stores(&self) -> StoreResult<Vec<Store>> {
        Ok(sqlx::query_as::<_, Store>(
            "SELECT id, name, description, department, created_at FROM stores ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_suppliers(&self) -> StoreResult<Vec<Supplier>> {
        Ok(sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, contact_person, email, phone, address, created_at
            FROM suppliers
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_assets(&self) -> StoreResult<Vec<Asset>> {
        Ok(sqlx::query_as::<_, Asset>(
            r#"
            SELECT id, name, category, purchase_price, purchase_date, useful_life_years, store_id, created_at
            FROM assets
            ORDER BY category ASC, name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }
}

#[async_trait]
impl RequestStore for PgStore {
    async fn insert_request(&self, request: &StockRequest, audit: &AuditLog) -> StoreResult<StockRequest> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO stock_requests ({REQUEST_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {REQUEST_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, StockRequest>(&sql)
            .bind(request.id)
            .bind(request.item_id)
            .bind(request.quantity)
            .bind(request.request_type)
            .bind(&request.reason)
            .bind(request.requested_by)
            .bind(request.status)
            .bind(request.approved_by)
            .bind(request.approved_at)
            .bind(request.created_at)
            .bind(request.updated_at)
            .fetch_one(&mut *tx)
            .await?;

        insert_audit(&mut *tx, audit).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    async fn get_request(&self, id: Uuid) -> StoreResult<Option<StockRequest>> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM stock_requests WHERE id = $1");
        Ok(sqlx::query_as::<_, StockRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_request_view(&self, id: Uuid) -> StoreResult<Option<StockRequestView>> {
        let sql = format!("{REQUEST_VIEW_SELECT} WHERE r.id = $1");
        Ok(sqlx::query_as::<_, StockRequestView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_requests(&self, filter: &StockRequestFilter) -> StoreResult<Vec<StockRequestView>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(REQUEST_VIEW_SELECT);
        query.push(" WHERE TRUE");

        if let Some(status) = filter.status {
            query.push(" AND r.status = ").push_bind(status);
        }
        if let Some(request_type) = filter.request_type {
            query.push(" AND r.request_type = ").push_bind(request_type);
        }
        if let Some(requested_by) = filter.requested_by {
            query.push(" AND r.requested_by = ").push_bind(requested_by);
        }
        if let Some(term) = filter.search_term() {
            let pattern = contains_pattern(term);
            query
                .push(" AND (i.name ILIKE ")
                .push_bind(pattern.clone())
                .push(r" ESCAPE '\' OR r.reason ILIKE ")
                .push_bind(pattern.clone())
                .push(r" ESCAPE '\' OR p.full_name ILIKE ")
                .push_bind(pattern)
                .push(r" ESCAPE '\')");
        }

        query
            .push(" ORDER BY r.created_at DESC LIMIT ")
            .push_bind(i64::from(filter.limit()))
            .push(" OFFSET ")
            .push_bind(i64::from(filter.offset()));

        Ok(query
            .build_query_as::<StockRequestView>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_approvals(&self, request_id: Uuid) -> StoreResult<Vec<Approval>> {
        Ok(sqlx::query_as::<_, Approval>(
            r#"
            SELECT id, request_id, status, comments, approved_by, created_at
            FROM approvals
            WHERE request_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn record_decision(&self, write: &DecisionWrite) -> StoreResult<DecisionRecord> {
        let mut tx = self.pool.begin().await?;

        // The status guard makes concurrent decisions race on the row lock;
        // the loser sees zero rows and rolls back.
        let sql = format!(
            "UPDATE stock_requests \
             SET status = $1, approved_by = $2, approved_at = $3, updated_at = $3 \
             WHERE id = $4 AND status = 'pending' \
             RETURNING {REQUEST_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, StockRequest>(&sql)
            .bind(write.decision.status())
            .bind(write.approver_id)
            .bind(write.decided_at)
            .bind(write.request_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(request) = updated else {
            let current: Option<StockRequestStatus> =
                sqlx::query_scalar("SELECT status FROM stock_requests WHERE id = $1")
                    .bind(write.request_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            return Err(match current {
                Some(current) => StoreError::NotPending { id: write.request_id, current },
                None => StoreError::NotFound { entity: "Stock request", id: write.request_id },
            });
        };

        let approval = sqlx::query_as::<_, Approval>(
            r#"
            INSERT INTO approvals (id, request_id, status, comments, approved_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, request_id, status, comments, approved_by, created_at
            "#,
        )
        .bind(write.approval_id)
        .bind(write.request_id)
        .bind(write.decision)
        .bind(&write.comments)
        .bind(write.approver_id)
        .bind(write.decided_at)
        .fetch_one(&mut *tx)
        .await?;

        insert_audit(&mut *tx, &write.audit).await?;
        tx.commit().await?;

        Ok(DecisionRecord { request, approval })
    }
}

#[async_trait]
impl ActivityStore for PgStore {
    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, profile_id, title, message, channel, sent, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(notification.id)
        .bind(notification.profile_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.channel)
        .bind(notification.sent)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_notifications(&self, profile_id: Uuid) -> StoreResult<Vec<Notification>> {
        Ok(sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, profile_id, title, message, channel, sent, created_at
            FROM notifications
            WHERE profile_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_audit_logs(&self, limit: u32) -> StoreResult<Vec<AuditLog>> {
        Ok(sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT id, actor_id, action, entity, entity_id, details, created_at
            FROM audit_logs
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?)
    }
}
