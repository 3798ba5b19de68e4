use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use moka::sync::Cache; // ✅ High-performance TTL Cache
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::api::auth::Claims;
use crate::app_state::AppState;
use crate::db::models::profile::Profile;
use crate::db::store::ProfileStore;
use crate::utils::api_response::ApiResponse;

/// ✅ **Profile Cache Using `moka`**
pub type ProfileCache = Arc<Cache<Uuid, Profile>>;

/// ✅ **Initialize the `moka` Cache**
pub fn create_profile_cache() -> ProfileCache {
    Arc::new(
        Cache::builder()
            .time_to_live(Duration::from_secs(600)) // ✅ TTL = 10 minutes
            .build(),
    )
}

/// ✅ **JWT Middleware** (Handles Token Authentication)
pub async fn jwt_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    // Step 1: Extract Authorization header
    let auth_header = req.headers().get("Authorization").ok_or_else(|| {
        ApiResponse::<()>::error(StatusCode::UNAUTHORIZED, "Missing Authorization header", None)
            .into_response()
    })?;

    // Step 2: Convert header to string
    let token_str = auth_header.to_str().map_err(|_| {
        ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Invalid Authorization header format", None)
            .into_response()
    })?;

    // Step 3: Strip "Bearer " prefix
    let token = token_str.strip_prefix("Bearer ").ok_or_else(|| {
        ApiResponse::<()>::error(StatusCode::UNAUTHORIZED, "Invalid token format", None).into_response()
    })?;

    // Step 4: Decode the JWT token
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::warn!("JWT decoding failed: {:?}", e);
        ApiResponse::<()>::error(
            StatusCode::UNAUTHORIZED,
            "Invalid token",
            Some(json!({ "error": e.to_string() })),
        )
        .into_response()
    })?;

    // Step 5: Insert claims into request extensions
    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}

/// ✅ **Profile Middleware**: resolves the caller's profile (and role) for handlers
pub async fn profile_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let claims = req.extensions().get::<Claims>().cloned().ok_or_else(|| {
        error!("Missing JWT claims in request");
        ApiResponse::<()>::error(StatusCode::UNAUTHORIZED, "Missing JWT claims in request", None)
            .into_response()
    })?;

    let profile_id = claims.profile_id().map_err(IntoResponse::into_response)?;

    // ✅ **Check cache first before querying the store**
    if let Some(profile) = state.profile_cache.get(&profile_id) {
        req.extensions_mut().insert(profile);
        return Ok(next.run(req).await);
    }

    let profile = match state.store.get_profile(profile_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            return Err(ApiResponse::<()>::error(
                StatusCode::UNAUTHORIZED,
                "Profile no longer exists",
                None,
            )
            .into_response());
        }
        Err(err) => {
            error!("Profile lookup failed: {:?}", err);
            return Err(ApiResponse::<()>::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load profile",
                Some(json!({ "error": err.to_string() })),
            )
            .into_response());
        }
    };

    state.profile_cache.insert(profile_id, profile.clone());
    req.extensions_mut().insert(profile);
    Ok(next.run(req).await)
}

/// Approve/reject controls are only offered to these roles.
pub fn require_approver(profile: &Profile) -> Result<(), ApiResponse<()>> {
    if profile.role.can_decide_requests() {
        Ok(())
    } else {
        Err(ApiResponse::error(
            StatusCode::FORBIDDEN,
            format!("Role {} cannot approve or reject stock requests", profile.role),
            None,
        ))
    }
}

pub fn require_admin(profile: &Profile) -> Result<(), ApiResponse<()>> {
    if profile.role.is_admin() {
        Ok(())
    } else {
        Err(ApiResponse::error(StatusCode::FORBIDDEN, "Administrator access required", None))
    }
}
