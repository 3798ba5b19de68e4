use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use bcrypt::{hash, verify};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::models::profile::{NewProfile, Profile, ProfileRole};
use crate::db::store::ProfileStore;
use crate::middleware::auth::require_admin;
use crate::utils::api_response::ApiResponse;

/// Represents a request to register a new profile.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub department: Option<String>,
}

/// New role for an existing profile.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct AssignRoleRequest {
    pub role: ProfileRole,
}

/// JWT Claims used for authentication.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject - profile id
    pub sub: String,
    pub email: String,
    pub role: ProfileRole,
    /// Expiration timestamp (UNIX TIME)
    pub exp: usize,
}

impl Claims {
    /// Converts `sub` to a profile id, or returns a descriptive error.
    pub fn profile_id(&self) -> Result<Uuid, ApiResponse<()>> {
        self.sub.parse::<Uuid>().map_err(|_| {
            ApiResponse::error(StatusCode::UNAUTHORIZED, "Invalid profile id format in token", None)
        })
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login: a bearer token and the profile it belongs to.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub profile: Profile,
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn secure_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/profiles/{profile_id}/role", put(assign_role))
}

pub fn issue_token(state: &AppState, profile: &Profile) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: profile.id.to_string(),
        email: profile.email.clone(),
        role: profile.role,
        exp: (chrono::Utc::now().timestamp() + state.config.token_ttl_secs) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
}

/// Handles profile registration.
///
/// New profiles are always teachers; an admin assigns any other role.
///
/// # Returns
/// * `201 Created` - The new profile.
/// * `400 Bad Request` - Missing name, email or password.
/// * `409 Conflict` - The email is already registered.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    tag = "Authentication",
    responses(
        (status = 201, description = "Profile registered", body = Profile),
        (status = 400, description = "Invalid registration details"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<ApiResponse<Profile>, ApiResponse<()>> {
    if payload.full_name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(ApiResponse::error(
            StatusCode::BAD_REQUEST,
            "full_name, email and password are required",
            None,
        ));
    }

    let password_hash = hash(&payload.password, state.config.bcrypt_cost).map_err(|e| {
        ApiResponse::<()>::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Password hashing failed",
            Some(json!({ "error": e.to_string() })),
        )
    })?;

    let profile = state
        .store
        .create_profile(NewProfile {
            full_name: payload.full_name.trim().to_string(),
            email: payload.email,
            role: ProfileRole::Teacher,
            department: payload.department,
            password_hash,
        })
        .await?;

    info!(profile_id = %profile.id, role = %profile.role, "✅ profile registered");
    Ok(ApiResponse::success(StatusCode::CREATED, "Profile registered", profile))
}

/// Handles login with email and password.
///
/// # Returns
/// * `200 OK` - A JWT and the caller's profile.
/// * `401 Unauthorized` - Unknown email or wrong password.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    tag = "Authentication",
    responses(
        (status = 200, description = "Successful login", body = LoginResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, ApiResponse<()>> {
    let invalid = || ApiResponse::<()>::error(StatusCode::UNAUTHORIZED, "Invalid email or password.", None);

    let Some(profile) = state.store.find_profile_by_email(&payload.email).await? else {
        warn!("❌ Login attempt for unknown email: {}", payload.email);
        return Err(invalid());
    };

    match verify(&payload.password, &profile.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            warn!("❌ Invalid password attempt for: {}", profile.email);
            return Err(invalid());
        }
        Err(e) => {
            return Err(ApiResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Password verification error",
                Some(json!({ "error": e.to_string() })),
            ));
        }
    }

    let token = issue_token(&state, &profile).map_err(|e| {
        ApiResponse::<()>::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Token generation failed",
            Some(json!({ "error": e.to_string() })),
        )
    })?;

    info!("✅ Login successful for: {}", profile.email);
    Ok(ApiResponse::success(StatusCode::OK, "Login successful", LoginResponse { token, profile }))
}

/// Returns the profile behind the presented token.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "Current profile", body = Profile),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearerAuth" = []))
)]
pub async fn me(Extension(profile): Extension<Profile>) -> ApiResponse<Profile> {
    ApiResponse::success(StatusCode::OK, "Current profile", profile)
}

/// Changes a profile's role. Admins only.
///
/// # Returns
/// * `200 OK` - The updated profile.
/// * `403 Forbidden` - The caller is not an admin.
/// * `404 Not Found` - No such profile.
#[utoipa::path(
    put,
    path = "/profiles/{profile_id}/role",
    tag = "Authentication",
    params(("profile_id" = Uuid, Path, description = "Profile to update")),
    request_body = AssignRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = Profile),
        (status = 403, description = "Administrator access required"),
        (status = 404, description = "Profile not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn assign_role(
    State(state): State<AppState>,
    Extension(admin): Extension<Profile>,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<AssignRoleRequest>,
) -> Result<ApiResponse<Profile>, ApiResponse<()>> {
    require_admin(&admin)?;

    let profile = state
        .store
        .update_profile_role(profile_id, payload.role)
        .await?
        .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Profile not found", None))?;

    // Role gates read the cached profile.
    state.profile_cache.invalidate(&profile_id);

    info!(profile_id = %profile.id, role = %profile.role, assigned_by = %admin.id, "✅ role assigned");
    Ok(ApiResponse::success(StatusCode::OK, "Role updated", profile))
}

#[derive(OpenApi)]
#[openapi(
    paths(register, login, me, assign_role),
    components(schemas(RegisterRequest, AssignRoleRequest, LoginRequest, LoginResponse, Profile, ProfileRole)),
    tags((name = "Authentication", description = "Profile registration and login"))
)]
pub struct AuthDoc;
