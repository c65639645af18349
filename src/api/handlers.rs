//! HTTP Request Handlers
//!
//! Axum handlers mapping the RPC surface onto the auth service. Caller
//! identity for protected operations comes from the [`AuthIdentity`]
//! extension injected by the authentication middleware, threaded explicitly
//! into the service calls.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::auth::AuthIdentity,
    models::requests::*,
    models::user::UserFilter,
    service::AuthService,
    utils::error::{AuthError, AuthResult},
    utils::security::token_digest,
    VERSION,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
}

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AuthResult<Json<RegisterResponse>> {
    let user = state.auth_service.register(request).await.map_err(|e| {
        log::warn!("register failed: {e}");
        e
    })?;

    log::info!("registered user {}", user.id);
    Ok(Json(RegisterResponse {
        id: user.id,
        email: user.email,
        role: user.role,
    }))
}

/// Authenticate credentials and issue a session token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AuthResult<Json<LoginResponse>> {
    request
        .validate()
        .map_err(|e| AuthError::InvalidArgument(format!("invalid login data: {e}")))?;

    let token = state
        .auth_service
        .login(&request.email, &request.password)
        .await
        .map_err(|e| {
            log::warn!("login failed: {e}");
            e
        })?;

    Ok(Json(LoginResponse { token }))
}

/// Revoke the session token that authenticated this call
pub async fn logout(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
) -> AuthResult<Json<SuccessResponse>> {
    state.auth_service.logout(&identity.token).await?;

    log::info!(
        "revoked session {} for user {}",
        token_digest(&identity.token),
        identity.user_id
    );
    Ok(Json(SuccessResponse::ok()))
}

/// Look up a user by id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AuthResult<Json<crate::models::user::User>> {
    let user = state.auth_service.get_user_by_id(user_id).await?;
    Ok(Json(user))
}

/// Assign a role to the target user (admin only)
pub async fn add_role(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(target_user_id): Path<Uuid>,
    Json(request): Json<AddRoleRequest>,
) -> AuthResult<Json<SuccessResponse>> {
    state
        .auth_service
        .add_role(identity.user_id, target_user_id, &request.role)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Paginated directory listing (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Query(query): Query<ListUsersQuery>,
) -> AuthResult<Json<ListUsersResponse>> {
    let filter = UserFilter {
        name: query.name,
        email: query.email,
        page: query.page.unwrap_or(0),
        limit: query.limit.unwrap_or(0),
    };

    let (users, total) = state
        .auth_service
        .list_users(identity.user_id, &filter)
        .await?;

    Ok(Json(ListUsersResponse { users, total }))
}

/// Replace the caller's name and email
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Json(request): Json<UpdateProfileRequest>,
) -> AuthResult<Json<SuccessResponse>> {
    request
        .validate()
        .map_err(|e| AuthError::InvalidArgument(format!("invalid profile data: {e}")))?;

    state
        .auth_service
        .update_profile(identity.user_id, &request.name, &request.email)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Soft-delete the caller's account
pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
) -> AuthResult<Json<SuccessResponse>> {
    state.auth_service.delete_profile(identity.user_id).await?;

    log::info!("soft-deleted user {}", identity.user_id);
    Ok(Json(SuccessResponse::ok()))
}

/// Issue a password-reset token for the caller
pub async fn generate_password_reset_token(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
) -> AuthResult<Json<PasswordResetTokenResponse>> {
    let reset_token = state
        .auth_service
        .generate_password_reset_token(identity.user_id)
        .await?;

    Ok(Json(PasswordResetTokenResponse { reset_token }))
}

/// Complete a password reset with a previously issued reset token
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> AuthResult<Json<SuccessResponse>> {
    request
        .validate()
        .map_err(|e| AuthError::InvalidArgument(format!("invalid reset data: {e}")))?;

    state
        .auth_service
        .reset_password(&request.reset_token, &request.new_password)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
    })
}
