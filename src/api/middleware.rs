//! Authentication Middleware
//!
//! Request-boundary filter for every protected route. Extracts the bearer
//! token, validates signature, expiry and blacklist membership, and injects
//! the resolved [`AuthIdentity`] into the request extensions for handlers.
//! Unauthenticated routes (register, login, password reset, health) bypass
//! this middleware entirely by router composition.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::handlers::AppState;
use crate::utils::error::AuthError;

/// Validate the bearer token on an incoming request and attach the caller
/// identity. Missing header, missing `Bearer ` prefix, token-parse failure
/// and revoked tokens each fail `Unauthenticated`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AuthError::Unauthenticated("missing authorization header".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::Unauthenticated("invalid authorization header format".into()))?;

    let identity = state.auth_service.authenticate(token).await?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
