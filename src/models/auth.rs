//! Authentication Models
//!
//! Claims and identity structures for JWT session and reset tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Intended use of a signed token.
///
/// Session and reset tokens share a signing secret but carry distinct
/// purposes, so a leaked reset token can never be replayed as a session
/// credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Session,
    Reset,
}

/// JWT claims shared by session and reset tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - user ID
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// JWT ID - unique token identifier
    pub jti: String,

    /// Intended use of this token
    pub purpose: TokenPurpose,
}

impl TokenClaims {
    /// Create new claims for the given subject and purpose
    pub fn new(
        user_id: Uuid,
        purpose: TokenPurpose,
        expires_at: DateTime<Utc>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            purpose,
        }
    }
}

/// Authenticated caller identity, produced once by the authentication
/// middleware and passed explicitly to every authorization-sensitive
/// operation.
#[derive(Debug, Clone)]
pub struct AuthIdentity {
    /// User ID extracted from the token subject
    pub user_id: Uuid,

    /// The raw bearer token that authenticated this call. Logout revokes
    /// exactly this token.
    pub token: String,

    /// Token expiration time
    pub expires_at: DateTime<Utc>,
}
