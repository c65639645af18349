//! Token Codec Service
//!
//! Issues and validates the two token kinds the service uses: session
//! tokens and short-lived password-reset tokens. Both are HS256 JWTs signed
//! with the server-held secret, distinguished by a `purpose` claim so that
//! one kind can never be replayed as the other. Verification is stateless;
//! revocation lives in the blacklist, checked by the caller.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::models::auth::{TokenClaims, TokenPurpose};
use crate::utils::error::{AuthError, AuthResult};

/// Reset tokens are valid for one hour, not configurable.
fn reset_token_ttl() -> Duration {
    Duration::hours(1)
}

fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_else(Utc::now)
}

/// A freshly issued token together with its expiry instant
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Verified session context extracted from a valid session token
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Stateless codec for session and password-reset tokens
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    session_ttl: Duration,
}

impl TokenService {
    /// Create a token service with the default 24-hour session lifetime
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            session_ttl: Duration::hours(24),
        }
    }

    /// Create a token service with a custom session lifetime
    pub fn with_session_ttl(secret: String, session_ttl: Duration) -> Self {
        Self {
            secret,
            session_ttl,
        }
    }

    /// Issue a session token for the given user
    pub fn issue_session(&self, user_id: Uuid) -> AuthResult<IssuedToken> {
        self.issue(user_id, TokenPurpose::Session, self.session_ttl)
    }

    /// Issue a password-reset token for the given user
    pub fn issue_reset(&self, user_id: Uuid) -> AuthResult<IssuedToken> {
        self.issue(user_id, TokenPurpose::Reset, reset_token_ttl())
    }

    /// Validate a session token (signature, expiry, purpose) and return the
    /// verified session context. Fails `Unauthenticated`.
    pub fn parse_session(&self, token: &str) -> AuthResult<SessionContext> {
        let claims = self
            .decode_claims(token, TokenPurpose::Session)
            .map_err(AuthError::Unauthenticated)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::Unauthenticated("invalid subject in token".to_string()))?;

        Ok(SessionContext {
            user_id,
            token_id: claims.jti,
            expires_at: timestamp_to_datetime(claims.exp),
        })
    }

    /// Validate a password-reset token and return the subject user id.
    /// Fails `InvalidArgument` on any defect, matching the reset flow's
    /// error surface.
    pub fn parse_reset(&self, token: &str) -> AuthResult<Uuid> {
        let claims = self
            .decode_claims(token, TokenPurpose::Reset)
            .map_err(AuthError::InvalidArgument)?;

        Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::InvalidArgument("invalid subject in reset token".to_string()))
    }

    fn issue(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> AuthResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + ttl;
        let claims = TokenClaims::new(user_id, purpose, expires_at, now);

        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(self.secret.as_ref());
        let token = encode(&header, &claims, &encoding_key)
            .map_err(|e| AuthError::Internal(format!("token encoding failed: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    fn decode_claims(&self, token: &str, expected: TokenPurpose) -> Result<TokenClaims, String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        let decoding_key = DecodingKey::from_secret(self.secret.as_ref());

        let claims = decode::<TokenClaims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => "token expired".to_string(),
                _ => "invalid token".to_string(),
            })?;

        if claims.purpose != expected {
            return Err("token purpose mismatch".to_string());
        }

        Ok(claims)
    }
}
