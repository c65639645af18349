//! Auth Service Implementation
//!
//! Core business logic for the authentication and session lifecycle:
//! registration, rate-limited login, logout via token blacklisting, profile
//! management, role assignment and password reset. The service owns all
//! orchestration; persistent state lives behind the injected store traits.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::models::auth::AuthIdentity;
use crate::models::requests::RegisterRequest;
use crate::models::user::{Role, User, UserFilter};
use crate::service::rate_limit::{login_attempts_key, LoginRatePolicy, RateLimiter};
use crate::service::token::TokenService;
use crate::store::{CounterStore, NewUser, TokenBlacklist, UserStore};
use crate::utils::error::{AuthError, AuthResult, StoreError};
use crate::utils::security::{hash_password_with_cost, verify_password, DEFAULT_BCRYPT_COST};
use crate::utils::validation::{normalize_email, validate_email, validate_password_strength};

/// Authentication service orchestrating the user directory, token codec,
/// blacklist and rate limiter
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    blacklist: Arc<dyn TokenBlacklist>,
    limiter: RateLimiter,
    tokens: TokenService,
    login_policy: LoginRatePolicy,
    bcrypt_cost: u32,
}

impl AuthService {
    /// Create a new auth service over the given collaborators
    pub fn new(
        users: Arc<dyn UserStore>,
        blacklist: Arc<dyn TokenBlacklist>,
        counters: Arc<dyn CounterStore>,
        tokens: TokenService,
    ) -> Self {
        Self {
            users,
            blacklist,
            limiter: RateLimiter::new(counters),
            tokens,
            login_policy: LoginRatePolicy::default(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }

    /// Override the login throttling policy
    pub fn with_login_policy(mut self, policy: LoginRatePolicy) -> Self {
        self.login_policy = policy;
        self
    }

    /// Override the bcrypt cost factor
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Register a new account. The password is hashed before anything is
    /// persisted; the created user always starts with role `user`.
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        request
            .validate()
            .map_err(|e| AuthError::InvalidArgument(format!("invalid registration data: {e}")))?;

        let email = normalize_email(&request.email);

        // Pre-check for a friendlier error; the partial unique index in the
        // store is the authoritative guard against the check-then-insert race.
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::AlreadyExists("email already registered".to_string()));
        }

        let password_hash = hash_password_with_cost(&request.password, self.bcrypt_cost)?;

        let user = self
            .users
            .insert(NewUser {
                id: Uuid::new_v4(),
                name: request.name.trim().to_string(),
                email,
                role: Role::User,
                password_hash,
                created_at: Utc::now(),
            })
            .await?;

        Ok(user)
    }

    /// Authenticate credentials and issue a session token.
    ///
    /// The rate limiter is consulted before the credential check, so an
    /// exhausted window rejects even a correct password. Unknown user and
    /// wrong password collapse into one indistinguishable failure.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<String> {
        if email.trim().is_empty() {
            return Err(AuthError::InvalidArgument("email is required".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidArgument("password is required".to_string()));
        }

        let email = normalize_email(email);

        let allowed = self
            .limiter
            .allow(
                &login_attempts_key(&email),
                self.login_policy.max_attempts,
                self.login_policy.window_secs,
            )
            .await?;
        if !allowed {
            return Err(AuthError::RateLimited(
                "too many login attempts, try again later".to_string(),
            ));
        }

        let record = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AuthError::Unauthenticated("invalid credentials".to_string()))?;

        if !verify_password(password, &record.password_hash) {
            return Err(AuthError::Unauthenticated("invalid credentials".to_string()));
        }

        let issued = self.tokens.issue_session(record.id)?;
        Ok(issued.token)
    }

    /// Validate a bearer token for an incoming call: signature, expiry and
    /// blacklist membership. Returns the caller identity handed to
    /// authorization-sensitive operations.
    pub async fn authenticate(&self, token: &str) -> AuthResult<AuthIdentity> {
        let context = self.tokens.parse_session(token)?;

        if self.blacklist.contains(token).await? {
            return Err(AuthError::Unauthenticated("token has been revoked".to_string()));
        }

        Ok(AuthIdentity {
            user_id: context.user_id,
            token: token.to_string(),
            expires_at: context.expires_at,
        })
    }

    /// Revoke the presented session token. Only this token is invalidated;
    /// other sessions of the same user stay alive. Revoking an
    /// already-revoked token is a success no-op.
    pub async fn logout(&self, token: &str) -> AuthResult<()> {
        let context = self.tokens.parse_session(token)?;
        self.blacklist.add(token, context.expires_at).await?;
        Ok(())
    }

    /// Look up an active user by id
    pub async fn get_user_by_id(&self, id: Uuid) -> AuthResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::NotFound("user not found".to_string()))
    }

    /// Whether the given user exists and holds the admin role
    pub async fn is_admin(&self, user_id: Uuid) -> AuthResult<bool> {
        let user = self.get_user_by_id(user_id).await?;
        Ok(user.role == Role::Admin)
    }

    /// Assign a role to the target user. The acting user must resolve to an
    /// admin; the role must be one of the closed set.
    pub async fn add_role(
        &self,
        acting_user_id: Uuid,
        target_user_id: Uuid,
        new_role: &str,
    ) -> AuthResult<()> {
        if !self.resolve_admin(acting_user_id).await? {
            return Err(AuthError::PermissionDenied(
                "only admins can assign roles".to_string(),
            ));
        }

        let role = new_role.parse::<Role>().map_err(|_| {
            AuthError::InvalidArgument("role must be one of: user, admin".to_string())
        })?;

        self.users.set_role(target_user_id, role).await?;
        Ok(())
    }

    /// Paginated directory listing, admin only. Returns the page and the
    /// total match count ignoring pagination.
    pub async fn list_users(
        &self,
        acting_user_id: Uuid,
        filter: &UserFilter,
    ) -> AuthResult<(Vec<User>, i64)> {
        if !self.resolve_admin(acting_user_id).await? {
            return Err(AuthError::PermissionDenied(
                "only admins can list users".to_string(),
            ));
        }

        Ok(self.users.list(filter).await?)
    }

    /// Replace the caller's name and email in one atomic update
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        new_name: &str,
        new_email: &str,
    ) -> AuthResult<()> {
        if new_name.trim().is_empty() {
            return Err(AuthError::InvalidArgument("name is required".to_string()));
        }
        if new_email.trim().is_empty() {
            return Err(AuthError::InvalidArgument("email is required".to_string()));
        }
        if !validate_email(new_email.trim()) {
            return Err(AuthError::InvalidArgument("invalid email format".to_string()));
        }

        let email = normalize_email(new_email);
        self.users
            .update_profile(user_id, new_name.trim(), &email)
            .await?;
        Ok(())
    }

    /// Soft-delete the caller's account. One-way: there is no undelete.
    pub async fn delete_profile(&self, user_id: Uuid) -> AuthResult<()> {
        self.users.mark_deleted(user_id).await?;
        Ok(())
    }

    /// Issue a single-use-intent password-reset token for the given user
    pub async fn generate_password_reset_token(&self, user_id: Uuid) -> AuthResult<String> {
        let user = self.get_user_by_id(user_id).await?;
        let issued = self.tokens.issue_reset(user.id)?;
        Ok(issued.token)
    }

    /// Complete a password reset. Outstanding session tokens for the user
    /// are left untouched.
    pub async fn reset_password(&self, reset_token: &str, new_password: &str) -> AuthResult<()> {
        let user_id = self.tokens.parse_reset(reset_token)?;

        if !validate_password_strength(new_password) {
            return Err(AuthError::InvalidArgument(
                "password must be at least 8 characters with an uppercase letter, a lowercase letter and a digit".to_string(),
            ));
        }

        let password_hash = hash_password_with_cost(new_password, self.bcrypt_cost)?;

        self.users
            .set_password_hash(user_id, &password_hash)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => AuthError::InvalidArgument(
                    "reset token does not match an active user".to_string(),
                ),
                other => other.into(),
            })?;

        Ok(())
    }

    /// Resolve whether the acting user is an admin, treating an
    /// unresolvable identity as an authentication failure rather than a
    /// missing entity.
    async fn resolve_admin(&self, acting_user_id: Uuid) -> AuthResult<bool> {
        match self.is_admin(acting_user_id).await {
            Ok(is_admin) => Ok(is_admin),
            Err(AuthError::NotFound(_)) => Err(AuthError::Unauthenticated(
                "acting user is not resolvable".to_string(),
            )),
            Err(other) => Err(other),
        }
    }
}
