//! Storage Collaborators
//!
//! Trait seams for the three external stores the service depends on: the
//! user directory, the token blacklist and the shared rate-limit counters.
//! Implementations are constructor-injected; nothing in the service layer
//! touches a concrete backend. `postgres` is the production backend,
//! `memory` backs the test suite and single-node development.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::user::{Role, User, UserFilter, UserRecord};
use crate::utils::error::StoreResult;

/// Input for inserting a new user record. The service assigns the identity
/// and hashes the password before the record reaches the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Persistent user directory.
///
/// All lookups exclude soft-deleted rows; deletion is a one-way flag flip,
/// never a physical removal. Email uniqueness among active users is the
/// store's responsibility (the Postgres backend enforces it with a partial
/// unique index).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `StoreError::DuplicateEmail` when an
    /// active user already holds the email.
    async fn insert(&self, user: NewUser) -> StoreResult<User>;

    /// Look up an active user by id.
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Look up an active user by (normalized) email, including the
    /// password hash for credential verification.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Atomically replace name and email. Fails with `NotFound` when the
    /// user is absent or deleted, `DuplicateEmail` on an email collision.
    async fn update_profile(&self, id: Uuid, name: &str, email: &str) -> StoreResult<()>;

    /// Update the role field only.
    async fn set_role(&self, id: Uuid, role: Role) -> StoreResult<()>;

    /// Replace the stored password hash.
    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> StoreResult<()>;

    /// Soft-delete: set the deleted flag and bump updated_at. Fails with
    /// `NotFound` when already deleted or absent.
    async fn mark_deleted(&self, id: Uuid) -> StoreResult<()>;

    /// Paginated, filtered listing of active users. Returns the page and
    /// the total count of matches ignoring pagination.
    async fn list(&self, filter: &UserFilter) -> StoreResult<(Vec<User>, i64)>;
}

/// Record of revoked session tokens.
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Record a revoked token with its original expiry. Idempotent:
    /// re-adding an already-blacklisted token is a success no-op.
    async fn add(&self, token: &str, expires_at: DateTime<Utc>) -> StoreResult<()>;

    /// Membership check. Expiry is not consulted here; token verification
    /// AND-checks it separately.
    async fn contains(&self, token: &str) -> StoreResult<bool>;

    /// Remove entries whose expiry has passed. Returns the number reaped.
    async fn purge_expired(&self) -> StoreResult<u64>;
}

/// Shared atomic counter store backing the rate limiter.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increment the counter for `key` and return the count
    /// within the current window. The call that takes the count to 1 arms
    /// the window expiry; a lapsed window resets the count to 1.
    async fn increment(&self, key: &str, window_secs: u64) -> StoreResult<u64>;
}

pub use memory::{InMemoryBlacklist, InMemoryCounterStore, InMemoryUserStore};
pub use postgres::{PostgresBlacklist, PostgresCounterStore, PostgresUserStore};
