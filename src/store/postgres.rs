//! PostgreSQL Store Implementations
//!
//! SQLx-backed implementations of the storage traits. The operations the
//! concurrency model relies on are single statements: the partial unique
//! index guards Register, `ON CONFLICT DO NOTHING` makes blacklisting
//! idempotent, and the counter increment is one upsert whose window expiry
//! is only re-armed when the previous window has lapsed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{Role, User, UserFilter, UserRecord};
use crate::store::{CounterStore, NewUser, TokenBlacklist, UserStore};
use crate::utils::error::{StoreError, StoreResult};

/// Name of the partial unique index enforcing active-email uniqueness
const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_active_key";

/// Database row for user queries
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    password_hash: String,
    deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_record(self) -> StoreResult<UserRecord> {
        let role = self
            .role
            .parse::<Role>()
            .map_err(|_| StoreError::Backend(format!("unknown role in row: {}", self.role)))?;
        Ok(UserRecord {
            id: self.id,
            name: self.name,
            email: self.email,
            role,
            password_hash: self.password_hash,
            deleted: self.deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    fn into_user(self) -> StoreResult<User> {
        self.into_record().map(User::from)
    }
}

fn map_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT) {
            return StoreError::DuplicateEmail;
        }
    }
    err.into()
}

/// User directory backed by the `users` table
#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, role, password_hash, deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6, $6)
            RETURNING id, name, email, role, password_hash, deleted, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        row.into_user()
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, password_hash, deleted, created_at, updated_at
            FROM users
            WHERE id = $1 AND NOT deleted
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, password_hash, deleted, created_at, updated_at
            FROM users
            WHERE email = $1 AND NOT deleted
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_record).transpose()
    }

    async fn update_profile(&self, id: Uuid, name: &str, email: &str) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, updated_at = now()
            WHERE id = $1 AND NOT deleted
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET role = $2, updated_at = now()
            WHERE id = $1 AND NOT deleted
            "#,
        )
        .bind(id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = now()
            WHERE id = $1 AND NOT deleted
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn mark_deleted(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET deleted = TRUE, updated_at = now()
            WHERE id = $1 AND NOT deleted
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, filter: &UserFilter) -> StoreResult<(Vec<User>, i64)> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE NOT deleted
              AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR email ILIKE '%' || $2 || '%')
            "#,
        )
        .bind(&filter.name)
        .bind(&filter.email)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, password_hash, deleted, created_at, updated_at
            FROM users
            WHERE NOT deleted
              AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR email ILIKE '%' || $2 || '%')
            ORDER BY created_at ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&filter.name)
        .bind(&filter.email)
        .bind(filter.effective_limit())
        .bind(filter.skip())
        .fetch_all(&self.pool)
        .await?;

        let users = rows
            .into_iter()
            .map(UserRow::into_user)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok((users, total))
    }
}

/// Token blacklist backed by the `token_blacklist` table
#[derive(Clone)]
pub struct PostgresBlacklist {
    pool: PgPool,
}

impl PostgresBlacklist {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenBlacklist for PostgresBlacklist {
    async fn add(&self, token: &str, expires_at: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO token_blacklist (token, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (token) DO NOTHING
            "#,
        )
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn contains(&self, token: &str) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM token_blacklist WHERE token = $1)")
                .bind(token)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn purge_expired(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM token_blacklist WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Counter store backed by the `rate_limit_counters` table
#[derive(Clone)]
pub struct PostgresCounterStore {
    pool: PgPool,
}

impl PostgresCounterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CounterStore for PostgresCounterStore {
    async fn increment(&self, key: &str, window_secs: u64) -> StoreResult<u64> {
        // Single statement: concurrent callers sharing a key serialize on
        // the row, and only the call that starts a window arms its expiry.
        let count: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO rate_limit_counters AS c (counter_key, count, window_expires_at)
            VALUES ($1, 1, now() + make_interval(secs => $2))
            ON CONFLICT (counter_key) DO UPDATE SET
                count = CASE
                    WHEN c.window_expires_at <= now() THEN 1
                    ELSE c.count + 1
                END,
                window_expires_at = CASE
                    WHEN c.window_expires_at <= now() THEN excluded.window_expires_at
                    ELSE c.window_expires_at
                END
            RETURNING count
            "#,
        )
        .bind(key)
        .bind(window_secs as f64)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }
}
