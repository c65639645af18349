//! In-Memory Store Implementations
//!
//! Mutex-guarded implementations of the storage traits, mirroring the
//! Postgres semantics (active-email uniqueness, soft-delete filtering,
//! case-insensitive substring listing, fixed-window counters). Used by the
//! test suite and for single-node development without external stores.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::user::{Role, User, UserFilter, UserRecord};
use crate::store::{CounterStore, NewUser, TokenBlacklist, UserStore};
use crate::utils::error::{StoreError, StoreResult};

/// User directory held in process memory
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<Uuid, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(record: &UserRecord, filter: &UserFilter) -> bool {
    let name_ok = filter
        .name
        .as_ref()
        .map(|n| record.name.to_lowercase().contains(&n.to_lowercase()))
        .unwrap_or(true);
    let email_ok = filter
        .email
        .as_ref()
        .map(|e| record.email.to_lowercase().contains(&e.to_lowercase()))
        .unwrap_or(true);
    name_ok && email_ok
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.lock().expect("user store lock poisoned");

        let duplicate = users
            .values()
            .any(|existing| !existing.deleted && existing.email == user.email);
        if duplicate {
            return Err(StoreError::DuplicateEmail);
        }

        let record = UserRecord {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            password_hash: user.password_hash,
            deleted: false,
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        users.insert(record.id, record.clone());

        Ok(record.into())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.lock().expect("user store lock poisoned");
        Ok(users
            .get(&id)
            .filter(|record| !record.deleted)
            .cloned()
            .map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let users = self.users.lock().expect("user store lock poisoned");
        Ok(users
            .values()
            .find(|record| !record.deleted && record.email == email)
            .cloned())
    }

    async fn update_profile(&self, id: Uuid, name: &str, email: &str) -> StoreResult<()> {
        let mut users = self.users.lock().expect("user store lock poisoned");

        let collision = users
            .values()
            .any(|other| other.id != id && !other.deleted && other.email == email);
        if collision {
            return Err(StoreError::DuplicateEmail);
        }

        let record = users
            .get_mut(&id)
            .filter(|record| !record.deleted)
            .ok_or(StoreError::NotFound)?;
        record.name = name.to_string();
        record.email = email.to_string();
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> StoreResult<()> {
        let mut users = self.users.lock().expect("user store lock poisoned");
        let record = users
            .get_mut(&id)
            .filter(|record| !record.deleted)
            .ok_or(StoreError::NotFound)?;
        record.role = role;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> StoreResult<()> {
        let mut users = self.users.lock().expect("user store lock poisoned");
        let record = users
            .get_mut(&id)
            .filter(|record| !record.deleted)
            .ok_or(StoreError::NotFound)?;
        record.password_hash = password_hash.to_string();
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_deleted(&self, id: Uuid) -> StoreResult<()> {
        let mut users = self.users.lock().expect("user store lock poisoned");
        let record = users
            .get_mut(&id)
            .filter(|record| !record.deleted)
            .ok_or(StoreError::NotFound)?;
        record.deleted = true;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn list(&self, filter: &UserFilter) -> StoreResult<(Vec<User>, i64)> {
        let users = self.users.lock().expect("user store lock poisoned");

        let mut matches: Vec<&UserRecord> = users
            .values()
            .filter(|record| !record.deleted && matches_filter(record, filter))
            .collect();
        matches.sort_by_key(|record| record.created_at);

        let total = matches.len() as i64;
        let page: Vec<User> = matches
            .into_iter()
            .skip(filter.skip() as usize)
            .take(filter.effective_limit() as usize)
            .cloned()
            .map(User::from)
            .collect();

        Ok((page, total))
    }
}

/// Token blacklist held in process memory
#[derive(Default)]
pub struct InMemoryBlacklist {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryBlacklist {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryBlacklist {
    async fn add(&self, token: &str, expires_at: DateTime<Utc>) -> StoreResult<()> {
        let mut entries = self.entries.lock().expect("blacklist lock poisoned");
        entries.entry(token.to_string()).or_insert(expires_at);
        Ok(())
    }

    async fn contains(&self, token: &str) -> StoreResult<bool> {
        let entries = self.entries.lock().expect("blacklist lock poisoned");
        Ok(entries.contains_key(token))
    }

    async fn purge_expired(&self) -> StoreResult<u64> {
        let mut entries = self.entries.lock().expect("blacklist lock poisoned");
        let now = Utc::now();
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}

/// Fixed-window counters held in process memory
#[derive(Default)]
pub struct InMemoryCounterStore {
    counters: Mutex<HashMap<String, (u64, DateTime<Utc>)>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, key: &str, window_secs: u64) -> StoreResult<u64> {
        let mut counters = self.counters.lock().expect("counter store lock poisoned");
        let now = Utc::now();

        match counters.get_mut(key) {
            Some((count, window_expires_at)) if *window_expires_at > now => {
                *count += 1;
                Ok(*count)
            }
            _ => {
                let window = Duration::seconds(window_secs.min(i64::MAX as u64 / 1000) as i64);
                let expires_at = now
                    .checked_add_signed(window)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                counters.insert(key.to_string(), (1, expires_at));
                Ok(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, name: &str) -> NewUser {
        NewUser {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            role: Role::User,
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemoryUserStore::new();
        let user = store.insert(new_user("a@b.com", "Ann")).await.unwrap();

        let by_id = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@b.com");

        let by_email = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryUserStore::new();
        store.insert(new_user("a@b.com", "Ann")).await.unwrap();

        let result = store.insert(new_user("a@b.com", "Other")).await;
        assert!(matches!(result, Err(StoreError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_deleted_user_frees_email() {
        let store = InMemoryUserStore::new();
        let user = store.insert(new_user("a@b.com", "Ann")).await.unwrap();
        store.mark_deleted(user.id).await.unwrap();

        assert!(store.find_by_id(user.id).await.unwrap().is_none());
        assert!(store.find_by_email("a@b.com").await.unwrap().is_none());

        // Soft-deleted rows no longer block the address
        store.insert(new_user("a@b.com", "Again")).await.unwrap();
    }

    #[tokio::test]
    async fn test_mark_deleted_twice_fails() {
        let store = InMemoryUserStore::new();
        let user = store.insert(new_user("a@b.com", "Ann")).await.unwrap();

        store.mark_deleted(user.id).await.unwrap();
        let result = store.mark_deleted(user.id).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_profile_email_collision() {
        let store = InMemoryUserStore::new();
        store.insert(new_user("a@b.com", "Ann")).await.unwrap();
        let bob = store.insert(new_user("bob@b.com", "Bob")).await.unwrap();

        let result = store.update_profile(bob.id, "Bob", "a@b.com").await;
        assert!(matches!(result, Err(StoreError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_list_filter_and_pagination() {
        let store = InMemoryUserStore::new();
        for i in 0..15 {
            store
                .insert(new_user(&format!("user{i}@example.com"), &format!("User {i}")))
                .await
                .unwrap();
        }
        store.insert(new_user("admin@other.org", "Boss")).await.unwrap();

        // Default page size is 10, total ignores pagination
        let (page, total) = store.list(&UserFilter::default()).await.unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(total, 16);

        // Substring filter on email, case-insensitive
        let filter = UserFilter {
            email: Some("EXAMPLE.COM".to_string()),
            ..Default::default()
        };
        let (page, total) = store.list(&filter).await.unwrap();
        assert_eq!(total, 15);
        assert_eq!(page.len(), 10);

        // Second page
        let filter = UserFilter {
            email: Some("example.com".to_string()),
            page: 2,
            limit: 10,
            ..Default::default()
        };
        let (page, total) = store.list(&filter).await.unwrap();
        assert_eq!(total, 15);
        assert_eq!(page.len(), 5);
    }

    #[tokio::test]
    async fn test_blacklist_idempotent_add() {
        let blacklist = InMemoryBlacklist::new();
        let expiry = Utc::now() + Duration::hours(1);

        blacklist.add("token-1", expiry).await.unwrap();
        blacklist.add("token-1", expiry).await.unwrap();

        assert!(blacklist.contains("token-1").await.unwrap());
        assert!(!blacklist.contains("token-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_blacklist_purge_expired() {
        let blacklist = InMemoryBlacklist::new();
        blacklist
            .add("stale", Utc::now() - Duration::hours(1))
            .await
            .unwrap();
        blacklist
            .add("fresh", Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        let reaped = blacklist.purge_expired().await.unwrap();
        assert_eq!(reaped, 1);
        assert!(!blacklist.contains("stale").await.unwrap());
        assert!(blacklist.contains("fresh").await.unwrap());
    }

    #[tokio::test]
    async fn test_counter_increments_within_window() {
        let counters = InMemoryCounterStore::new();

        for expected in 1..=5 {
            let count = counters.increment("login_attempts:a@b.com", 60).await.unwrap();
            assert_eq!(count, expected);
        }

        // Independent keys do not share counts
        let other = counters.increment("login_attempts:x@y.com", 60).await.unwrap();
        assert_eq!(other, 1);
    }

    #[tokio::test]
    async fn test_counter_lapsed_window_resets() {
        let counters = InMemoryCounterStore::new();

        // A zero-length window lapses immediately, so each call starts fresh
        assert_eq!(counters.increment("key", 0).await.unwrap(), 1);
        assert_eq!(counters.increment("key", 0).await.unwrap(), 1);
    }
}
