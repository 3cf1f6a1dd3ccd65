//! Repository traits the service layer is written against.
//!
//! `PgStore` implements them on top of PostgreSQL; tests use the in-memory store.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::models::{
    HistoryEntry, Level, NewUser, Profile, ProfileUpdate, Resource, Subcategories, UserRecord,
};

#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique key (user email) is already taken.
    #[error("{0}")]
    Duplicate(String),

    /// A stored row could not be mapped back to a model.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Whether an upsert inserted a new row or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Insert a new user. Fails with `StoreError::Duplicate` if the email is taken.
    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord>;

    /// Find-or-insert by email, then apply the present fields of `update`, as one operation.
    ///
    /// When the row is created its username is `update.username` or `default_username`
    /// and its password hash is `placeholder_hash`.
    async fn upsert_profile(
        &self,
        email: &str,
        default_username: &str,
        placeholder_hash: &str,
        update: &ProfileUpdate,
    ) -> StoreResult<Profile>;

    /// Returns false if no user has that email.
    async fn set_password_hash(&self, email: &str, password_hash: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Insert or replace the subcategories of the exact (topic, level) pair.
    async fn upsert_resource(
        &self,
        topic: &str,
        level: Level,
        subcategories: &Subcategories,
    ) -> StoreResult<(UpsertOutcome, Resource)>;

    /// Earliest-created resource whose topic equals `topic` ignoring case.
    async fn find_resource_by_topic(&self, topic: &str) -> StoreResult<Option<Resource>>;

    /// Every level-variant whose topic equals `topic` ignoring case.
    async fn find_resources_by_topic(&self, topic: &str) -> StoreResult<Vec<Resource>>;

    /// Distinct topic names in discovery order.
    async fn list_topics(&self) -> StoreResult<Vec<String>>;
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn insert_history(&self, email: &str, topic: &str) -> StoreResult<HistoryEntry>;

    /// Entries for `email`, newest first.
    async fn list_history(&self, email: &str) -> StoreResult<Vec<HistoryEntry>>;

    /// Returns false if no entry has that id.
    async fn delete_history(&self, id: Uuid) -> StoreResult<bool>;
}

/// Connectivity probe used by the readiness check.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> StoreResult<std::time::Duration>;
}
