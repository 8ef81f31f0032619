//! Storage Module
//!
//! Persistence behind a single [`Storage`] trait so handlers never know which
//! backend they talk to:
//!
//! - [`SqliteStore`]: SQLite via sqlx (default)
//! - [`JsonFileStore`]: one JSON document rewritten on every mutation
//!
//! Timestamps cross this boundary as `i64` Unix millis.

pub mod json_file;
pub mod sqlite;

pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::models::{LineItem, Order, OrderCreate, PaymentMethod, Role, UserInfo};
use thiserror::Error;

/// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupted record: {0}")]
    Corrupted(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Duplicate(what) => AppError::already_exists(what),
            other => {
                tracing::error!(error = %other, "Storage operation failed");
                AppError::database("Storage operation failed")
            }
        }
    }
}

/// Inclusive window of Unix millis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    pub fn contains(&self, millis: i64) -> bool {
        self.start <= millis && millis <= self.end
    }
}

/// A validated order waiting for its id
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub items: Vec<LineItem>,
    pub total: f64,
    pub payment_method: PaymentMethod,
    /// Millisecond precision, matching what both backends can store
    pub date: DateTime<Utc>,
}

impl NewOrder {
    /// `now` is used when the payload carries no date
    pub fn from_create(create: OrderCreate, now: DateTime<Utc>) -> Self {
        let date = create.date.unwrap_or(now);
        let date = DateTime::from_timestamp_millis(date.timestamp_millis()).unwrap_or(date);
        Self {
            items: create.items,
            total: create.total,
            payment_method: create.payment_method,
            date,
        }
    }

    pub fn into_order(self, id: i64) -> Order {
        Order {
            id,
            items: self.items,
            total: self.total,
            payment_method: self.payment_method,
            date: self.date,
        }
    }
}

/// Stored user, including the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    /// Unix millis
    pub created_at: i64,
}

impl UserRecord {
    pub fn info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// A user waiting for its id
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist and return the order with its generated id
    async fn create_order(&self, order: NewOrder) -> StorageResult<Order>;

    /// Orders inside `range` (all when `None`), newest first
    async fn list_orders(&self, range: Option<TimeRange>) -> StorageResult<Vec<Order>>;

    async fn find_order(&self, id: i64) -> StorageResult<Option<Order>>;

    /// Remove and return the order; `None` when absent
    async fn delete_order(&self, id: i64) -> StorageResult<Option<Order>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`StorageError::Duplicate`] when the username is taken
    async fn create_user(&self, user: NewUser) -> StorageResult<UserRecord>;

    async fn find_user_by_username(&self, username: &str) -> StorageResult<Option<UserRecord>>;

    /// Whether at least one owner account exists
    async fn owner_exists(&self) -> StorageResult<bool>;
}

#[async_trait]
pub trait Storage: OrderStore + UserStore {
    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Cheap liveness check
    async fn ping(&self) -> StorageResult<()>;
}

/// Newest first; ties broken by id so listings are stable
pub(crate) fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
}
