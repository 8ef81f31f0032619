//! SQLite backend
//!
//! Connection pool with WAL, embedded migrations, and row ↔ model mapping.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use shared::models::{LineItem, Order, PaymentMethod, Role};
use shared::util::{now_millis, snowflake_id};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{FromRow, SqlitePool};

use super::{
    NewOrder, NewUser, OrderStore, Storage, StorageError, StorageResult, TimeRange, UserRecord,
    UserStore,
};

/// Fresh ids drawn before giving up on a primary-key collision
const MAX_ID_ATTEMPTS: u32 = 3;

const ORDER_COLUMNS: &str = "id, items, total, payment_method, created_at";
const USER_COLUMNS: &str = "id, username, password_hash, role, created_at";

#[derive(Debug, FromRow)]
struct OrderRow {
    id: i64,
    items: String,
    total: f64,
    payment_method: String,
    created_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = StorageError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let items: Vec<LineItem> = serde_json::from_str(&row.items)?;
        let date = DateTime::from_timestamp_millis(row.created_at).ok_or_else(|| {
            StorageError::Corrupted(format!(
                "order {} has invalid timestamp {}",
                row.id, row.created_at
            ))
        })?;
        Ok(Order {
            id: row.id,
            items,
            total: row.total,
            payment_method: PaymentMethod::from(row.payment_method),
            date,
        })
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    role: String,
    created_at: i64,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = StorageError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role)
            .map_err(|e| StorageError::Corrupted(format!("user {}: {}", row.id, e)))?;
        Ok(UserRecord {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

fn unique_violation(err: &sqlx::Error) -> Option<String> {
    err.as_database_error()
        .filter(|e| e.is_unique_violation())
        .map(|e| e.message().to_string())
}

/// Directory holding the database file, if the URL points at one
fn database_dir(url: &str) -> Option<PathBuf> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// SQLite-backed store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and apply migrations
    pub async fn connect(url: &str) -> StorageResult<Self> {
        if let Some(dir) = database_dir(url) {
            tokio::fs::create_dir_all(&dir).await?;
        }

        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON")
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        tracing::info!(url, "Database connection established (SQLite WAL, busy_timeout=5000ms)");
        Self::with_pool(pool).await
    }

    /// Private in-memory database.
    ///
    /// A single connection that never expires; every new connection to
    /// `:memory:` would see an empty database.
    pub async fn in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> StorageResult<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
        Ok(Self { pool })
    }
}

#[async_trait]
impl OrderStore for SqliteStore {
    async fn create_order(&self, order: NewOrder) -> StorageResult<Order> {
        let items = serde_json::to_string(&order.items)?;
        let created_at = order.date.timestamp_millis();

        let mut attempt = 0;
        loop {
            attempt += 1;
            let id = snowflake_id();
            let result = sqlx::query(
                "INSERT INTO orders (id, items, total, payment_method, created_at) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(&items)
            .bind(order.total)
            .bind(order.payment_method.as_str())
            .bind(created_at)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => return Ok(order.into_order(id)),
                Err(e) if attempt < MAX_ID_ATTEMPTS && unique_violation(&e).is_some() => {
                    tracing::warn!(id, attempt, "Order id collision, drawing a new id");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn list_orders(&self, range: Option<TimeRange>) -> StorageResult<Vec<Order>> {
        let (start, end) = match range {
            Some(r) => (Some(r.start), Some(r.end)),
            None => (None, None),
        };
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE (?1 IS NULL OR created_at >= ?1) AND (?2 IS NULL OR created_at <= ?2) \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn find_order(&self, id: i64) -> StorageResult<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Order::try_from).transpose()
    }

    async fn delete_order(&self, id: i64) -> StorageResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "DELETE FROM orders WHERE id = ? RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Order::try_from).transpose()
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn create_user(&self, user: NewUser) -> StorageResult<UserRecord> {
        let created_at = now_millis();

        let mut attempt = 0;
        loop {
            attempt += 1;
            let id = snowflake_id();
            let result = sqlx::query(
                "INSERT INTO users (id, username, password_hash, role, created_at) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(created_at)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => {
                    return Ok(UserRecord {
                        id,
                        username: user.username,
                        password_hash: user.password_hash,
                        role: user.role,
                        created_at,
                    });
                }
                Err(e) => match unique_violation(&e) {
                    Some(msg) if msg.contains("users.username") => {
                        return Err(StorageError::Duplicate(format!(
                            "username '{}'",
                            user.username
                        )));
                    }
                    Some(_) if attempt < MAX_ID_ATTEMPTS => {
                        tracing::warn!(id, attempt, "User id collision, drawing a new id");
                    }
                    _ => return Err(e.into()),
                },
            }
        }
    }

    async fn find_user_by_username(&self, username: &str) -> StorageResult<Option<UserRecord>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        row.map(UserRecord::try_from).transpose()
    }

    async fn owner_exists(&self) -> StorageResult<bool> {
        let found: i64 =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE role = ?)")
                .bind(Role::Owner.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(found != 0)
    }
}

#[async_trait]
impl Storage for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn new_order(name: &str, millis: i64, method: PaymentMethod) -> NewOrder {
        NewOrder {
            items: vec![LineItem {
                name: name.to_string(),
                price: 50000.0,
                quantity: 2,
                category: None,
            }],
            total: 100000.0,
            payment_method: method,
            date: Utc.timestamp_millis_opt(millis).unwrap(),
        }
    }

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "$argon2id$fake".to_string(),
            role,
        }
    }

    #[test]
    fn test_database_dir() {
        assert_eq!(
            database_dir("sqlite://data/pos.db"),
            Some(PathBuf::from("data"))
        );
        assert_eq!(
            database_dir("sqlite:/var/lib/pos/pos.db?mode=rwc"),
            Some(PathBuf::from("/var/lib/pos"))
        );
        assert_eq!(database_dir("sqlite::memory:"), None);
        assert_eq!(database_dir("sqlite://pos.db"), None);
    }

    #[tokio::test]
    async fn test_order_lifecycle() {
        let store = SqliteStore::in_memory().await.unwrap();

        let created = store
            .create_order(new_order("Pho", 1_710_480_000_000, PaymentMethod::Cash))
            .await
            .unwrap();
        assert!(created.id > 0);

        let found = store.find_order(created.id).await.unwrap().unwrap();
        assert_eq!(found, created);

        let deleted = store.delete_order(created.id).await.unwrap().unwrap();
        assert_eq!(deleted, created);
        assert!(store.find_order(created.id).await.unwrap().is_none());
        assert!(store.delete_order(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_range_and_order() {
        let store = SqliteStore::in_memory().await.unwrap();
        for millis in [1_000, 3_000, 2_000, 5_000] {
            store
                .create_order(new_order("Pho", millis, PaymentMethod::Bank))
                .await
                .unwrap();
        }

        let all = store.list_orders(None).await.unwrap();
        let times: Vec<i64> = all.iter().map(|o| o.date.timestamp_millis()).collect();
        assert_eq!(times, vec![5_000, 3_000, 2_000, 1_000]);

        let some = store
            .list_orders(Some(TimeRange {
                start: 2_000,
                end: 3_000,
            }))
            .await
            .unwrap();
        let times: Vec<i64> = some.iter().map(|o| o.date.timestamp_millis()).collect();
        assert_eq!(times, vec![3_000, 2_000]);
    }

    #[tokio::test]
    async fn test_unknown_payment_method_round_trips() {
        let store = SqliteStore::in_memory().await.unwrap();
        let created = store
            .create_order(new_order("Pho", 1_000, PaymentMethod::Other("momo".into())))
            .await
            .unwrap();
        let found = store.find_order(created.id).await.unwrap().unwrap();
        assert_eq!(found.payment_method, PaymentMethod::Other("momo".into()));
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .create_user(new_user("alice", Role::Owner))
            .await
            .unwrap();

        let err = store
            .create_user(new_user("alice", Role::Receptionist))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Duplicate(_)));

        let alice = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(alice.role, Role::Owner);
        assert!(store.find_user_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_owner_exists() {
        let store = SqliteStore::in_memory().await.unwrap();
        assert!(!store.owner_exists().await.unwrap());

        store
            .create_user(new_user("lan", Role::Receptionist))
            .await
            .unwrap();
        assert!(!store.owner_exists().await.unwrap());

        store.create_user(new_user("minh", Role::Owner)).await.unwrap();
        assert!(store.owner_exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_connect_creates_file_and_ping() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}/nested/pos.db", dir.path().display());

        let store = SqliteStore::connect(&url).await.unwrap();
        store.ping().await.unwrap();
        assert_eq!(store.backend(), "sqlite");
        assert!(dir.path().join("nested/pos.db").exists());
    }
}
