//! Flat-file backend
//!
//! The whole dataset lives in one JSON document:
//!
//! ```json
//! { "orders": [ ... ], "users": [ ... ] }
//! ```
//!
//! It is loaded once and kept in memory behind a mutex. Every mutation
//! prepares the next document, writes it to a temp file, renames it over
//! the original, and only then replaces the in-memory copy. A failed write
//! leaves both the file and memory unchanged.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::{Order, Role};
use shared::util::{now_millis, snowflake_id};
use tokio::sync::Mutex;

use super::{
    NewOrder, NewUser, OrderStore, Storage, StorageError, StorageResult, TimeRange, UserRecord,
    UserStore, sort_newest_first,
};

/// On-disk document. Unknown keys (such as an old `statistics` cache) are
/// dropped on the next write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DataFile {
    #[serde(default)]
    orders: Vec<Order>,
    #[serde(default)]
    users: Vec<UserRecord>,
}

impl DataFile {
    /// Give every order a unique non-zero id. Returns whether anything changed.
    fn assign_missing_ids(&mut self) -> bool {
        let mut seen = HashSet::new();
        let mut changed = false;
        for order in &mut self.orders {
            if order.id == 0 || !seen.insert(order.id) {
                order.id = unused_id(&seen);
                seen.insert(order.id);
                changed = true;
            }
        }
        changed
    }
}

fn unused_id(taken: &HashSet<i64>) -> i64 {
    loop {
        let id = snowflake_id();
        if !taken.contains(&id) {
            return id;
        }
    }
}

/// JSON-document store with single-writer discipline
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<DataFile>,
}

impl JsonFileStore {
    /// Load `path`, creating an empty document if it does not exist
    pub async fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();

        let data = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => None,
            Ok(bytes) => Some(serde_json::from_slice::<DataFile>(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let store = match data {
            Some(mut data) => {
                let repaired = data.assign_missing_ids();
                tracing::info!(
                    path = %path.display(),
                    orders = data.orders.len(),
                    users = data.users.len(),
                    "Data file loaded"
                );
                let store = Self {
                    path,
                    data: Mutex::new(data.clone()),
                };
                if repaired {
                    tracing::info!("Assigned ids to legacy orders");
                    store.persist(&data).await?;
                }
                store
            }
            None => {
                if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(dir).await?;
                }
                let store = Self {
                    path,
                    data: Mutex::new(DataFile::default()),
                };
                store.persist(&DataFile::default()).await?;
                tracing::info!(path = %store.path.display(), "Created empty data file");
                store
            }
        };

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `data` to a sibling temp file, then rename it into place
    async fn persist(&self, data: &DataFile) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(data)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for JsonFileStore {
    async fn create_order(&self, order: NewOrder) -> StorageResult<Order> {
        let mut data = self.data.lock().await;

        let taken: HashSet<i64> = data.orders.iter().map(|o| o.id).collect();
        let order = order.into_order(unused_id(&taken));

        let mut next = data.clone();
        next.orders.push(order.clone());
        self.persist(&next).await?;
        *data = next;

        Ok(order)
    }

    async fn list_orders(&self, range: Option<TimeRange>) -> StorageResult<Vec<Order>> {
        let data = self.data.lock().await;
        let mut orders: Vec<Order> = data
            .orders
            .iter()
            .filter(|o| range.is_none_or(|r| r.contains(o.date.timestamp_millis())))
            .cloned()
            .collect();
        drop(data);

        sort_newest_first(&mut orders);
        Ok(orders)
    }

    async fn find_order(&self, id: i64) -> StorageResult<Option<Order>> {
        let data = self.data.lock().await;
        Ok(data.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn delete_order(&self, id: i64) -> StorageResult<Option<Order>> {
        let mut data = self.data.lock().await;

        let Some(index) = data.orders.iter().position(|o| o.id == id) else {
            return Ok(None);
        };

        let mut next = data.clone();
        let removed = next.orders.remove(index);
        self.persist(&next).await?;
        *data = next;

        Ok(Some(removed))
    }
}

#[async_trait]
impl UserStore for JsonFileStore {
    async fn create_user(&self, user: NewUser) -> StorageResult<UserRecord> {
        let mut data = self.data.lock().await;

        if data.users.iter().any(|u| u.username == user.username) {
            return Err(StorageError::Duplicate(format!(
                "username '{}'",
                user.username
            )));
        }

        let taken: HashSet<i64> = data.users.iter().map(|u| u.id).collect();
        let record = UserRecord {
            id: unused_id(&taken),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now_millis(),
        };

        let mut next = data.clone();
        next.users.push(record.clone());
        self.persist(&next).await?;
        *data = next;

        Ok(record)
    }

    async fn find_user_by_username(&self, username: &str) -> StorageResult<Option<UserRecord>> {
        let data = self.data.lock().await;
        Ok(data.users.iter().find(|u| u.username == username).cloned())
    }

    async fn owner_exists(&self) -> StorageResult<bool> {
        let data = self.data.lock().await;
        Ok(data.users.iter().any(|u| u.role == Role::Owner))
    }
}

#[async_trait]
impl Storage for JsonFileStore {
    fn backend(&self) -> &'static str {
        "json"
    }

    async fn ping(&self) -> StorageResult<()> {
        tokio::fs::metadata(&self.path).await?;
        Ok(())
    }
}
