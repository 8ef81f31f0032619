use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::auth::JwtService;
use crate::core::{Config, ServerError, StorageBackend};
use crate::storage::{JsonFileStore, SqliteStore, Storage, StorageResult};

/// 首次重试前的等待时间，之后每次翻倍
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求克隆一份的成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | storage | Arc<dyn Storage> | 订单与用户存储 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | started_at | Instant | 启动时间 (健康检查用) |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 存储后端
    pub storage: Arc<dyn Storage>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    pub started_at: Instant,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("storage", &self.storage.backend())
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// 用已打开的存储创建状态
    ///
    /// 测试中常与 [`SqliteStore::in_memory`] 搭配使用
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            storage,
            jwt_service,
            started_at: Instant::now(),
        }
    }

    /// 初始化服务器状态
    ///
    /// 打开配置的存储后端，失败时按指数退避重试
    /// `connect_retries` 次，仍失败则返回错误，服务不会在无存储的情况下启动。
    pub async fn initialize(config: &Config) -> Result<Self, ServerError> {
        let attempts = config.storage.connect_retries + 1;
        let mut delay = RETRY_BASE_DELAY;

        for attempt in 1..=attempts {
            match open_storage(config).await {
                Ok(storage) => {
                    tracing::info!(
                        backend = storage.backend(),
                        attempt,
                        "Storage ready"
                    );
                    return Ok(Self::new(config.clone(), storage));
                }
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        error = %e,
                        attempt,
                        retry_in_ms = delay.as_millis() as u64,
                        "Failed to open storage, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => {
                    tracing::error!(error = %e, attempts, "Storage unavailable, giving up");
                    return Err(e.into());
                }
            }
        }

        Err(ServerError::Config(
            "STORAGE_CONNECT_RETRIES produced no attempts".to_string(),
        ))
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 获取存储
    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

async fn open_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.storage.backend {
        StorageBackend::Sqlite => Arc::new(SqliteStore::connect(&config.storage.database_url).await?),
        StorageBackend::Json => Arc::new(JsonFileStore::open(&config.storage.data_file).await?),
    };
    Ok(storage)
}
