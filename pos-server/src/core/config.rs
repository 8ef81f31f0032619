use std::path::PathBuf;

use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::core::ServerError;

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// SQLite (默认)
    Sqlite,
    /// 单个 JSON 文档
    Json,
}

impl std::str::FromStr for StorageBackend {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "json" => Ok(Self::Json),
            other => Err(ServerError::Config(format!(
                "STORAGE_BACKEND must be 'sqlite' or 'json', got '{other}'"
            ))),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// SQLite 连接串
    pub database_url: String,
    /// JSON 文档路径
    pub data_file: PathBuf,
    /// 启动时打开存储的重试次数
    pub connect_retries: u32,
}

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 5000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | STORAGE_BACKEND | sqlite | sqlite \| json |
/// | DATABASE_URL | sqlite://data/pos.db | SQLite 连接串 |
/// | DATA_FILE | data/orders.json | JSON 文档路径 |
/// | STORAGE_CONNECT_RETRIES | 3 | 存储打开重试次数 |
/// | TIMEZONE | Asia/Ho_Chi_Minh | 营业时区 (IANA) |
/// | ALLOW_OPEN_REGISTRATION | true | 匿名注册开关 (true/false, 1/0, yes/no, on/off)；开启时匿名只能注册店员，或在尚无店主时注册首个店主 |
/// | LOGIN_DELAY_MS | 300 | 登录固定延迟 (毫秒) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (无) | 日志目录，设置后按天滚动写文件 |
///
/// JWT 相关变量见 [`JwtConfig::from_env`]。
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 存储配置
    pub storage: StorageConfig,
    /// 营业时区，日/周/月边界按此计算
    pub timezone: Tz,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 为 false 时只有店主可以创建账号；为 true 时匿名注册店主仅限首个账号
    pub allow_open_registration: bool,
    /// 登录结果返回前的固定延迟 (防时序攻击)
    pub login_delay_ms: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 开关项: true/1/yes/on 与 false/0/no/off (不区分大小写)，其余值报错
fn parse_flag(key: &str, value: &str) -> Result<bool, ServerError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ServerError::Config(format!(
            "{key} must be true/false, 1/0, yes/no or on/off, got '{value}'"
        ))),
    }
}

fn env_flag(key: &str, default: bool) -> Result<bool, ServerError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => parse_flag(key, &value),
        _ => Ok(default),
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 数值项解析失败时回退默认值；时区、存储后端、开关项或 JWT 配置无效时报错
    pub fn from_env() -> Result<Self, ServerError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";

        let backend = match std::env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Sqlite,
        };

        let timezone_name =
            std::env::var("TIMEZONE").unwrap_or_else(|_| "Asia/Ho_Chi_Minh".into());
        let timezone: Tz = timezone_name.parse().map_err(|_| {
            ServerError::Config(format!("Unknown TIMEZONE '{timezone_name}'"))
        })?;

        Ok(Self {
            http_port: env_or("HTTP_PORT", 5000),
            environment,
            storage: StorageConfig {
                backend,
                database_url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://data/pos.db".into()),
                data_file: std::env::var("DATA_FILE")
                    .unwrap_or_else(|_| "data/orders.json".into())
                    .into(),
                connect_retries: env_or("STORAGE_CONNECT_RETRIES", 3),
            },
            timezone,
            jwt: JwtConfig::from_env(is_production)?,
            allow_open_registration: env_flag("ALLOW_OPEN_REGISTRATION", true)?,
            login_delay_ms: env_or("LOGIN_DELAY_MS", 300),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        })
    }

    /// 固定配置，不读取环境变量
    ///
    /// 常用于测试场景：内存 SQLite、无登录延迟
    pub fn for_tests(jwt_secret: impl Into<String>) -> Self {
        Self {
            http_port: 0,
            environment: "test".into(),
            storage: StorageConfig {
                backend: StorageBackend::Sqlite,
                database_url: "sqlite::memory:".into(),
                data_file: "orders.json".into(),
                connect_retries: 0,
            },
            timezone: chrono_tz::Asia::Ho_Chi_Minh,
            jwt: JwtConfig::with_secret(jwt_secret),
            allow_open_registration: true,
            login_delay_ms: 0,
            log_level: "debug".into(),
            log_dir: None,
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
