//! POS Server - 餐厅收银后端
//!
//! # 架构概述
//!
//! - **订单** (`api::orders`): 结账、查询、删除
//! - **统计** (`stats`): 日/周/月时间窗口与按数量加权的销售汇总
//! - **认证** (`auth`): JWT + Argon2，店主/前台两种角色
//! - **存储** (`storage`): SQLite 或单个 JSON 文档，统一 trait 接口
//!
//! # 模块结构
//!
//! ```text
//! pos-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # JWT 认证、权限、密码
//! ├── api/           # HTTP 路由和处理器
//! ├── stats/         # 时间窗口、汇总
//! ├── storage/       # 存储后端
//! └── utils/         # 日志、时间、校验
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod stats;
pub mod storage;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use crate::core::{Config, Server, ServerState, build_router};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

pub use utils::logger::init_logger_with_file;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
