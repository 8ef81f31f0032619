//! 健康检查路由
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 简单健康检查 | 无 |
//! | /health/detailed | GET | 详细健康检查 | 无 |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::time;

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(detailed_health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// 详细健康检查响应
#[derive(Serialize)]
pub struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    /// 运行时间 (秒)
    uptime_seconds: u64,
    /// 营业时区
    timezone: String,
    /// 营业时区下的当前日期
    business_date: String,
    checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    storage: CheckResult,
}

/// 单项检查结果
#[derive(Serialize)]
pub struct CheckResult {
    /// 状态 (ok | error)
    status: &'static str,
    backend: &'static str,
    /// 延迟 (毫秒)
    latency_ms: Option<u64>,
    message: Option<String>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// 包含存储状态的详细健康检查
pub async fn detailed_health(State(state): State<ServerState>) -> Json<DetailedHealthResponse> {
    let storage = state.storage();
    let started = std::time::Instant::now();
    let storage_check = match storage.ping().await {
        Ok(()) => CheckResult {
            status: "ok",
            backend: storage.backend(),
            latency_ms: Some(started.elapsed().as_millis() as u64),
            message: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Storage health check failed");
            CheckResult {
                status: "error",
                backend: storage.backend(),
                latency_ms: None,
                message: Some("Storage unreachable".to_string()),
            }
        }
    };

    let tz = state.config.timezone;
    Json(DetailedHealthResponse {
        status: if storage_check.status == "ok" {
            "healthy"
        } else {
            "degraded"
        },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime().as_secs(),
        timezone: tz.name().to_string(),
        business_date: time::today(tz).to_string(),
        checks: HealthChecks {
            storage: storage_check,
        },
    })
}
