//! Statistics API 模块 (销售统计)

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::permissions::STATISTICS_VIEW;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    // 报表查看：仅店主
    Router::new()
        .route("/api/statistics", get(handler::get_statistics))
        .layer(middleware::from_fn(require_permission(STATISTICS_VIEW)))
}
