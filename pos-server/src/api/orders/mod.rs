//! Order API Module
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /api/orders | GET | orders:read |
//! | /api/orders | POST | orders:write |
//! | /api/orders/{id} | GET | orders:read |
//! | /api/orders/{id} | DELETE | orders:delete |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::{ORDERS_DELETE, ORDERS_READ, ORDERS_WRITE};
use crate::auth::require_permission;
use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    let read = Router::new()
        .route("/api/orders", get(handler::list))
        .route("/api/orders/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission(ORDERS_READ)));

    let write = Router::new()
        .route("/api/orders", post(handler::create))
        .layer(middleware::from_fn(require_permission(ORDERS_WRITE)));

    let delete = Router::new()
        .route("/api/orders/{id}", axum::routing::delete(handler::delete))
        .layer(middleware::from_fn(require_permission(ORDERS_DELETE)));

    read.merge(write).merge(delete)
}
