//! Order API Handlers

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use shared::models::{Order, OrderCreate};

use crate::AppError;
use crate::api::{AppJson, AppPath, AppQuery};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::stats::{DateFilter, DateQuery};
use crate::storage::NewOrder;
use crate::utils::AppResult;
use crate::utils::validation::validate_order_create;

/// GET /api/orders - 订单列表 (新到旧)
///
/// 支持 `?day=` / `?week=` / `?month=` 过滤，无参数时返回全部
pub async fn list(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<DateQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let window = DateFilter::from_query(&query)?.resolve(state.config.timezone);
    let orders = state.storage().list_orders(window.range).await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Order>> {
    state
        .storage()
        .find_order(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::order_not_found(id))
}

/// POST /api/orders - 结账
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    AppJson(payload): AppJson<OrderCreate>,
) -> AppResult<(StatusCode, Json<Order>)> {
    validate_order_create(&payload)?;

    let order = state
        .storage()
        .create_order(NewOrder::from_create(payload, Utc::now()))
        .await?;

    tracing::info!(
        order_id = order.id,
        total = order.total,
        payment_method = %order.payment_method,
        items = order.items.len(),
        cashier = %user.username,
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

/// DELETE /api/orders/{id} - 返回被删除的订单
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Order>> {
    let order = state
        .storage()
        .delete_order(id)
        .await?
        .ok_or_else(|| AppError::order_not_found(id))?;

    tracing::info!(order_id = id, by = %user.username, "Order deleted");
    Ok(Json(order))
}
