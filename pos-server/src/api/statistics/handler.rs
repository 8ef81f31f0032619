//! Statistics API Handlers

use axum::{Json, extract::State};
use shared::models::StatisticsReport;

use crate::api::AppQuery;
use crate::core::ServerState;
use crate::stats::{DateFilter, DateQuery, build_report};
use crate::utils::AppResult;

/// GET /api/statistics?day= | ?week= | ?month=
///
/// 每次请求都从订单重新计算，不缓存
pub async fn get_statistics(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<DateQuery>,
) -> AppResult<Json<StatisticsReport>> {
    let tz = state.config.timezone;
    let window = DateFilter::from_query(&query)?.resolve(tz);
    let orders = state.storage().list_orders(window.range).await?;

    let report = build_report(&orders, &window, tz);
    tracing::debug!(
        filter = window.kind.as_str(),
        orders = report.order_count,
        total = report.total_revenue,
        "Statistics computed"
    );
    Ok(Json(report))
}
