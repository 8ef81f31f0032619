//! Sales statistics: date windows and aggregation

pub mod aggregate;
pub mod range;

pub use aggregate::{SalesSummary, aggregate};
pub use range::{DateFilter, DateQuery, DateWindow};

use chrono_tz::Tz;
use shared::models::{Order, StatisticsReport};

/// Aggregate `orders` (already restricted to `window`) into a report that
/// echoes the window back
pub fn build_report(orders: &[Order], window: &DateWindow, tz: Tz) -> StatisticsReport {
    let summary = aggregate(orders);
    let (from, to) = window.labels(tz);
    let total_revenue = summary.total_revenue();

    StatisticsReport {
        filter: window.kind,
        from,
        to,
        food_sales: summary.food_sales,
        cash_revenue: summary.cash_revenue,
        bank_transfer_revenue: summary.bank_transfer_revenue,
        total_revenue,
        order_count: summary.order_count,
    }
}
