//! Aggregation engine
//!
//! Folds orders into per-food totals and per-payment-method revenue.
//! Sums run in `Decimal` and are converted to `f64` once at the end, so the
//! result does not depend on input order.

use std::collections::HashMap;

use rust_decimal::prelude::*;
use shared::models::{FoodSales, FoodSalesTable, Order, PaymentMethod};

/// Rounding for monetary output (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

#[inline]
fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Aggregated totals, before the date window is attached
#[derive(Debug, Clone, PartialEq)]
pub struct SalesSummary {
    pub food_sales: FoodSalesTable,
    pub cash_revenue: f64,
    pub bank_transfer_revenue: f64,
    pub order_count: usize,
}

impl SalesSummary {
    pub fn total_revenue(&self) -> f64 {
        to_f64(to_decimal(self.cash_revenue) + to_decimal(self.bank_transfer_revenue))
    }
}

/// Quantity-weighted: `sold += quantity`, `revenue += price × quantity`.
///
/// The order total goes to the cash or bank bucket by payment method. Orders
/// with any other method still count toward food sales.
pub fn aggregate<'a, I>(orders: I) -> SalesSummary
where
    I: IntoIterator<Item = &'a Order>,
{
    // (name, sold, revenue) in first-appearance order, indexed by name
    let mut foods: Vec<(&str, i64, Decimal)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut cash = Decimal::ZERO;
    let mut bank = Decimal::ZERO;
    let mut order_count = 0;

    for order in orders {
        order_count += 1;

        for item in &order.items {
            let quantity = i64::from(item.quantity);
            let revenue = to_decimal(item.price) * Decimal::from(quantity);
            let slot = *slots.entry(item.name.as_str()).or_insert_with(|| {
                foods.push((item.name.as_str(), 0, Decimal::ZERO));
                foods.len() - 1
            });
            let entry = &mut foods[slot];
            entry.1 += quantity;
            entry.2 += revenue;
        }

        match order.payment_method {
            PaymentMethod::Cash => cash += to_decimal(order.total),
            PaymentMethod::Bank => bank += to_decimal(order.total),
            PaymentMethod::Other(ref method) => {
                tracing::debug!(order_id = order.id, method = %method, "Order excluded from payment totals");
            }
        }
    }

    let food_sales: FoodSalesTable = foods
        .into_iter()
        .map(|(name, sold, revenue)| {
            (
                name.to_string(),
                FoodSales {
                    sold,
                    revenue: to_f64(revenue),
                },
            )
        })
        .collect();

    SalesSummary {
        food_sales,
        cash_revenue: to_f64(cash),
        bank_transfer_revenue: to_f64(bank),
        order_count,
    }
}
