//! Order Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an order was paid.
///
/// Only `cash` and `bank` are accepted for new orders. Anything else found in
/// stored data is kept verbatim as [`PaymentMethod::Other`] so old records
/// still load; such orders are left out of the cash/bank revenue totals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    Cash,
    Bank,
    Other(String),
}

impl PaymentMethod {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::Other(s) => s,
        }
    }

    /// Whether new orders may use this method
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        match value.as_str() {
            "cash" => Self::Cash,
            "bank" => Self::Bank,
            _ => Self::Other(value),
        }
    }
}

impl From<PaymentMethod> for String {
    fn from(value: PaymentMethod) -> Self {
        match value {
            PaymentMethod::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_quantity() -> i32 {
    1
}

/// One food entry within an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Older clients sent one entry per portion without a quantity
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    /// Menu category, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A checkout transaction. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Snowflake id; 0 only for legacy records that have not been assigned one yet
    #[serde(default, alias = "_id")]
    pub id: i64,
    pub items: Vec<LineItem>,
    pub total: f64,
    pub payment_method: PaymentMethod,
    pub date: DateTime<Utc>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub items: Vec<LineItem>,
    pub total: f64,
    pub payment_method: PaymentMethod,
    /// Checkout time; defaults to the time the server receives the order
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_strings() {
        let m: PaymentMethod = serde_json::from_str("\"cash\"").unwrap();
        assert_eq!(m, PaymentMethod::Cash);
        let m: PaymentMethod = serde_json::from_str("\"bank\"").unwrap();
        assert_eq!(m, PaymentMethod::Bank);

        let m: PaymentMethod = serde_json::from_str("\"card\"").unwrap();
        assert_eq!(m, PaymentMethod::Other("card".to_string()));
        assert!(!m.is_accepted());
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"card\"");
    }

    #[test]
    fn test_order_create_from_client_payload() {
        let json = r#"{
            "items": [
                {"id": 3, "name": "Pho", "price": 50000, "quantity": 2, "category": "noodles"}
            ],
            "total": 100000,
            "paymentMethod": "cash",
            "date": "2024-03-15T05:30:00.000Z"
        }"#;
        let create: OrderCreate = serde_json::from_str(json).unwrap();

        assert_eq!(create.items.len(), 1);
        assert_eq!(create.items[0].name, "Pho");
        assert_eq!(create.items[0].quantity, 2);
        assert_eq!(create.items[0].category.as_deref(), Some("noodles"));
        assert_eq!(create.payment_method, PaymentMethod::Cash);
        assert_eq!(
            create.date.unwrap().to_rfc3339(),
            "2024-03-15T05:30:00+00:00"
        );
    }

    #[test]
    fn test_legacy_order_without_id_or_quantity() {
        let json = r#"{
            "items": [{"name": "Banh mi", "price": 20000}],
            "total": 20000,
            "paymentMethod": "bank",
            "date": "2023-12-01T10:00:00Z"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();

        assert_eq!(order.id, 0);
        assert_eq!(order.items[0].quantity, 1);
        assert_eq!(order.payment_method, PaymentMethod::Bank);
    }

    #[test]
    fn test_order_serializes_camel_case() {
        let order = Order {
            id: 12,
            items: vec![],
            total: 0.0,
            payment_method: PaymentMethod::Cash,
            date: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["paymentMethod"], "cash");
        assert_eq!(value["id"], 12);
    }
}
