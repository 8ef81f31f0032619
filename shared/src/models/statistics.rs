//! Statistics Report Model

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Granularity of a date filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Day,
    Week,
    Month,
    /// No filter given, every order counts
    All,
}

impl FilterKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::All => "all",
        }
    }
}

/// Per-food totals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FoodSales {
    /// Portions sold
    pub sold: i64,
    pub revenue: f64,
}

/// Food name → totals, kept in order of first appearance.
///
/// Serialized as a JSON object so clients can index it by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FoodSalesTable(Vec<(String, FoodSales)>);

impl FoodSalesTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FoodSales> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FoodSales)> {
        self.0.iter().map(|(n, s)| (n.as_str(), s))
    }
}

/// Entries keep the order they are yielded in
impl FromIterator<(String, FoodSales)> for FoodSalesTable {
    fn from_iter<I: IntoIterator<Item = (String, FoodSales)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for FoodSalesTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, sales) in &self.0 {
            map.serialize_entry(name, sales)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FoodSalesTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = FoodSalesTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of food name to sales")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, sales)) = access.next_entry::<String, FoodSales>()? {
                    entries.push((name, sales));
                }
                Ok(FoodSalesTable(entries))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Aggregated sales over a date window. Derived on every request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    pub filter: FilterKind,
    /// Window start, RFC 3339 in the business time zone; `None` when unbounded
    pub from: Option<String>,
    /// Window end (inclusive); `None` when unbounded
    pub to: Option<String>,
    pub food_sales: FoodSalesTable,
    pub cash_revenue: f64,
    pub bank_transfer_revenue: f64,
    /// cash + bank
    pub total_revenue: f64,
    pub order_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_keeps_first_appearance_order() {
        let table: FoodSalesTable = [
            ("Pho".to_string(), FoodSales { sold: 4, revenue: 200000.0 }),
            ("Banh mi".to_string(), FoodSales { sold: 2, revenue: 40000.0 }),
        ]
        .into_iter()
        .collect();

        let names: Vec<&str> = table.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Pho", "Banh mi"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("Pho").unwrap().sold, 4);
        assert!(table.get("Com tam").is_none());
    }

    #[test]
    fn test_table_serializes_as_object() {
        let table: FoodSalesTable = std::iter::once((
            "Pho".to_string(),
            FoodSales {
                sold: 2,
                revenue: 100000.0,
            },
        ))
        .collect();

        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"Pho":{"sold":2,"revenue":100000.0}}"#);

        let back: FoodSalesTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_report_field_names() {
        let report = StatisticsReport {
            filter: FilterKind::All,
            from: None,
            to: None,
            food_sales: FoodSalesTable::new(),
            cash_revenue: 0.0,
            bank_transfer_revenue: 0.0,
            total_revenue: 0.0,
            order_count: 0,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["filter"], "all");
        assert!(value["from"].is_null());
        assert!(value["foodSales"].is_object());
        assert_eq!(value["bankTransferRevenue"], 0.0);
        assert_eq!(value["orderCount"], 0);
    }
}
