use serde::{Deserialize, Serialize};
use std::fmt;

use super::Record;
use crate::store::Collection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub quantity: u32,
    #[serde(default)]
    pub vendor: String,
    pub unit_cost: f64,
    #[serde(default)]
    pub min_threshold: u32,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    OutOfStock,
    Low,
    InStock,
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StockLevel::OutOfStock => "out-of-stock",
            StockLevel::Low => "low-stock",
            StockLevel::InStock => "in-stock",
        };
        f.write_str(label)
    }
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_threshold
    }

    pub fn stock_level(&self) -> StockLevel {
        if self.quantity == 0 {
            StockLevel::OutOfStock
        } else if self.is_low_stock() {
            StockLevel::Low
        } else {
            StockLevel::InStock
        }
    }

    /// Value of the units on hand at unit cost
    pub fn stock_value(&self) -> f64 {
        f64::from(self.quantity) * self.unit_cost
    }
}

impl Record for Product {
    const COLLECTION: Collection = Collection::Products;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_threshold: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(quantity: u32, min_threshold: u32) -> Product {
        Product {
            id: "p1".into(),
            name: "Panel 450W".into(),
            category: "Panels".into(),
            quantity,
            vendor: "SunVolt".into(),
            unit_cost: 120.0,
            min_threshold,
            created_at: None,
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(product(5, 5).is_low_stock());
        assert!(!product(6, 5).is_low_stock());
    }

    #[test]
    fn stock_levels() {
        assert_eq!(product(0, 5).stock_level(), StockLevel::OutOfStock);
        assert_eq!(product(3, 5).stock_level(), StockLevel::Low);
        assert_eq!(product(30, 5).stock_level(), StockLevel::InStock);
    }

    #[test]
    fn decodes_store_document() {
        let json = r#"{"id":"abc","name":"Inverter 5kW","category":"Inverters",
            "quantity":4,"vendor":"Volta","unitCost":850.5,"minThreshold":2}"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.unit_cost, 850.5);
        assert_eq!(p.min_threshold, 2);
        assert_eq!(p.stock_value(), 3402.0);
    }
}
