use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{parse_instant, Record};
use crate::store::Collection;

/// One invoice entry. `product_id` is absent for custom lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    #[serde(default)]
    pub product_id: Option<String>,
    pub name: String,
    pub quantity: f64,
    pub unit_cost: f64,
}

impl InvoiceLine {
    pub fn amount(&self) -> f64 {
        self.quantity * self.unit_cost
    }

    pub fn is_custom(&self) -> bool {
        self.product_id.as_deref().map_or(true, str::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(default)]
    pub id: String,
    pub customer_id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub products: Vec<InvoiceLine>,
    #[serde(default)]
    pub installation_date: String,
    /// Subtotal of all lines before tax
    pub total_cost: f64,
    #[serde(default)]
    pub taxes: f64,
    pub final_amount: f64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub company_address: Option<String>,
    #[serde(default)]
    pub gst_number: Option<String>,
    #[serde(default)]
    pub signatory: Option<String>,
}

impl Invoice {
    pub fn created(&self) -> Option<NaiveDateTime> {
        self.created_at.as_deref().and_then(parse_instant)
    }
}

impl Record for Invoice {
    const COLLECTION: Collection = Collection::Invoices;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_product_id_marks_custom_line() {
        let line: InvoiceLine = serde_json::from_str(
            r#"{"productId":"","name":"Site survey","quantity":1,"unitCost":1500}"#,
        )
        .unwrap();
        assert!(line.is_custom());
        assert_eq!(line.amount(), 1500.0);

        let catalog = InvoiceLine {
            product_id: Some("p1".into()),
            ..line
        };
        assert!(!catalog.is_custom());
    }
}
