use serde::Serialize;
use std::collections::HashMap;

use crate::model::Product;

/// Bucket for products with no category
pub const UNCATEGORIZED: &str = "Other";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryValue {
    pub name: String,
    pub value: f64,
}

/// Stock value (quantity × unit cost) per category, in first-seen order.
pub fn category_rollup(products: &[Product]) -> Vec<CategoryValue> {
    let mut rollup: Vec<CategoryValue> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for product in products {
        let name = match product.category.as_str() {
            "" => UNCATEGORIZED,
            category => category,
        };

        match index.get(name) {
            Some(&i) => rollup[i].value += product.stock_value(),
            None => {
                index.insert(name, rollup.len());
                rollup.push(CategoryValue {
                    name: name.to_string(),
                    value: product.stock_value(),
                });
            }
        }
    }

    rollup
}
