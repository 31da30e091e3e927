use crate::error::{CrmError, Result};
use crate::model::{InvoiceLine, Product};

use super::calculator::{catalog_line, custom_line};

fn parse_quantity(item: &str, qty_str: &str) -> Result<f64> {
    let quantity: f64 = qty_str.parse().map_err(|_| CrmError::InvalidQuantity {
        item: item.to_string(),
        qty: qty_str.to_string(),
        reason: "must be a number".to_string(),
    })?;

    if quantity <= 0.0 {
        return Err(CrmError::InvalidQuantity {
            item: item.to_string(),
            qty: qty_str.to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }

    Ok(quantity)
}

/// Parse catalog input like "panel-id:8" into (product_id, quantity)
pub fn parse_item_input(input: &str) -> Result<(&str, f64)> {
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() != 2 || parts[0].is_empty() {
        return Err(CrmError::InvalidItemFormat(input.to_string()));
    }

    let quantity = parse_quantity(parts[0], parts[1])?;
    Ok((parts[0], quantity))
}

/// Parse custom input like "Site survey:1:1500" into (name, quantity, unit_cost).
/// The name may itself contain colons; the last two fields are numeric.
pub fn parse_custom_input(input: &str) -> Result<(&str, f64, f64)> {
    let mut parts = input.rsplitn(3, ':');
    let (Some(cost_str), Some(qty_str), Some(name)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(CrmError::InvalidCustomItem(input.to_string()));
    };
    if name.trim().is_empty() {
        return Err(CrmError::InvalidCustomItem(input.to_string()));
    }

    let quantity = parse_quantity(name, qty_str)?;
    let unit_cost: f64 = cost_str
        .parse()
        .ok()
        .filter(|c: &f64| *c >= 0.0)
        .ok_or_else(|| CrmError::InvalidCustomItem(input.to_string()))?;

    Ok((name.trim(), quantity, unit_cost))
}

/// Turn CLI item arguments into invoice lines, catalog items first
pub fn resolve_line_items(
    catalog_inputs: &[String],
    custom_inputs: &[String],
    products: &[Product],
) -> Result<Vec<InvoiceLine>> {
    if catalog_inputs.is_empty() && custom_inputs.is_empty() {
        return Err(CrmError::NoItems);
    }

    let mut lines = Vec::with_capacity(catalog_inputs.len() + custom_inputs.len());

    for input in catalog_inputs {
        let (product_id, quantity) = parse_item_input(input)?;
        let product = products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| CrmError::ProductNotFound(product_id.to_string()))?;
        lines.push(catalog_line(product, quantity));
    }

    for input in custom_inputs {
        let (name, quantity, unit_cost) = parse_custom_input(input)?;
        lines.push(custom_line(name, quantity, unit_cost));
    }

    Ok(lines)
}
