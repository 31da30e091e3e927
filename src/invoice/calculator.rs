use crate::model::{Customer, Invoice, InvoiceLine, Product};

/// Everything needed to issue an invoice, before totals are computed.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub customer_id: String,
    pub items: Vec<InvoiceLine>,
    pub installation_date: String,
    /// Flat tax amount, not a rate
    pub taxes: f64,
    pub company_address: Option<String>,
    pub gst_number: Option<String>,
    pub signatory: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub taxes: f64,
    pub final_amount: f64,
}

pub fn compute_totals(items: &[InvoiceLine], taxes: f64) -> Totals {
    let subtotal: f64 = items.iter().map(InvoiceLine::amount).sum();
    Totals {
        subtotal,
        taxes,
        final_amount: subtotal + taxes,
    }
}

/// A line priced from the product catalog
pub fn catalog_line(product: &Product, quantity: f64) -> InvoiceLine {
    InvoiceLine {
        product_id: Some(product.id.clone()),
        name: product.name.clone(),
        quantity,
        unit_cost: product.unit_cost,
    }
}

/// A free-text line with its own price
pub fn custom_line(name: &str, quantity: f64, unit_cost: f64) -> InvoiceLine {
    InvoiceLine {
        product_id: None,
        name: name.to_string(),
        quantity,
        unit_cost,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolve the customer and compute totals.
///
/// Returns `None` when the customer reference does not resolve. The result has
/// no id or creation time yet; the store assigns both.
pub fn build_invoice(draft: InvoiceDraft, customers: &[Customer]) -> Option<Invoice> {
    let customer = customers.iter().find(|c| c.id == draft.customer_id)?;
    let totals = compute_totals(&draft.items, draft.taxes);

    Some(Invoice {
        id: String::new(),
        customer_id: draft.customer_id,
        customer_name: customer.name.clone(),
        products: draft.items,
        installation_date: draft.installation_date,
        total_cost: totals.subtotal,
        taxes: totals.taxes,
        final_amount: totals.final_amount,
        created_at: None,
        company_address: non_blank(draft.company_address),
        gst_number: non_blank(draft.gst_number),
        signatory: non_blank(draft.signatory),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;

    fn customer(id: &str) -> Customer {
        Customer {
            id: id.into(),
            name: "Kiran Rao".into(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            solar_capacity: 3.0,
            monthly_bill: 0.0,
            installation_date: None,
            status: Status::Pending,
            created_at: None,
        }
    }

    fn draft(customer_id: &str, items: Vec<InvoiceLine>, taxes: f64) -> InvoiceDraft {
        InvoiceDraft {
            customer_id: customer_id.into(),
            items,
            installation_date: "2026-09-12".into(),
            taxes,
            company_address: Some("  ".into()),
            gst_number: Some("GST-77".into()),
            signatory: None,
        }
    }

    #[test]
    fn final_amount_is_subtotal_plus_flat_tax() {
        let items = vec![
            custom_line("Panel 450W", 12.0, 13_499.99),
            custom_line("Mounting kit", 3.0, 2_100.5),
            custom_line("Labour", 1.5, 800.0),
        ];
        let expected_subtotal = 12.0 * 13_499.99 + 3.0 * 2_100.5 + 1.5 * 800.0;

        let totals = compute_totals(&items, 1_234.56);
        assert!((totals.subtotal - expected_subtotal).abs() < 1e-2);
        assert!((totals.final_amount - (expected_subtotal + 1_234.56)).abs() < 1e-2);
    }

    #[test]
    fn empty_items_total_only_tax() {
        let totals = compute_totals(&[], 50.0);
        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.final_amount, 50.0);
    }

    #[test]
    fn unknown_customer_builds_nothing() {
        let customers = vec![customer("c1")];
        let result = build_invoice(draft("c2", vec![custom_line("x", 1.0, 1.0)], 0.0), &customers);
        assert_eq!(result, None);
    }

    #[test]
    fn invoice_copies_customer_name_and_drops_blank_metadata() {
        let customers = vec![customer("c1")];
        let invoice = build_invoice(
            draft("c1", vec![custom_line("Survey", 1.0, 1500.0)], 270.0),
            &customers,
        )
        .unwrap();

        assert_eq!(invoice.customer_name, "Kiran Rao");
        assert_eq!(invoice.total_cost, 1500.0);
        assert_eq!(invoice.final_amount, 1770.0);
        assert_eq!(invoice.company_address, None);
        assert_eq!(invoice.gst_number.as_deref(), Some("GST-77"));
        assert!(invoice.id.is_empty());
    }

    #[test]
    fn catalog_line_copies_name_and_cost() {
        let product = Product {
            id: "p9".into(),
            name: "Inverter 5kW".into(),
            category: "Inverters".into(),
            quantity: 4,
            vendor: "Volta".into(),
            unit_cost: 42_000.0,
            min_threshold: 1,
            created_at: None,
        };
        let line = catalog_line(&product, 2.0);
        assert_eq!(line.product_id.as_deref(), Some("p9"));
        assert_eq!(line.name, "Inverter 5kW");
        assert_eq!(line.amount(), 84_000.0);
    }
}
