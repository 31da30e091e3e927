use serde::Serialize;

use crate::config::{Company, InvoiceSettings};
use crate::model::{parse_instant, Customer, Invoice};

#[derive(Debug, Serialize)]
pub struct Branding {
    pub name: String,
    pub tagline: Option<String>,
    pub address: String,
    pub tax_id: Option<String>,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct BillTo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentLine {
    pub name: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub amount: f64,
}

/// Fully resolved data handed to the invoice template
#[derive(Debug, Serialize)]
pub struct InvoiceDocument {
    pub number: String,
    pub date: String,
    pub installation_date: String,
    pub company: Branding,
    pub bill_to: Option<BillTo>,
    pub items: Vec<DocumentLine>,
    pub subtotal: f64,
    pub taxes: f64,
    pub total: f64,
    pub currency_symbol: String,
    pub signatory: Option<String>,
    pub footer: Vec<String>,
}

fn display_date(raw: Option<&str>) -> String {
    raw.and_then(parse_instant)
        .map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_default()
}

impl InvoiceDocument {
    pub fn new(
        invoice: &Invoice,
        customer: Option<&Customer>,
        company: &Company,
        settings: &InvoiceSettings,
    ) -> Self {
        Self {
            number: invoice.id.clone(),
            date: display_date(invoice.created_at.as_deref()),
            installation_date: display_date(Some(&invoice.installation_date)),
            company: Branding {
                name: company.name.clone(),
                tagline: company.tagline.clone(),
                address: invoice
                    .company_address
                    .clone()
                    .unwrap_or_else(|| company.address.clone()),
                tax_id: invoice.gst_number.clone().or_else(|| company.tax_id.clone()),
                phone: company.phone.clone(),
                email: company.email.clone(),
            },
            bill_to: customer.map(|c| BillTo {
                name: c.name.clone(),
                address: c.address.clone(),
                phone: c.phone.clone(),
                email: c.email.clone(),
            }),
            items: invoice
                .products
                .iter()
                .map(|line| DocumentLine {
                    name: line.name.clone(),
                    quantity: line.quantity,
                    unit_cost: line.unit_cost,
                    amount: line.amount(),
                })
                .collect(),
            subtotal: invoice.total_cost,
            taxes: invoice.taxes,
            total: invoice.final_amount,
            currency_symbol: settings.currency_symbol.clone(),
            signatory: invoice.signatory.clone(),
            footer: vec![
                settings.footer.clone(),
                format!("For support, contact us at {}", company.support_email),
            ],
        }
    }
}

pub fn pdf_file_name(invoice_id: &str) -> String {
    format!("invoice-{invoice_id}.pdf")
}
