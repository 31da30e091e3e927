mod calculator;
mod items;

pub use calculator::{build_invoice, catalog_line, compute_totals, custom_line, InvoiceDraft, Totals};
pub use items::{parse_custom_input, parse_item_input, resolve_line_items};
