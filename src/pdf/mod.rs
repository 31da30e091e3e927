mod document;
mod typst;

pub use document::{InvoiceDocument, pdf_file_name};
pub use typst::{render_invoice_pdf, write_invoice_pdf};
