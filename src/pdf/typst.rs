use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use super::document::InvoiceDocument;
use crate::error::{CrmError, Result};

/// Embedded Typst template for invoice generation
/// Uses a placeholder that gets replaced with the actual JSON file path
const INVOICE_TEMPLATE: &str = r##"// Invoice Template
// Data is loaded from JSON file

#let data = json("DATA_JSON_PATH")

#set page(
  paper: "a4",
  margin: (top: 0.8in, bottom: 1.2in, left: 0.8in, right: 0.8in),
  footer: [
    #set text(size: 9pt, fill: gray)
    #for line in data.footer [
      #line \
    ]
  ],
)

#set text(font: "Helvetica", size: 10pt)

#let fmt-int(digits) = {
  let len = digits.len()
  let out = ""
  for (i, digit) in digits.clusters().enumerate() {
    if i > 0 and calc.rem(len - i, 3) == 0 {
      out += ","
    }
    out += digit
  }
  out
}

#let fmt-currency(amount) = {
  let parts = str(calc.round(amount, digits: 2)).split(".")
  let whole = fmt-int(parts.at(0))
  let frac = if parts.len() > 1 { parts.at(1) } else { "00" }
  let frac2 = if frac.len() == 1 { frac + "0" } else { frac }
  data.currency_symbol + whole + "." + frac2
}

// Branding block
#text(size: 16pt, weight: "bold")[#upper(data.company.name)]
#if data.company.tagline != none [
  \ #text(size: 11pt)[#data.company.tagline]
]

#v(0.8em)
#text(size: 20pt, weight: "bold")[INVOICE]
#v(0.8em)

// Company details and invoice metadata
#grid(
  columns: (1fr, 1fr),
  align: (left, right),
  [
    #text(weight: "bold")[#data.company.name] \
    #data.company.address \
    #if data.company.tax_id != none [
      GST: #data.company.tax_id \
    ]
    Phone: #data.company.phone | Email: #data.company.email
  ],
  [
    #table(
      columns: (auto, auto),
      stroke: none,
      align: (right, left),
      inset: 2pt,
      [*Invoice \#:*], [#data.number],
      [*Date:*], [#data.date],
      [*Installation Date:*], [#data.installation_date],
    )
  ]
)

#v(1em)
#line(length: 100%, stroke: 0.5pt + gray)
#v(1em)

// Bill To section
#text(weight: "bold", size: 11pt)[Bill To:]
#v(0.3em)
#if data.bill_to != none [
  #text(weight: "bold")[#data.bill_to.name] \
  #data.bill_to.address \
  Phone: #data.bill_to.phone \
  Email: #data.bill_to.email
]

#v(1.5em)

// Line items table
#table(
  columns: (1fr, auto, auto, auto),
  align: (left, right, right, right),
  stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else if y > 0 { (bottom: 0.5pt + gray) },
  inset: 8pt,
  fill: (x, y) => if y == 0 { luma(240) } else { none },

  [*Description*], [*Qty*], [*Unit Cost*], [*Total*],

  ..data.items.map(item => (
    item.name,
    str(item.quantity),
    [#fmt-currency(item.unit_cost)],
    [#fmt-currency(item.amount)],
  )).flatten()
)

#v(1em)

// Totals
#align(right)[
  #table(
    columns: (auto, auto),
    stroke: none,
    align: (right, right),
    inset: 6pt,

    [Subtotal:], [#fmt-currency(data.subtotal)],
    [Tax:], [#fmt-currency(data.taxes)],

    table.hline(stroke: 1pt),
    [*Total:*], [*#text(size: 12pt)[#fmt-currency(data.total)]*],
  )
]

#if data.signatory != none [
  #v(2em)
  Authorized Signatory: #data.signatory
]
"##;

/// Compile an invoice document to PDF bytes with the Typst CLI
pub fn render_invoice_pdf(document: &InvoiceDocument) -> Result<Vec<u8>> {
    let typst_check = Command::new("typst").arg("--version").output();
    if typst_check.is_err() {
        return Err(CrmError::TypstNotFound);
    }

    // Private scratch dir, removed when `work` drops
    let work = tempfile::Builder::new().prefix("solarcrm-").tempdir()?;

    let json_path = work.path().join("data.json");
    fs::write(&json_path, serde_json::to_string(document)?)?;

    let template_path = work.path().join("invoice.typ");
    fs::write(
        &template_path,
        INVOICE_TEMPLATE.replace("DATA_JSON_PATH", "data.json"),
    )?;

    let pdf_path = work.path().join("invoice.pdf");
    debug!(invoice = %document.number, dir = %work.path().display(), "running typst");

    let output = Command::new("typst")
        .arg("compile")
        .arg("--root")
        .arg(work.path())
        .arg(&template_path)
        .arg(&pdf_path)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CrmError::PdfGeneration(stderr.to_string()));
    }

    Ok(fs::read(&pdf_path)?)
}

/// Render and save an invoice PDF at `path`
pub fn write_invoice_pdf(document: &InvoiceDocument, path: &Path) -> Result<()> {
    let bytes = render_invoice_pdf(document)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &bytes)?;
    info!(invoice = %document.number, path = %path.display(), bytes = bytes.len(), "wrote invoice pdf");
    Ok(())
}
