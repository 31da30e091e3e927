use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::model::{Customer, Invoice, Product, Task};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Backup<'a> {
    customers: &'a [Customer],
    products: &'a [Product],
    tasks: &'a [Task],
    invoices: &'a [Invoice],
    export_date: String,
}

/// Every collection in one pretty-printed JSON document
pub fn backup_json(state: &AppState, now: DateTime<Utc>) -> Result<String> {
    let backup = Backup {
        customers: &state.customers,
        products: &state.products,
        tasks: &state.tasks,
        invoices: &state.invoices,
        export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    Ok(serde_json::to_string_pretty(&backup)?)
}

pub fn backup_file_name(date: NaiveDate) -> String {
    format!("solar-crm-backup-{}.json", date.format("%Y-%m-%d"))
}
