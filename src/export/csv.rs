use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::Result;
use crate::state::AppState;
use crate::store::Collection;

/// Whole floats print without a fractional part (`5`, not `5.0`)
fn number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

fn cell(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => number(n),
        Some(Value::Bool(b)) => b.to_string(),
        Some(nested) => nested.to_string(),
    };

    if text.contains(',') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}

/// Flatten records into CSV: a header row taken from the first record's
/// fields, then one row per record. Returns `None` for an empty slice.
pub fn to_csv<T: Serialize>(records: &[T]) -> Result<Option<String>> {
    let rows = records
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<Value>, _>>()?;

    let Some(Value::Object(first)) = rows.first() else {
        return Ok(None);
    };
    let headers: Vec<&String> = first.keys().collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        headers
            .iter()
            .map(|h| h.as_str())
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in &rows {
        let line = headers
            .iter()
            .map(|h| cell(row.get(h.as_str())))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    Ok(Some(lines.join("\n")))
}

pub fn export_collection(state: &AppState, collection: Collection) -> Result<Option<String>> {
    match collection {
        Collection::Customers => to_csv(&state.customers),
        Collection::Products => to_csv(&state.products),
        Collection::Tasks => to_csv(&state.tasks),
        Collection::Invoices => to_csv(&state.invoices),
    }
}

pub fn csv_file_name(collection: Collection) -> String {
    format!("{}.csv", collection.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Customer, Status};

    fn customer(name: &str, address: &str) -> Customer {
        Customer {
            id: name.to_lowercase(),
            name: name.into(),
            phone: "555".into(),
            email: "x@y.z".into(),
            address: address.into(),
            solar_capacity: 5.0,
            monthly_bill: 1200.0,
            installation_date: None,
            status: Status::InProgress,
            created_at: None,
        }
    }

    #[test]
    fn two_customers_make_three_lines() {
        let customers = vec![
            customer("Asha", "12 Sun Road, Pune"),
            customer("Bala", "Plot 7"),
        ];
        let csv = to_csv(&customers).unwrap().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "id,name,phone,email,address,solarCapacity,monthlyBill,installationDate,status,createdAt"
        );
        assert_eq!(
            lines[1],
            "asha,Asha,555,x@y.z,\"12 Sun Road, Pune\",5,1200,,in-progress,"
        );
        assert!(lines[2].contains(",Plot 7,"));
    }

    #[test]
    fn empty_collection_exports_nothing() {
        let none: Vec<Customer> = Vec::new();
        assert_eq!(to_csv(&none).unwrap(), None);
        assert_eq!(
            export_collection(&AppState::default(), Collection::Tasks).unwrap(),
            None
        );
    }

    #[test]
    fn quotes_inside_quoted_cells_are_doubled() {
        assert_eq!(
            cell(Some(&Value::String("5\" rail, black".into()))),
            "\"5\"\" rail, black\""
        );
        assert_eq!(cell(Some(&Value::String("plain".into()))), "plain");
    }

    #[test]
    fn nested_values_become_quoted_json() {
        let nested = serde_json::json!([{ "name": "Panel", "quantity": 2 }]);
        assert_eq!(
            cell(Some(&nested)),
            "\"[{\"\"name\"\":\"\"Panel\"\",\"\"quantity\"\":2}]\""
        );
    }

    #[test]
    fn whole_numbers_drop_the_fraction() {
        assert_eq!(cell(Some(&serde_json::json!(5.0))), "5");
        assert_eq!(cell(Some(&serde_json::json!(1200.0))), "1200");
        assert_eq!(cell(Some(&serde_json::json!(2.5))), "2.5");
        assert_eq!(cell(Some(&serde_json::json!(-3.0))), "-3");
        assert_eq!(cell(Some(&serde_json::json!(42))), "42");
    }
}
