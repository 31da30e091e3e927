use chrono::NaiveDate;

use super::monthly::{current_month_stats, MonthStats};
use crate::model::{Customer, Status, Task, TaskType};
use crate::state::AppState;

/// How many recent customers and upcoming tasks the dashboard lists
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

#[derive(Debug)]
pub struct Dashboard<'a> {
    pub month: MonthStats,
    pub total_customers: usize,
    pub pending_installations: usize,
    pub low_stock: usize,
    pub alerts: Vec<Alert>,
    pub recent_customers: Vec<&'a Customer>,
    pub upcoming_tasks: Vec<&'a Task>,
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

pub fn summarize(state: &AppState, today: NaiveDate) -> Dashboard<'_> {
    let month = current_month_stats(&state.customers, &state.tasks, &state.invoices, today);

    let pending_installations = state
        .tasks
        .iter()
        .filter(|t| t.kind == TaskType::Installation && t.status != Status::Completed)
        .count();
    let low_stock = state.products.iter().filter(|p| p.is_low_stock()).count();

    let mut alerts = Vec::new();
    if low_stock > 0 {
        alerts.push(Alert {
            level: AlertLevel::Warning,
            message: format!(
                "{low_stock} product{} running low on stock",
                plural(low_stock)
            ),
        });
    }
    if pending_installations > 0 {
        alerts.push(Alert {
            level: AlertLevel::Info,
            message: format!(
                "{pending_installations} installation{} pending",
                plural(pending_installations)
            ),
        });
    }

    // Newest first; customers without a creation time sort last.
    let mut recent_customers: Vec<&Customer> = state.customers.iter().collect();
    recent_customers.sort_by(|a, b| b.created().cmp(&a.created()));
    recent_customers.truncate(RECENT_LIMIT);

    let mut upcoming_tasks: Vec<&Task> = state
        .tasks
        .iter()
        .filter(|t| t.status != Status::Completed)
        .collect();
    upcoming_tasks.sort_by_key(|t| {
        let at = t.scheduled_at();
        (at.is_none(), at)
    });
    upcoming_tasks.truncate(RECENT_LIMIT);

    Dashboard {
        month,
        total_customers: state.customers.len(),
        pending_installations,
        low_stock,
        alerts,
        recent_customers,
        upcoming_tasks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Product;

    fn customer(name: &str, created: Option<&str>) -> Customer {
        Customer {
            id: name.to_lowercase(),
            name: name.into(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            solar_capacity: 0.0,
            monthly_bill: 0.0,
            installation_date: None,
            status: Status::Pending,
            created_at: created.map(str::to_string),
        }
    }

    fn task(kind: TaskType, status: Status, scheduled: &str) -> Task {
        Task {
            id: scheduled.into(),
            customer_id: "c".into(),
            customer_name: "Asha".into(),
            kind,
            status,
            assigned_to: "Ravi".into(),
            scheduled_date: scheduled.into(),
            completed_date: None,
            notes: None,
            created_at: None,
        }
    }

    fn product(quantity: u32, min_threshold: u32) -> Product {
        Product {
            id: String::new(),
            name: "Panel".into(),
            category: "Panels".into(),
            quantity,
            vendor: String::new(),
            unit_cost: 1.0,
            min_threshold,
            created_at: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn empty_state_has_no_alerts() {
        let state = AppState::default();
        let dash = summarize(&state, today());
        assert_eq!(dash.total_customers, 0);
        assert!(dash.alerts.is_empty());
        assert!(dash.recent_customers.is_empty());
        assert!(dash.upcoming_tasks.is_empty());
    }

    #[test]
    fn alerts_are_pluralized() {
        let state = AppState {
            products: vec![product(1, 5), product(50, 5)],
            tasks: vec![
                task(TaskType::Installation, Status::Pending, "2026-10-20"),
                task(TaskType::Installation, Status::InProgress, "2026-10-18"),
                task(TaskType::Inspection, Status::Pending, "2026-10-19"),
            ],
            ..Default::default()
        };

        let dash = summarize(&state, today());
        assert_eq!(dash.low_stock, 1);
        assert_eq!(dash.pending_installations, 2);
        assert_eq!(
            dash.alerts,
            vec![
                Alert {
                    level: AlertLevel::Warning,
                    message: "1 product running low on stock".into()
                },
                Alert {
                    level: AlertLevel::Info,
                    message: "2 installations pending".into()
                },
            ]
        );
    }

    #[test]
    fn recent_customers_newest_first_limited() {
        let mut customers: Vec<Customer> = (1..=6)
            .map(|d| customer(&format!("C{d}"), Some(format!("2026-10-0{d}").as_str())))
            .collect();
        customers.push(customer("Undated", None));
        let state = AppState {
            customers,
            ..Default::default()
        };

        let dash = summarize(&state, today());
        let names: Vec<&str> = dash.recent_customers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["C6", "C5", "C4", "C3", "C2"]);
    }

    #[test]
    fn upcoming_tasks_skip_completed_and_sort_by_schedule() {
        let state = AppState {
            tasks: vec![
                task(TaskType::Maintenance, Status::Pending, "2026-11-02"),
                task(TaskType::Installation, Status::Completed, "2026-10-01"),
                task(TaskType::Inspection, Status::Pending, ""),
                task(TaskType::Installation, Status::InProgress, "2026-10-20"),
            ],
            ..Default::default()
        };

        let dash = summarize(&state, today());
        let ids: Vec<&str> = dash.upcoming_tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["2026-10-20", "2026-11-02", ""]);
    }
}
