use chrono::NaiveDate;
use serde::Serialize;

use super::buckets::{trailing_months, MonthBucket, TRAILING_MONTHS};
use crate::model::{Customer, Invoice, Status, Task};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyMetrics {
    pub month: String,
    pub installations: usize,
    pub total_kw: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthStats {
    pub installations: usize,
    pub total_kw: f64,
    pub revenue: f64,
    pub new_customers: usize,
}

/// Figures over every record, ignoring dates
#[derive(Debug, Clone, PartialEq)]
pub struct AllTimeTotals {
    pub completed_tasks: usize,
    pub total_kw: f64,
    pub revenue: f64,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Completed installation tasks finished inside the bucket
pub fn installations_in(tasks: &[Task], bucket: &MonthBucket) -> usize {
    tasks
        .iter()
        .filter(|t| t.is_completed_installation())
        .filter(|t| t.completed_at().is_some_and(|at| bucket.contains(at)))
        .count()
}

/// kW installed for customers whose installation date falls inside the bucket
pub fn capacity_in(customers: &[Customer], bucket: &MonthBucket) -> f64 {
    customers
        .iter()
        .filter(|c| c.installed_at().is_some_and(|at| bucket.contains(at)))
        .map(|c| c.solar_capacity)
        .sum()
}

/// Invoiced amount for invoices created inside the bucket
pub fn revenue_in(invoices: &[Invoice], bucket: &MonthBucket) -> f64 {
    invoices
        .iter()
        .filter(|i| i.created().is_some_and(|at| bucket.contains(at)))
        .map(|i| i.final_amount)
        .sum()
}

pub fn monthly_metrics(
    customers: &[Customer],
    tasks: &[Task],
    invoices: &[Invoice],
    today: NaiveDate,
) -> Vec<MonthlyMetrics> {
    trailing_months(today, TRAILING_MONTHS)
        .iter()
        .map(|bucket| MonthlyMetrics {
            month: bucket.label(),
            installations: installations_in(tasks, bucket),
            total_kw: round1(capacity_in(customers, bucket)),
            revenue: revenue_in(invoices, bucket),
        })
        .collect()
}

pub fn current_month_stats(
    customers: &[Customer],
    tasks: &[Task],
    invoices: &[Invoice],
    today: NaiveDate,
) -> MonthStats {
    let bucket = MonthBucket::containing(today);
    MonthStats {
        installations: installations_in(tasks, &bucket),
        total_kw: capacity_in(customers, &bucket),
        revenue: revenue_in(invoices, &bucket),
        new_customers: customers
            .iter()
            .filter(|c| c.created().is_some_and(|at| bucket.contains(at)))
            .count(),
    }
}

pub fn all_time_totals(
    customers: &[Customer],
    tasks: &[Task],
    invoices: &[Invoice],
) -> AllTimeTotals {
    AllTimeTotals {
        completed_tasks: tasks.iter().filter(|t| t.status == Status::Completed).count(),
        total_kw: round1(customers.iter().map(|c| c.solar_capacity).sum()),
        revenue: invoices.iter().map(|i| i.final_amount).sum(),
    }
}
