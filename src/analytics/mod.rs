//! Reporting over loaded snapshots. Everything here is pure: no I/O, and
//! "today" is always passed in.

mod buckets;
mod category;
mod dashboard;
mod filters;
mod monthly;

pub use buckets::{trailing_months, MonthBucket, TRAILING_MONTHS};
pub use category::{category_rollup, CategoryValue, UNCATEGORIZED};
pub use dashboard::{summarize, Alert, AlertLevel, Dashboard, RECENT_LIMIT};
pub use filters::{
    assignees, categories, low_stock, search_customers, search_invoices, task_status_counts,
    ProductFilter, StatusCounts, TaskFilter,
};
pub use monthly::{
    all_time_totals, capacity_in, current_month_stats, installations_in, monthly_metrics,
    revenue_in, AllTimeTotals, MonthStats, MonthlyMetrics,
};
