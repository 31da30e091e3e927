use crate::model::{Customer, Invoice, Product, Status, Task};

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Name or email (case-insensitive), or phone substring
pub fn search_customers<'a>(customers: &'a [Customer], term: &str) -> Vec<&'a Customer> {
    let needle = term.to_lowercase();
    customers
        .iter()
        .filter(|c| {
            contains_ci(&c.name, &needle) || contains_ci(&c.email, &needle) || c.phone.contains(term)
        })
        .collect()
}

/// Customer name or invoice id (case-insensitive)
pub fn search_invoices<'a>(invoices: &'a [Invoice], term: &str) -> Vec<&'a Invoice> {
    let needle = term.to_lowercase();
    invoices
        .iter()
        .filter(|i| contains_ci(&i.customer_name, &needle) || contains_ci(&i.id, &needle))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Matched against name and vendor
    pub search: Option<String>,
    pub category: Option<String>,
}

impl ProductFilter {
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let needle = self.search.as_deref().map(str::to_lowercase);
        products
            .iter()
            .filter(|p| {
                needle
                    .as_deref()
                    .map_or(true, |n| contains_ci(&p.name, n) || contains_ci(&p.vendor, n))
            })
            .filter(|p| self.category.as_deref().map_or(true, |c| p.category == c))
            .collect()
    }
}

/// Distinct non-empty categories in first-seen order
pub fn categories(products: &[Product]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for p in products {
        if !p.category.is_empty() && !seen.contains(&p.category.as_str()) {
            seen.push(&p.category);
        }
    }
    seen
}

pub fn low_stock(products: &[Product]) -> Vec<&Product> {
    products.iter().filter(|p| p.is_low_stock()).collect()
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Matched against customer name and assignee
    pub search: Option<String>,
    pub status: Option<Status>,
    pub assignee: Option<String>,
}

impl TaskFilter {
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let needle = self.search.as_deref().map(str::to_lowercase);
        tasks
            .iter()
            .filter(|t| {
                needle.as_deref().map_or(true, |n| {
                    contains_ci(&t.customer_name, n) || contains_ci(&t.assigned_to, n)
                })
            })
            .filter(|t| self.status.map_or(true, |s| t.status == s))
            .filter(|t| self.assignee.as_deref().map_or(true, |a| t.assigned_to == a))
            .collect()
    }
}

/// Distinct non-empty assignees in first-seen order
pub fn assignees(tasks: &[Task]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for t in tasks {
        if !t.assigned_to.is_empty() && !seen.contains(&t.assigned_to.as_str()) {
            seen.push(&t.assigned_to);
        }
    }
    seen
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

pub fn task_status_counts(tasks: &[Task]) -> StatusCounts {
    tasks
        .iter()
        .fold(StatusCounts::default(), |mut counts, t| {
            match t.status {
                Status::Pending => counts.pending += 1,
                Status::InProgress => counts.in_progress += 1,
                Status::Completed => counts.completed += 1,
            }
            counts
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskType;

    fn customer(name: &str, email: &str, phone: &str) -> Customer {
        Customer {
            id: name.into(),
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            address: String::new(),
            solar_capacity: 0.0,
            monthly_bill: 0.0,
            installation_date: None,
            status: Status::Pending,
            created_at: None,
        }
    }

    fn product(name: &str, vendor: &str, category: &str) -> Product {
        Product {
            id: name.into(),
            name: name.into(),
            category: category.into(),
            quantity: 3,
            vendor: vendor.into(),
            unit_cost: 1.0,
            min_threshold: 5,
            created_at: None,
        }
    }

    fn task(customer: &str, assignee: &str, status: Status) -> Task {
        Task {
            id: format!("{customer}-{assignee}"),
            customer_id: "c".into(),
            customer_name: customer.into(),
            kind: TaskType::Installation,
            status,
            assigned_to: assignee.into(),
            scheduled_date: String::new(),
            completed_date: None,
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn customer_search_matches_name_email_phone() {
        let customers = vec![
            customer("Asha Menon", "asha@x.in", "98450 11111"),
            customer("Bala", "bala@SUN.in", "90000 22222"),
        ];
        assert_eq!(search_customers(&customers, "MENON").len(), 1);
        assert_eq!(search_customers(&customers, "sun.in")[0].name, "Bala");
        assert_eq!(search_customers(&customers, "22222")[0].name, "Bala");
        assert_eq!(search_customers(&customers, "").len(), 2);
    }

    #[test]
    fn product_filter_combines_search_and_category() {
        let products = vec![
            product("Panel 450W", "SunVolt", "Panels"),
            product("Inverter", "SunVolt", "Inverters"),
            product("Panel 540W", "Rayzen", "Panels"),
        ];
        let filter = ProductFilter {
            search: Some("sunvolt".into()),
            category: Some("Panels".into()),
        };
        let hits = filter.apply(&products);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Panel 450W");
        assert_eq!(categories(&products), ["Panels", "Inverters"]);
        assert_eq!(low_stock(&products).len(), 3);
    }

    #[test]
    fn task_filter_and_counts() {
        let tasks = vec![
            task("Asha", "Ravi", Status::Pending),
            task("Bala", "Meera", Status::Completed),
            task("Chitra", "Ravi", Status::InProgress),
        ];
        let filter = TaskFilter {
            assignee: Some("Ravi".into()),
            status: Some(Status::Pending),
            ..Default::default()
        };
        assert_eq!(filter.apply(&tasks).len(), 1);

        let search = TaskFilter {
            search: Some("meera".into()),
            ..Default::default()
        };
        assert_eq!(search.apply(&tasks)[0].customer_name, "Bala");

        assert_eq!(assignees(&tasks), ["Ravi", "Meera"]);
        assert_eq!(
            task_status_counts(&tasks),
            StatusCounts {
                pending: 1,
                in_progress: 1,
                completed: 1
            }
        );
    }
}
