//! In-memory snapshot of the four collections, loaded once per session.
//!
//! Every mutation goes to the store first; the snapshot only changes once the
//! store has accepted the write.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{CrmError, Result};
use crate::invoice::{build_invoice, InvoiceDraft};
use crate::model::{
    timestamp_now, Customer, CustomerUpdate, Invoice, Product, ProductUpdate, Record, Status,
    Task, TaskUpdate,
};
use crate::store::{document_id, from_document, to_document, Collection, DocumentStore};

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub tasks: Vec<Task>,
    pub invoices: Vec<Invoice>,
}

/// Record counts per collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub customers: usize,
    pub products: usize,
    pub tasks: usize,
    pub invoices: usize,
}

/// Gives the generic helpers access to the snapshot vector of a record type.
trait Snapshot: Record {
    fn rows(state: &AppState) -> &Vec<Self>;
    fn rows_mut(state: &mut AppState) -> &mut Vec<Self>;
}

macro_rules! snapshot {
    ($ty:ty, $field:ident) => {
        impl Snapshot for $ty {
            fn rows(state: &AppState) -> &Vec<Self> {
                &state.$field
            }

            fn rows_mut(state: &mut AppState) -> &mut Vec<Self> {
                &mut state.$field
            }
        }
    };
}

snapshot!(Customer, customers);
snapshot!(Product, products);
snapshot!(Task, tasks);
snapshot!(Invoice, invoices);

/// Fetch one collection, skipping documents that do not decode.
fn load_collection<R: Record>(store: &dyn DocumentStore) -> Result<Vec<R>> {
    let docs = store.get_all(R::COLLECTION)?;
    let mut records = Vec::with_capacity(docs.len());

    for doc in docs {
        let id = document_id(&doc).unwrap_or("<no id>").to_string();
        match from_document::<R>(doc) {
            Ok(record) => records.push(record),
            Err(e) => warn!(collection = %R::COLLECTION, %id, error = %e, "skipping invalid record"),
        }
    }

    debug!(collection = %R::COLLECTION, count = records.len(), "loaded collection");
    Ok(records)
}

fn not_found(collection: Collection, id: &str) -> CrmError {
    match collection {
        Collection::Customers => CrmError::CustomerNotFound(id.to_string()),
        Collection::Products => CrmError::ProductNotFound(id.to_string()),
        Collection::Tasks => CrmError::TaskNotFound(id.to_string()),
        Collection::Invoices => CrmError::InvoiceNotFound(id.to_string()),
    }
}

impl AppState {
    pub fn load(store: &dyn DocumentStore) -> Result<Self> {
        Ok(Self {
            customers: load_collection(store)?,
            products: load_collection(store)?,
            tasks: load_collection(store)?,
            invoices: load_collection(store)?,
        })
    }

    pub fn counts(&self) -> Counts {
        Counts {
            customers: self.customers.len(),
            products: self.products.len(),
            tasks: self.tasks.len(),
            invoices: self.invoices.len(),
        }
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn invoice(&self, id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == id)
    }

    fn insert<R: Snapshot>(&mut self, store: &dyn DocumentStore, record: R) -> Result<R> {
        let stored = store.add(R::COLLECTION, to_document(&record)?)?;
        let record: R = from_document(stored)?;
        R::rows_mut(self).push(record.clone());
        Ok(record)
    }

    fn patch<R: Snapshot, P: Serialize>(
        &mut self,
        store: &dyn DocumentStore,
        id: &str,
        update: &P,
    ) -> Result<R> {
        let index = R::rows(self)
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| not_found(R::COLLECTION, id))?;

        let patch = to_document(update)?;
        let mut merged = to_document(&R::rows(self)[index])?;
        merged.extend(patch.clone());
        let mut updated: R = from_document(merged)?;
        updated.set_id(id.to_string());

        store.update(R::COLLECTION, id, patch)?;
        R::rows_mut(self)[index] = updated.clone();
        Ok(updated)
    }

    fn remove<R: Snapshot>(&mut self, store: &dyn DocumentStore, id: &str) -> Result<()> {
        if !R::rows(self).iter().any(|r| r.id() == id) {
            return Err(not_found(R::COLLECTION, id));
        }
        store.delete(R::COLLECTION, id)?;
        R::rows_mut(self).retain(|r| r.id() != id);
        Ok(())
    }

    pub fn add_customer(&mut self, store: &dyn DocumentStore, customer: Customer) -> Result<Customer> {
        self.insert(store, customer)
    }

    pub fn update_customer(
        &mut self,
        store: &dyn DocumentStore,
        id: &str,
        update: &CustomerUpdate,
    ) -> Result<Customer> {
        self.patch(store, id, update)
    }

    pub fn delete_customer(&mut self, store: &dyn DocumentStore, id: &str) -> Result<()> {
        self.remove::<Customer>(store, id)
    }

    pub fn add_product(&mut self, store: &dyn DocumentStore, product: Product) -> Result<Product> {
        self.insert(store, product)
    }

    pub fn update_product(
        &mut self,
        store: &dyn DocumentStore,
        id: &str,
        update: &ProductUpdate,
    ) -> Result<Product> {
        self.patch(store, id, update)
    }

    pub fn delete_product(&mut self, store: &dyn DocumentStore, id: &str) -> Result<()> {
        self.remove::<Product>(store, id)
    }

    /// Add a task. The customer name is taken from the customer record when
    /// the reference resolves, otherwise the supplied name is kept.
    pub fn add_task(&mut self, store: &dyn DocumentStore, mut task: Task) -> Result<Task> {
        if let Some(customer) = self.customer(&task.customer_id) {
            task.customer_name = customer.name.clone();
        }
        if task.status == Status::Completed && task.completed_date.is_none() {
            task.completed_date = Some(timestamp_now());
        }
        self.insert(store, task)
    }

    /// Apply an edit. Moving a task into `completed` stamps its completion time.
    pub fn update_task(
        &mut self,
        store: &dyn DocumentStore,
        id: &str,
        update: &TaskUpdate,
    ) -> Result<Task> {
        let current = self
            .task(id)
            .ok_or_else(|| CrmError::TaskNotFound(id.to_string()))?;

        let mut update = update.clone();
        if update.status == Some(Status::Completed) && current.status != Status::Completed {
            update.completed_date = Some(timestamp_now());
        }
        self.patch(store, id, &update)
    }

    pub fn set_task_status(
        &mut self,
        store: &dyn DocumentStore,
        id: &str,
        status: Status,
    ) -> Result<Task> {
        let update = TaskUpdate {
            status: Some(status),
            ..Default::default()
        };
        self.update_task(store, id, &update)
    }

    pub fn delete_task(&mut self, store: &dyn DocumentStore, id: &str) -> Result<()> {
        self.remove::<Task>(store, id)
    }

    /// Compute and store an invoice. Returns `Ok(None)` without touching the
    /// store when the draft's customer does not exist.
    pub fn create_invoice(
        &mut self,
        store: &dyn DocumentStore,
        draft: InvoiceDraft,
    ) -> Result<Option<Invoice>> {
        let Some(invoice) = build_invoice(draft, &self.customers) else {
            debug!("invoice customer not found, nothing created");
            return Ok(None);
        };
        self.insert(store, invoice).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InvoiceLine, TaskType};
    use crate::store::{Document, FileStore};
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn customer(name: &str) -> Customer {
        Customer {
            id: String::new(),
            name: name.into(),
            phone: "555-0100".into(),
            email: format!("{}@example.com", name.to_lowercase()),
            address: "12 Sun Road".into(),
            solar_capacity: 5.0,
            monthly_bill: 3200.0,
            installation_date: None,
            status: Status::Pending,
            created_at: None,
        }
    }

    fn task(customer_id: &str) -> Task {
        Task {
            id: String::new(),
            customer_id: customer_id.into(),
            customer_name: "typed by hand".into(),
            kind: TaskType::Installation,
            status: Status::Pending,
            assigned_to: "Ravi".into(),
            scheduled_date: "2026-10-20".into(),
            completed_date: None,
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn added_records_survive_reload() {
        let (_dir, store) = store();
        let mut state = AppState::default();

        let asha = state.add_customer(&store, customer("Asha")).unwrap();
        assert!(!asha.id.is_empty());
        assert!(asha.created_at.is_some());

        let reloaded = AppState::load(&store).unwrap();
        assert_eq!(reloaded.customers, vec![asha]);
        assert_eq!(reloaded.counts().customers, 1);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let (_dir, store) = store();
        let mut state = AppState::default();
        let asha = state.add_customer(&store, customer("Asha")).unwrap();

        let update = CustomerUpdate {
            status: Some(Status::InProgress),
            ..Default::default()
        };
        let updated = state.update_customer(&store, &asha.id, &update).unwrap();
        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(updated.name, "Asha");

        let reloaded = AppState::load(&store).unwrap();
        assert_eq!(reloaded.customers[0].status, Status::InProgress);
    }

    #[test]
    fn unknown_ids_are_errors() {
        let (_dir, store) = store();
        let mut state = AppState::default();
        let err = state.delete_product(&store, "missing").unwrap_err();
        assert!(matches!(err, CrmError::ProductNotFound(_)));
        let err = state
            .update_customer(&store, "missing", &CustomerUpdate::default())
            .unwrap_err();
        assert!(matches!(err, CrmError::CustomerNotFound(_)));
    }

    #[test]
    fn task_takes_customer_name_from_record() {
        let (_dir, store) = store();
        let mut state = AppState::default();
        let asha = state.add_customer(&store, customer("Asha")).unwrap();

        let linked = state.add_task(&store, task(&asha.id)).unwrap();
        assert_eq!(linked.customer_name, "Asha");

        let orphan = state.add_task(&store, task("gone")).unwrap();
        assert_eq!(orphan.customer_name, "typed by hand");
    }

    #[test]
    fn completing_a_task_stamps_completed_date_once() {
        let (_dir, store) = store();
        let mut state = AppState::default();
        let t = state.add_task(&store, task("c1")).unwrap();
        assert_eq!(t.completed_date, None);

        let t = state
            .set_task_status(&store, &t.id, Status::InProgress)
            .unwrap();
        assert_eq!(t.completed_date, None);

        let done = state
            .set_task_status(&store, &t.id, Status::Completed)
            .unwrap();
        let stamp = done.completed_date.clone().unwrap();

        let again = state
            .set_task_status(&store, &t.id, Status::Completed)
            .unwrap();
        assert_eq!(again.completed_date, Some(stamp));
    }

    #[test]
    fn tasks_are_persisted() {
        let (_dir, store) = store();
        let mut state = AppState::default();
        state.add_task(&store, task("c1")).unwrap();

        let reloaded = AppState::load(&store).unwrap();
        assert_eq!(reloaded.tasks.len(), 1);
    }

    #[test]
    fn invoice_for_unknown_customer_is_a_no_op() {
        let (_dir, store) = store();
        let mut state = AppState::default();
        let draft = InvoiceDraft {
            customer_id: "ghost".into(),
            items: vec![InvoiceLine {
                product_id: None,
                name: "Wiring".into(),
                quantity: 1.0,
                unit_cost: 100.0,
            }],
            installation_date: "2026-10-01".into(),
            taxes: 0.0,
            company_address: None,
            gst_number: None,
            signatory: None,
        };

        assert_eq!(state.create_invoice(&store, draft).unwrap(), None);
        assert!(state.invoices.is_empty());
        assert!(store.get_all(Collection::Invoices).unwrap().is_empty());
    }

    #[test]
    fn invoice_is_stored_with_totals() {
        let (_dir, store) = store();
        let mut state = AppState::default();
        let asha = state.add_customer(&store, customer("Asha")).unwrap();
        let draft = InvoiceDraft {
            customer_id: asha.id.clone(),
            items: vec![InvoiceLine {
                product_id: Some("p1".into()),
                name: "Panel".into(),
                quantity: 10.0,
                unit_cost: 120.0,
            }],
            installation_date: "2026-10-01".into(),
            taxes: 216.0,
            company_address: None,
            gst_number: None,
            signatory: Some("R. Iyer".into()),
        };

        let invoice = state.create_invoice(&store, draft).unwrap().unwrap();
        assert_eq!(invoice.customer_name, "Asha");
        assert_eq!(invoice.total_cost, 1200.0);
        assert_eq!(invoice.final_amount, 1416.0);
        assert!(invoice.created_at.is_some());
        assert_eq!(AppState::load(&store).unwrap().invoices, vec![invoice]);
    }

    #[test]
    fn invalid_documents_are_skipped_on_load() {
        let (_dir, store) = store();
        let good: Document = serde_json::from_value(json!({
            "name": "Asha", "status": "pending"
        }))
        .unwrap();
        let bad: Document = serde_json::from_value(json!({
            "name": "Bala", "status": "archived"
        }))
        .unwrap();
        store.add(Collection::Customers, good).unwrap();
        store.add(Collection::Customers, bad).unwrap();

        let state = AppState::load(&store).unwrap();
        assert_eq!(state.customers.len(), 1);
        assert_eq!(state.customers[0].name, "Asha");
    }
}
