//! Record types stored in the document store.
//!
//! Field names follow the store's camelCase document shape; status and type
//! strings decode into closed enums so invalid documents are caught at load.

mod customer;
mod dates;
mod invoice;
mod product;
mod status;
mod task;

pub use customer::{Customer, CustomerUpdate};
pub use dates::{parse_date_input, parse_instant, timestamp_now};
pub use invoice::{Invoice, InvoiceLine};
pub use product::{Product, ProductUpdate, StockLevel};
pub use status::{Status, TaskType};
pub use task::{Task, TaskUpdate};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::Collection;

/// A record kept in one of the store's collections.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);
}
