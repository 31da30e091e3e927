//! Data access: a small document-store interface keyed by collection name
//! and record id, with a local JSON backend and an HTTP backend.

mod file;
mod http;

pub use file::FileStore;
pub use http::HttpStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::config::{resolve_dir, StoreSettings};
use crate::error::{CrmError, Result};

/// A stored document: a JSON object with an `id` field.
pub type Document = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Customers,
    Products,
    Tasks,
    Invoices,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Customers,
        Collection::Products,
        Collection::Tasks,
        Collection::Invoices,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Customers => "customers",
            Collection::Products => "products",
            Collection::Tasks => "tasks",
            Collection::Invoices => "invoices",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self> {
        Collection::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| CrmError::UnknownCollection(s.to_string()))
    }
}

pub trait DocumentStore {
    fn get_all(&self, collection: Collection) -> Result<Vec<Document>>;

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>>;

    /// Insert a document. Returns it as stored, with `id` and `createdAt` assigned.
    fn add(&self, collection: Collection, doc: Document) -> Result<Document>;

    /// Merge `patch` into an existing document.
    fn update(&self, collection: Collection, id: &str, patch: Document) -> Result<()>;

    fn delete(&self, collection: Collection, id: &str) -> Result<()>;
}

/// Open the backend selected in `[store]`
pub fn open_store(settings: &StoreSettings, cfg_dir: &Path) -> Result<Box<dyn DocumentStore>> {
    match settings.backend.as_str() {
        "file" => {
            let root = resolve_dir(&settings.data_dir, cfg_dir);
            Ok(Box::new(FileStore::open(root)?))
        }
        "http" => {
            let base_url = settings
                .base_url
                .clone()
                .ok_or(CrmError::MissingBaseUrl)?;
            Ok(Box::new(HttpStore::new(
                base_url,
                settings.api_key.clone(),
                Duration::from_secs(settings.timeout_secs),
            )))
        }
        other => Err(CrmError::UnknownBackend(other.to_string())),
    }
}

/// Serialize a record or patch into a document, dropping its `id`
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        _ => Ok(Document::new()),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// Read a document's `id`, if it carries a string one
pub fn document_id(doc: &Document) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}
