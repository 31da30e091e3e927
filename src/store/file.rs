use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};
use uuid::Uuid;

use super::{document_id, Collection, Document, DocumentStore};
use crate::error::{CrmError, Result};
use crate::model::timestamp_now;

/// Keeps each collection as a JSON array in `<root>/<collection>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened file store");
        Ok(Self { root })
    }

    fn path(&self, collection: Collection) -> PathBuf {
        self.root.join(format!("{}.json", collection.name()))
    }

    fn read(&self, collection: Collection) -> Result<Vec<Document>> {
        let path = self.path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<Value> =
            serde_json::from_str(&content).map_err(|e| CrmError::CorruptCollection {
                collection: collection.name().to_string(),
                reason: e.to_string(),
            })?;

        Ok(values
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect())
    }

    fn write(&self, collection: Collection, docs: &[Document]) -> Result<()> {
        let path = self.path(collection);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(docs)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn not_found(collection: Collection, id: &str) -> CrmError {
        CrmError::RecordNotFound {
            collection: collection.name().to_string(),
            id: id.to_string(),
        }
    }
}

impl DocumentStore for FileStore {
    fn get_all(&self, collection: Collection) -> Result<Vec<Document>> {
        self.read(collection)
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        Ok(self
            .read(collection)?
            .into_iter()
            .find(|d| document_id(d) == Some(id)))
    }

    fn add(&self, collection: Collection, mut doc: Document) -> Result<Document> {
        let mut docs = self.read(collection)?;

        let id = Uuid::new_v4().simple().to_string();
        doc.insert("id".into(), Value::String(id.clone()));
        doc.insert("createdAt".into(), Value::String(timestamp_now()));
        docs.push(doc.clone());

        self.write(collection, &docs)?;
        info!(%collection, %id, "added record");
        Ok(doc)
    }

    fn update(&self, collection: Collection, id: &str, patch: Document) -> Result<()> {
        let mut docs = self.read(collection)?;
        let doc = docs
            .iter_mut()
            .find(|d| document_id(d) == Some(id))
            .ok_or_else(|| Self::not_found(collection, id))?;

        for (key, value) in patch {
            if key != "id" {
                doc.insert(key, value);
            }
        }
        doc.insert("updatedAt".into(), Value::String(timestamp_now()));

        self.write(collection, &docs)?;
        info!(%collection, %id, "updated record");
        Ok(())
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let mut docs = self.read(collection)?;
        let before = docs.len();
        docs.retain(|d| document_id(d) != Some(id));
        if docs.len() == before {
            return Err(Self::not_found(collection, id));
        }

        self.write(collection, &docs)?;
        info!(%collection, %id, "deleted record");
        Ok(())
    }
}
