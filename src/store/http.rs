use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use ureq::{Agent, RequestBuilder};

use super::{Collection, Document, DocumentStore};
use crate::error::{CrmError, Result};
use crate::model::timestamp_now;

/// Client for a REST document service:
///
/// - `GET    {base}/{collection}`       -> array of documents
/// - `GET    {base}/{collection}/{id}`  -> document, or 404
/// - `POST   {base}/{collection}`       -> created document (at least `{"id"}`)
/// - `PATCH  {base}/{collection}/{id}`
/// - `DELETE {base}/{collection}/{id}`
pub struct HttpStore {
    agent: Agent,
    base_url: String,
    api_key: Option<String>,
}

impl HttpStore {
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/{}", self.base_url, collection.name())
    }

    fn record_url(&self, collection: Collection, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection.name(), id)
    }

    fn authorize<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {key}")),
            None => request,
        }
    }
}

/// Set `key` to the current time unless the document already carries a value
fn stamp(doc: &mut Document, key: &str) {
    if doc.get(key).map_or(true, Value::is_null) {
        doc.insert(key.to_string(), Value::String(timestamp_now()));
    }
}

fn into_document(value: Value) -> Option<Document> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

impl DocumentStore for HttpStore {
    fn get_all(&self, collection: Collection) -> Result<Vec<Document>> {
        let url = self.collection_url(collection);
        debug!(%url, "fetching collection");

        let body = self
            .authorize(self.agent.get(&url))
            .call()?
            .body_mut()
            .read_to_string()?;

        let values: Vec<Value> =
            serde_json::from_str(&body).map_err(|e| CrmError::CorruptCollection {
                collection: collection.name().to_string(),
                reason: e.to_string(),
            })?;

        Ok(values.into_iter().filter_map(into_document).collect())
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        let url = self.record_url(collection, id);

        let mut response = match self.authorize(self.agent.get(&url)).call() {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(404)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let body = response.body_mut().read_to_string()?;
        Ok(into_document(serde_json::from_str(&body)?))
    }

    fn add(&self, collection: Collection, mut doc: Document) -> Result<Document> {
        let url = self.collection_url(collection);
        stamp(&mut doc, "createdAt");
        let payload = serde_json::to_string(&doc)?;

        let body = self
            .authorize(self.agent.post(&url))
            .header("Content-Type", "application/json")
            .send(payload.as_str())?
            .body_mut()
            .read_to_string()?;

        let mut stored = doc;
        if let Some(created) = into_document(serde_json::from_str(&body)?) {
            stored.extend(created);
        }
        if !stored.contains_key("id") {
            return Err(CrmError::Http(format!(
                "{url} returned no id for the new record"
            )));
        }

        info!(%collection, "added record");
        Ok(stored)
    }

    fn update(&self, collection: Collection, id: &str, mut patch: Document) -> Result<()> {
        let url = self.record_url(collection, id);
        patch.insert("updatedAt".into(), Value::String(timestamp_now()));
        let payload = serde_json::to_string(&patch)?;

        match self
            .authorize(self.agent.patch(&url))
            .header("Content-Type", "application/json")
            .send(payload.as_str())
        {
            Ok(_) => {}
            Err(ureq::Error::StatusCode(404)) => {
                return Err(CrmError::RecordNotFound {
                    collection: collection.name().to_string(),
                    id: id.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        }

        info!(%collection, %id, "updated record");
        Ok(())
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let url = self.record_url(collection, id);

        match self.authorize(self.agent.delete(&url)).call() {
            Ok(_) => {}
            Err(ureq::Error::StatusCode(404)) => {
                return Err(CrmError::RecordNotFound {
                    collection: collection.name().to_string(),
                    id: id.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        }

        info!(%collection, %id, "deleted record");
        Ok(())
    }
}
