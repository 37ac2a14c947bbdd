//! Persistence adapters.
//!
//! An adapter is the external collaborator a record delegates to when saved.
//! It is injected per model class at construction time, never looked up
//! through shared global state.

use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::errors::AdapterError;
use crate::id::generate_record_id;
use crate::record::Record;
use crate::types::RecordDocument;

/// External persistence collaborator.
///
/// `save_record` persists the record's current attributes and resolves with
/// the canonical id, assigning a fresh one for records saved without an id.
/// A failure leaves the record's dirty state untouched so the caller can
/// retry.
#[async_trait]
pub trait Adapter: Send + Sync {
    async fn save_record(&self, record: &Record) -> Result<String, AdapterError>;

    /// Fetch the raw attributes of record `id` in `collection`.
    async fn find_record(&self, collection: &str, id: &str) -> Result<Value, AdapterError>;
}

/// In-process adapter keeping documents in per-collection maps.
///
/// Fixture-style backend for tests and examples: saves always succeed and
/// lookups answer from memory.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    collections: RwLock<HashMap<String, HashMap<String, RecordDocument>>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents stored for a collection.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, HashMap::len)
    }

    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }

    /// Seed a document directly, bypassing the record lifecycle.
    pub async fn insert_fixture(
        &self,
        collection: &str,
        id: &str,
        attributes: Value,
    ) -> Result<(), AdapterError> {
        let Value::Object(attributes) = attributes else {
            return Err(AdapterError::new("fixture attributes must be a JSON object"));
        };
        let mut collections = self.collections.write().await;
        collections.entry(collection.to_string()).or_default().insert(
            id.to_string(),
            RecordDocument {
                id: Some(id.to_string()),
                attributes,
            },
        );
        Ok(())
    }
}

#[async_trait]
impl Adapter for MemoryAdapter {
    async fn save_record(&self, record: &Record) -> Result<String, AdapterError> {
        let id = record
            .id()
            .map(str::to_string)
            .unwrap_or_else(generate_record_id);
        let collection = record.class().name().to_string();
        let mut document = record.to_document();
        document.id = Some(id.clone());

        debug!("memory adapter: saving {collection}/{id}");
        let mut collections = self.collections.write().await;
        collections.entry(collection).or_default().insert(id.clone(), document);
        Ok(id)
    }

    async fn find_record(&self, collection: &str, id: &str) -> Result<Value, AdapterError> {
        let collections = self.collections.read().await;
        let document = collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .ok_or_else(|| {
                AdapterError::not_found(format!("no record '{id}' in collection '{collection}'"))
            })?;
        Ok(Value::Object(document.attributes.clone()))
    }
}
