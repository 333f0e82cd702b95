// src/database/memory.rs
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Collection, Document};
use crate::errors::NavigationError;

/// In-process document store, insertion ordered per collection
#[derive(Debug, Clone, Default)]
pub struct MemoryDocuments {
    collections: Arc<RwLock<HashMap<Collection, Vec<(String, Document)>>>>,
}

impl MemoryDocuments {
    pub async fn find_one(&self, collection: Collection, key: &str) -> Option<Document> {
        let collections = self.collections.read().await;
        collections
            .get(&collection)?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, document)| document.clone())
    }

    pub async fn find_all(&self, collection: Collection, limit: usize) -> Vec<Document> {
        let collections = self.collections.read().await;
        collections
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .take(limit)
                    .map(|(_, document)| document.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn insert_one(
        &self,
        collection: Collection,
        key: &str,
        document: Document,
    ) -> Result<(), NavigationError> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();
        if documents.iter().any(|(k, _)| k == key) {
            return Err(NavigationError::DuplicateKey {
                collection: collection.as_str(),
                key: key.to_string(),
            });
        }
        documents.push((key.to_string(), document));
        Ok(())
    }

    pub async fn set_fields(&self, collection: Collection, key: &str, fields: Document) -> bool {
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(&collection)
            .and_then(|documents| documents.iter_mut().find(|(k, _)| k == key))
            .map(|(_, document)| document)
        else {
            return false;
        };
        document.extend(fields);
        true
    }

    pub async fn delete_one(&self, collection: Collection, key: &str) -> bool {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(&collection) else {
            return false;
        };
        match documents.iter().position(|(k, _)| k == key) {
            Some(index) => {
                documents.remove(index);
                true
            }
            None => false,
        }
    }
}
