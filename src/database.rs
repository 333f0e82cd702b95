// src/database.rs
//! Document store used by every component.
//!
//! Records are JSON objects addressed by `(collection, key)`. Each
//! operation touches a single document and is atomic on its own; nothing
//! here spans several operations.

pub mod memory;
pub mod models;
pub mod postgres;

use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::warn;

use crate::{config::DatabaseConfig, errors::NavigationError};

use memory::MemoryDocuments;
use postgres::PostgresDocuments;

/// A stored JSON object
pub type Document = Map<String, Value>;

/// URL selecting the in-process store
pub const MEMORY_URL: &str = "memory://";

/// Named groups of documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Locations,
    AdminSettings,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Locations => "locations",
            Collection::AdminSettings => "admin_settings",
        }
    }
}

/// Handle to the document store, cheap to clone
#[derive(Debug, Clone)]
pub enum Database {
    Postgres(PostgresDocuments),
    Memory(MemoryDocuments),
}

impl Database {
    /// Wrap an existing pool, running migrations
    pub async fn new(pool: PgPool) -> Result<Self, NavigationError> {
        Ok(Self::Postgres(PostgresDocuments::new(pool).await?))
    }

    /// Empty in-process store
    pub fn in_memory() -> Self {
        Self::Memory(MemoryDocuments::default())
    }

    /// Connect to the store named by the configuration URL
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, NavigationError> {
        if config.url == MEMORY_URL {
            warn!("Using in-memory document store, locations are lost on restart");
            return Ok(Self::in_memory());
        }
        Ok(Self::Postgres(PostgresDocuments::connect(config).await?))
    }

    pub async fn find_one(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Option<Document>, NavigationError> {
        match self {
            Database::Postgres(db) => db.find_one(collection, key).await,
            Database::Memory(db) => Ok(db.find_one(collection, key).await),
        }
    }

    /// Documents in insertion order, at most `limit` of them
    pub async fn find_all(
        &self,
        collection: Collection,
        limit: usize,
    ) -> Result<Vec<Document>, NavigationError> {
        match self {
            Database::Postgres(db) => db.find_all(collection, limit).await,
            Database::Memory(db) => Ok(db.find_all(collection, limit).await),
        }
    }

    /// Insert a new document, failing with `DuplicateKey` if `key` is taken
    pub async fn insert_one(
        &self,
        collection: Collection,
        key: &str,
        document: Document,
    ) -> Result<(), NavigationError> {
        match self {
            Database::Postgres(db) => db.insert_one(collection, key, document).await,
            Database::Memory(db) => db.insert_one(collection, key, document).await,
        }
    }

    /// Merge `fields` into a document. Returns false if there is no such document.
    pub async fn set_fields(
        &self,
        collection: Collection,
        key: &str,
        fields: Document,
    ) -> Result<bool, NavigationError> {
        match self {
            Database::Postgres(db) => db.set_fields(collection, key, fields).await,
            Database::Memory(db) => Ok(db.set_fields(collection, key, fields).await),
        }
    }

    /// Remove a document. Returns false if nothing was removed.
    pub async fn delete_one(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<bool, NavigationError> {
        match self {
            Database::Postgres(db) => db.delete_one(collection, key).await,
            Database::Memory(db) => Ok(db.delete_one(collection, key).await),
        }
    }

    /// Release pooled connections
    pub async fn close(&self) {
        if let Database::Postgres(db) = self {
            db.close().await;
        }
    }
}
