// src/database/postgres.rs
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use tracing::{error, info};

use super::{Collection, Document};
use crate::{config::DatabaseConfig, errors::NavigationError};

/// PostgreSQL backed document store.
///
/// All collections share the `documents` table; bodies are JSONB and
/// `seq` records insertion order.
#[derive(Debug, Clone)]
pub struct PostgresDocuments {
    pool: PgPool,
}

impl PostgresDocuments {
    /// Wrap a pool and bring the schema up to date
    pub async fn new(pool: PgPool) -> Result<Self, NavigationError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, NavigationError> {
        info!(
            "Connecting to database: max_connections={}, acquire_timeout={:?}",
            config.max_connections, config.acquire_timeout
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await
            .map_err(|e| {
                error!("Failed to connect to database: {}", e);
                e
            })?;

        Self::new(pool).await
    }

    pub async fn find_one(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Option<Document>, NavigationError> {
        let body: Option<Json<Document>> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = $1 AND key = $2",
        )
        .bind(collection.as_str())
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(body.map(|Json(document)| document))
    }

    pub async fn find_all(
        &self,
        collection: Collection,
        limit: usize,
    ) -> Result<Vec<Document>, NavigationError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let bodies: Vec<Json<Document>> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = $1 ORDER BY seq LIMIT $2",
        )
        .bind(collection.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(bodies.into_iter().map(|Json(document)| document).collect())
    }

    pub async fn insert_one(
        &self,
        collection: Collection,
        key: &str,
        document: Document,
    ) -> Result<(), NavigationError> {
        let result = sqlx::query("INSERT INTO documents (collection, key, body) VALUES ($1, $2, $3)")
            .bind(collection.as_str())
            .bind(key)
            .bind(Json(document))
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(NavigationError::DuplicateKey {
                    collection: collection.as_str(),
                    key: key.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Shallow merge, top-level keys in `fields` replace stored ones
    pub async fn set_fields(
        &self,
        collection: Collection,
        key: &str,
        fields: Document,
    ) -> Result<bool, NavigationError> {
        let result = sqlx::query(
            "UPDATE documents SET body = body || $3 WHERE collection = $1 AND key = $2",
        )
        .bind(collection.as_str())
        .bind(key)
        .bind(Json(fields))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_one(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<bool, NavigationError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND key = $2")
            .bind(collection.as_str())
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
