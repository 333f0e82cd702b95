//! Location records: list, get, create, update, delete

use tracing::{debug, info};

use crate::{
    database::{models::LocationDocument, Collection, Database, Document},
    errors::NavigationError,
    models::{Location, LocationCreate, LocationPatch},
};

/// Most records returned by a single list call
pub const LIST_LIMIT: usize = 1000;

const RESOURCE: &str = "Location";

/// CRUD over locations in the document store
#[derive(Debug, Clone)]
pub struct LocationStore {
    database: Database,
}

impl LocationStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// All locations in storage order, capped at [`LIST_LIMIT`]
    pub async fn list(&self) -> Result<Vec<Location>, NavigationError> {
        let documents = self
            .database
            .find_all(Collection::Locations, LIST_LIMIT)
            .await?;

        documents
            .into_iter()
            .map(|document| {
                let key = document_key(&document);
                LocationDocument::from_document(&key, document)?.into_location()
            })
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Location, NavigationError> {
        self.load(id).await?.ok_or(NavigationError::NotFound(RESOURCE))
    }

    /// Validate and persist a new location with server assigned id and time
    pub async fn create(&self, payload: LocationCreate) -> Result<Location, NavigationError> {
        let location = Location::new(payload.validate()?);
        let document = LocationDocument::from(&location).into_document()?;

        self.database
            .insert_one(Collection::Locations, &location.id, document)
            .await?;

        info!("Created location {} ({})", location.id, location.name);
        Ok(location)
    }

    /// Apply the non-null fields of `patch`.
    ///
    /// Existence check, field write and re-read are three separate store
    /// operations. Concurrent updates to one id are last-writer-wins per
    /// field and there is no version check.
    pub async fn update(
        &self,
        id: &str,
        patch: LocationPatch,
    ) -> Result<Location, NavigationError> {
        if self.load(id).await?.is_none() {
            return Err(NavigationError::NotFound(RESOURCE));
        }

        let fields = patch.into_fields()?;
        if fields.is_empty() {
            debug!("Empty update for location {}", id);
        } else {
            self.database
                .set_fields(Collection::Locations, id, fields)
                .await?;
            info!("Updated location {}", id);
        }

        // NotFound if deleted since the existence check
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), NavigationError> {
        if !self.database.delete_one(Collection::Locations, id).await? {
            return Err(NavigationError::NotFound(RESOURCE));
        }
        info!("Deleted location {}", id);
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<Location>, NavigationError> {
        match self.database.find_one(Collection::Locations, id).await? {
            Some(document) => Ok(Some(
                LocationDocument::from_document(id, document)?.into_location()?,
            )),
            None => Ok(None),
        }
    }
}

fn document_key(document: &Document) -> String {
    document
        .get("id")
        .and_then(|id| id.as_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use serde_json::json;
    use uuid::Uuid;

    fn store() -> LocationStore {
        LocationStore::new(Database::in_memory())
    }

    fn radiology() -> LocationCreate {
        serde_json::from_value(json!({
            "name": "Radiology",
            "description": "Ground floor, east wing",
            "coordinates": {"x": 10.5, "y": 0, "z": 15.2},
            "icon_url": "/api/uploads/radiology.png"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_empty() -> Result<(), NavigationError> {
        assert!(store().list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_then_get() -> Result<(), NavigationError> {
        let store = store();
        let created = store.create(radiology()).await?;

        assert_eq!(created.name, "Radiology");
        assert_eq!(created.description.as_deref(), Some("Ground floor, east wing"));
        assert_eq!(created.icon_url.as_deref(), Some("/api/uploads/radiology.png"));
        assert_eq!(store.get(&created.id).await?, created);
        assert_eq!(store.list().await?, vec![created]);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_invalid_is_not_persisted() -> Result<(), NavigationError> {
        let store = store();
        let payload: LocationCreate = serde_json::from_value(json!({"name": "Lab"})).unwrap();

        let result = store.create(payload).await;
        assert!(matches!(result, Err(NavigationError::Validation(_))));
        assert!(store.list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_update_is_noop() -> Result<(), NavigationError> {
        let store = store();
        let created = store.create(radiology()).await?;

        let updated = store.update(&created.id, LocationPatch::default()).await?;
        assert_eq!(updated, created);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_single_fields() -> Result<(), NavigationError> {
        let store = store();
        let created = store.create(radiology()).await?;

        let renamed = store
            .update(
                &created.id,
                LocationPatch {
                    name: Some(Some("Imaging".to_string())),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(renamed.name, "Imaging");
        assert_eq!(renamed.description, created.description);
        assert_eq!(renamed.coordinates, created.coordinates);

        let described = store
            .update(
                &created.id,
                LocationPatch {
                    description: Some(Some("Moved upstairs".to_string())),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(described.name, "Imaging");
        assert_eq!(described.description.as_deref(), Some("Moved upstairs"));
        assert_eq!(described.coordinates, created.coordinates);

        let moved = store
            .update(
                &created.id,
                LocationPatch {
                    coordinates: Some(Some(Coordinates::new(1.0, 2.0, 3.0))),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(moved.coordinates, Coordinates::new(1.0, 2.0, 3.0));
        assert_eq!(moved.name, "Imaging");
        assert_eq!(moved.id, created.id);
        assert_eq!(moved.created_at, created.created_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_null_leaves_field() -> Result<(), NavigationError> {
        let store = store();
        let created = store.create(radiology()).await?;

        let patch: LocationPatch =
            serde_json::from_value(json!({"description": null, "icon_url": null})).unwrap();
        let updated = store.update(&created.id, patch).await?;
        assert_eq!(updated, created);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = store();
        let id = Uuid::new_v4().to_string();

        assert!(matches!(
            store.get(&id).await,
            Err(NavigationError::NotFound("Location"))
        ));
        assert!(matches!(
            store.update(&id, LocationPatch::default()).await,
            Err(NavigationError::NotFound("Location"))
        ));
        assert!(matches!(
            store.delete(&id).await,
            Err(NavigationError::NotFound("Location"))
        ));
    }

    #[tokio::test]
    async fn test_delete_twice() -> Result<(), NavigationError> {
        let store = store();
        let created = store.create(radiology()).await?;

        store.delete(&created.id).await?;
        assert!(matches!(
            store.get(&created.id).await,
            Err(NavigationError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(&created.id).await,
            Err(NavigationError::NotFound(_))
        ));
        Ok(())
    }
}
