// src/database/models.rs
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Collection, Document};
use crate::{
    errors::NavigationError,
    models::{AdminSettings, Coordinates, Location},
};

/// Location as stored, with `created_at` kept as ISO-8601 text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LocationDocument {
    id: String,
    name: String,
    description: Option<String>,
    coordinates: Coordinates,
    icon_url: Option<String>,
    created_at: String,
}

impl From<&Location> for LocationDocument {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id.clone(),
            name: location.name.clone(),
            description: location.description.clone(),
            coordinates: location.coordinates.clone(),
            icon_url: location.icon_url.clone(),
            created_at: location
                .created_at
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

impl LocationDocument {
    pub(crate) fn into_document(self) -> Result<Document, NavigationError> {
        let key = self.id.clone();
        match serde_json::to_value(self)? {
            Value::Object(document) => Ok(document),
            _ => Err(corrupt(
                Collection::Locations,
                &key,
                "location did not serialize to an object".to_string(),
            )),
        }
    }

    pub(crate) fn from_document(key: &str, document: Document) -> Result<Self, NavigationError> {
        serde_json::from_value(Value::Object(document))
            .map_err(|e| corrupt(Collection::Locations, key, e.to_string()))
    }

    /// Rehydrate into the public model
    pub(crate) fn into_location(self) -> Result<Location, NavigationError> {
        let created_at = parse_timestamp(&self.created_at).map_err(|e| {
            corrupt(
                Collection::Locations,
                &self.id,
                format!("invalid created_at {:?}: {}", self.created_at, e),
            )
        })?;

        Ok(Location {
            id: self.id,
            name: self.name,
            description: self.description,
            coordinates: self.coordinates,
            icon_url: self.icon_url,
            created_at,
        })
    }
}

/// Parse a stored ISO-8601 timestamp.
///
/// Accepts RFC 3339 with any offset, and offset-less timestamps which are
/// taken to be UTC.
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(timestamp) => Ok(timestamp.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc()),
    }
}

pub(crate) fn admin_settings_from_document(
    key: &str,
    document: Document,
) -> Result<AdminSettings, NavigationError> {
    serde_json::from_value(Value::Object(document))
        .map_err(|e| corrupt(Collection::AdminSettings, key, e.to_string()))
}

fn corrupt(collection: Collection, key: &str, message: String) -> NavigationError {
    NavigationError::CorruptDocument {
        collection: collection.as_str(),
        key: key.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use serde_json::json;

    fn stored(created_at: &str) -> Document {
        match json!({
            "id": "3f6c",
            "name": "Radiology",
            "description": null,
            "coordinates": {"x": 10.5, "y": 0, "z": 15.2},
            "icon_url": null,
            "created_at": created_at,
        }) {
            Value::Object(document) => document,
            _ => unreachable!(),
        }
    }

    #[test]
    fn parse_timestamp_with_offset() {
        let parsed = parse_timestamp("2024-03-01T12:30:00.250000+02:00").unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
        assert_eq!(parsed.with_nanosecond(0).unwrap(), expected);
        assert_eq!(parsed.nanosecond(), 250_000_000);
    }

    #[test]
    fn parse_timestamp_without_offset_is_utc() {
        let parsed = parse_timestamp("2024-03-01T12:30:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn created_at_survives_storage() {
        let location = Location::new(crate::models::NewLocation {
            name: "Cardiology".to_string(),
            description: Some("Second floor".to_string()),
            coordinates: Coordinates::new(1.0, 2.0, 3.0),
            icon_url: None,
        });

        let document = LocationDocument::from(&location).into_document().unwrap();
        assert!(document["created_at"].is_string());

        let restored = LocationDocument::from_document(&location.id, document)
            .unwrap()
            .into_location()
            .unwrap();
        assert_eq!(restored, location);
    }

    #[test]
    fn rehydrate_python_style_timestamp() {
        let document = stored("2025-01-15T08:00:00.123456+00:00");
        let location = LocationDocument::from_document("3f6c", document)
            .unwrap()
            .into_location()
            .unwrap();

        assert_eq!(location.name, "Radiology");
        assert_eq!(location.created_at.timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn rehydrate_invalid_timestamp_is_corrupt() {
        let document = stored("not a date");
        let result = LocationDocument::from_document("3f6c", document)
            .unwrap()
            .into_location();
        assert!(matches!(result, Err(NavigationError::CorruptDocument { .. })));
    }

    #[test]
    fn missing_name_is_corrupt() {
        let mut document = stored("2025-01-15T08:00:00Z");
        document.remove("name");
        assert!(LocationDocument::from_document("3f6c", document).is_err());
    }

    #[test]
    fn admin_settings_document() {
        let document = match json!({"pin": "4321"}) {
            Value::Object(document) => document,
            _ => unreachable!(),
        };
        let settings = admin_settings_from_document("admin", document).unwrap();
        assert_eq!(settings.pin, "4321");
    }
}
