//! Data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::{FieldError, NavigationError};

/// Axes every coordinate set must carry
const AXES: [&str; 3] = ["x", "y", "z"];

/// Position of a location in the 3D hospital model.
///
/// Stored as an open map so clients may attach extra keys (floor, zone
/// hints and so on); those are kept and returned verbatim. Only `x`, `y`
/// and `z` are guaranteed and they must be numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Coordinates(Map<String, Value>);

impl TryFrom<Map<String, Value>> for Coordinates {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        for axis in AXES {
            match map.get(axis) {
                Some(Value::Number(_)) => {}
                Some(_) => return Err(format!("coordinate `{axis}` must be a number")),
                None => return Err(format!("coordinate `{axis}` is required")),
            }
        }
        Ok(Self(map))
    }
}

impl TryFrom<Value> for Coordinates {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Self::try_from(map),
            _ => Err("coordinates must be an object with x, y and z".to_string()),
        }
    }
}

impl From<Coordinates> for Map<String, Value> {
    fn from(coordinates: Coordinates) -> Self {
        coordinates.0
    }
}

impl Coordinates {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        let mut map = Map::new();
        map.insert("x".to_string(), Value::from(x));
        map.insert("y".to_string(), Value::from(y));
        map.insert("z".to_string(), Value::from(z));
        Self(map)
    }

    pub fn x(&self) -> f64 {
        self.axis("x")
    }

    pub fn y(&self) -> f64 {
        self.axis("y")
    }

    pub fn z(&self) -> f64 {
        self.axis("z")
    }

    /// Keys beyond `x`, `y` and `z`
    pub fn extra(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().filter(|(k, _)| !AXES.contains(&k.as_str()))
    }

    // Axes are checked on construction, NaN is unreachable
    fn axis(&self, axis: &str) -> f64 {
        self.0.get(axis).and_then(Value::as_f64).unwrap_or(f64::NAN)
    }
}

/// A navigable point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Public identifier, assigned once at creation
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub coordinates: Coordinates,
    /// Icon path, usually pointing into the uploads namespace. Not checked.
    pub icon_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Location {
    /// Build a new location with a fresh id and creation time
    pub fn new(new: NewLocation) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            description: new.description,
            coordinates: new.coordinates,
            icon_url: new.icon_url,
            created_at: Utc::now(),
        }
    }
}

/// Create payload as received from clients.
///
/// Required fields are optional here so that every missing one can be
/// reported at once by [`LocationCreate::validate`]. Client supplied `id`
/// or `created_at` keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationCreate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub coordinates: Option<Value>,
    pub icon_url: Option<String>,
}

/// Validated create payload
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    pub name: String,
    pub description: Option<String>,
    pub coordinates: Coordinates,
    pub icon_url: Option<String>,
}

impl LocationCreate {
    pub fn validate(self) -> Result<NewLocation, NavigationError> {
        let mut errors = Vec::new();

        let name = match self.name {
            Some(name) if !name.is_empty() => Some(name),
            Some(_) => {
                errors.push(FieldError::new("name", "name must not be empty"));
                None
            }
            None => {
                errors.push(FieldError::new("name", "field required"));
                None
            }
        };

        let coordinates = match self.coordinates {
            Some(value) => match Coordinates::try_from(value) {
                Ok(coordinates) => Some(coordinates),
                Err(message) => {
                    errors.push(FieldError::new("coordinates", message));
                    None
                }
            },
            None => {
                errors.push(FieldError::new("coordinates", "field required"));
                None
            }
        };

        match (name, coordinates) {
            (Some(name), Some(coordinates)) if errors.is_empty() => Ok(NewLocation {
                name,
                description: self.description,
                coordinates,
                icon_url: self.icon_url,
            }),
            _ => Err(NavigationError::Validation(errors)),
        }
    }
}

/// Partial update payload.
///
/// Each field is tri-state: absent (`None`), explicit null (`Some(None)`)
/// or a value. Only values are applied; null currently means "leave
/// unchanged" just like absent, so a field cannot be cleared.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LocationPatch {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub coordinates: Option<Option<Coordinates>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub icon_url: Option<Option<String>>,
}

impl LocationPatch {
    /// Fields to set on the stored document, nulls dropped
    pub fn into_fields(self) -> Result<Map<String, Value>, NavigationError> {
        let mut fields = Map::new();

        if let Some(Some(name)) = self.name {
            if name.is_empty() {
                return Err(NavigationError::invalid_field(
                    "name",
                    "name must not be empty",
                ));
            }
            fields.insert("name".to_string(), Value::String(name));
        }
        if let Some(Some(description)) = self.description {
            fields.insert("description".to_string(), Value::String(description));
        }
        if let Some(Some(coordinates)) = self.coordinates {
            fields.insert(
                "coordinates".to_string(),
                Value::Object(coordinates.into()),
            );
        }
        if let Some(Some(icon_url)) = self.icon_url {
            fields.insert("icon_url".to_string(), Value::String(icon_url));
        }

        Ok(fields)
    }
}

/// Singleton admin record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSettings {
    pub pin: String,
}

/// Body of a PIN verification request
#[derive(Debug, Clone, Deserialize)]
pub struct PinVerification {
    pub pin: String,
}

/// Generic `{success, message}` acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub success: bool,
    pub message: String,
}

impl Acknowledgement {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Result of a stored upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub success: bool,
    pub url: String,
}
