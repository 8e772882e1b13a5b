//! Notification envelope delivered by the broker and the vehicle state
//! extracted from it

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Attributes the handler extracts from every delivered entity.
pub const OBSERVED_ATTRIBUTES: &[&str] = &[
    "location",
    "move",
    "direction",
    "serviceStatus",
    "signalQuality",
    "speed",
];

/// The broker's push envelope: `{"data": [entity, ...]}`. Entities stay
/// untyped until extraction so a malformed one yields a
/// [`NotificationError`] rather than a serde rejection of the whole body.
#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub data: Vec<Value>,
}

/// Extraction failures for a delivered entity
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NotificationError {
    #[error("notification carried no entities")]
    EmptyPayload,

    #[error("attribute missing from notification: {name}")]
    MissingAttribute { name: String },

    #[error("attribute '{name}' has unexpected shape, expected {expected}")]
    MalformedAttribute {
        name: String,
        expected: &'static str,
    },
}

/// One observation of the vehicle, as pushed by the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    /// GeoJSON coordinates of the `location` attribute
    pub coordinates: Vec<f64>,
    /// Whether the vehicle is currently executing a move order
    pub moving: bool,
    pub direction: String,
    pub service_status: String,
    pub signal_quality: f64,
    pub speed: f64,
}

impl VehicleState {
    /// Extract the observed attributes from one entity of a notification.
    /// Every attribute arrives wrapped as `{"value": ...}`; `location` nests a
    /// GeoJSON object inside its wrapper.
    pub fn from_entity(entity: &Value) -> Result<Self, NotificationError> {
        let malformed_location = || NotificationError::MalformedAttribute {
            name: "location".to_string(),
            expected: "a GeoJSON value with numeric coordinates",
        };
        let location = attribute_value(entity, "location")?;
        let coordinates = location
            .get("coordinates")
            .and_then(Value::as_array)
            .ok_or_else(malformed_location)?
            .iter()
            .map(Value::as_f64)
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(malformed_location)?;

        Ok(Self {
            coordinates,
            moving: bool_attribute(entity, "move")?,
            direction: string_attribute(entity, "direction")?,
            service_status: string_attribute(entity, "serviceStatus")?,
            signal_quality: number_attribute(entity, "signalQuality")?,
            speed: number_attribute(entity, "speed")?,
        })
    }

    /// Extract from the first entity of a notification envelope.
    pub fn from_notification(notification: &Notification) -> Result<Self, NotificationError> {
        let entity = notification
            .data
            .first()
            .ok_or(NotificationError::EmptyPayload)?;
        Self::from_entity(entity)
    }
}

/// Unwrap `{name: {"value": ...}}` from an entity.
fn attribute_value<'a>(entity: &'a Value, name: &str) -> Result<&'a Value, NotificationError> {
    entity
        .get(name)
        .and_then(|attribute| attribute.get("value"))
        .ok_or_else(|| NotificationError::MissingAttribute {
            name: name.to_string(),
        })
}

fn bool_attribute(entity: &Value, name: &str) -> Result<bool, NotificationError> {
    attribute_value(entity, name)?
        .as_bool()
        .ok_or_else(|| NotificationError::MalformedAttribute {
            name: name.to_string(),
            expected: "a boolean value",
        })
}

fn string_attribute(entity: &Value, name: &str) -> Result<String, NotificationError> {
    Ok(attribute_value(entity, name)?
        .as_str()
        .ok_or_else(|| NotificationError::MalformedAttribute {
            name: name.to_string(),
            expected: "a string value",
        })?
        .to_string())
}

fn number_attribute(entity: &Value, name: &str) -> Result<f64, NotificationError> {
    attribute_value(entity, name)?
        .as_f64()
        .ok_or_else(|| NotificationError::MalformedAttribute {
            name: name.to_string(),
            expected: "a numeric value",
        })
}
