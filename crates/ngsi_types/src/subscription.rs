//! Subscription descriptor sent to the ORION broker at startup

use serde::{Deserialize, Serialize};

/// Identifier the broker keys the standing subscription by. Re-registering
/// under the same id is deduplicated or rejected broker-side.
pub const SUBSCRIPTION_ID: &str = "urn:aeros:subscription:vehicle:controller";

/// NGSI-LD type of the watched entity.
pub const VEHICLE_ENTITY_TYPE: &str = "Vehicle";

/// Attributes whose changes trigger a notification.
pub const WATCHED_ATTRIBUTES: &[&str] = &["location", "direction", "serviceStatus"];

/// Attributes the broker includes in each delivered notification. Must stay a
/// superset of [`crate::notification::OBSERVED_ATTRIBUTES`], otherwise the
/// handler rejects every delivery for missing fields.
pub const NOTIFIED_ATTRIBUTES: &[&str] = &[
    "location",
    "move",
    "direction",
    "serviceStatus",
    "signalQuality",
    "speed",
    "heading",
];

/// Minimum seconds the broker waits between deliveries.
pub const THROTTLING_SECONDS: u32 = 1;

/// An NGSI-LD subscription document, shaped exactly as the broker's
/// `POST /subscriptions/` endpoint expects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub description: String,
    #[serde(rename = "type")]
    pub subscription_type: String,
    pub entities: Vec<EntitySelector>,
    #[serde(rename = "watchedAttributes")]
    pub watched_attributes: Vec<String>,
    pub notification: NotificationParams,
    pub throttling: u32,
}

/// Selects which entities the subscription covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySelector {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
}

/// What the broker delivers and where.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationParams {
    pub attributes: Vec<String>,
    pub endpoint: NotificationEndpoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEndpoint {
    pub uri: String,
    pub accept: String,
}

impl Subscription {
    /// Build the vehicle controller subscription for one entity, delivering
    /// notifications to `notify_uri`.
    pub fn for_vehicle(entity_id: &str, notify_uri: &str) -> Self {
        Self {
            id: SUBSCRIPTION_ID.to_string(),
            description: "Subscription to Vehicle entity type".to_string(),
            subscription_type: "Subscription".to_string(),
            entities: vec![EntitySelector {
                id: entity_id.to_string(),
                entity_type: VEHICLE_ENTITY_TYPE.to_string(),
            }],
            watched_attributes: WATCHED_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
            notification: NotificationParams {
                attributes: NOTIFIED_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
                endpoint: NotificationEndpoint {
                    uri: notify_uri.to_string(),
                    accept: "application/json".to_string(),
                },
            },
            throttling: THROTTLING_SECONDS,
        }
    }
}
