//! Outbound client for the ORION context broker

use std::time::Duration;

use http::StatusCode;
use ngsi_types::Subscription;
use serde::Serialize;
use thiserror::Error;

/// Marker header the broker expects on every call.
pub const MARKER_HEADER: &str = "aerOS";

/// Round-trip budget for broker calls. A hung broker connection fails the one
/// affected request instead of wedging the handler forever.
const BROKER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum OrionError {
    #[error("broker request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("subscription failed: {status} - {body}")]
    SubscriptionRejected { status: StatusCode, body: String },

    #[error("no command credential configured")]
    MissingCommandToken,
}

/// HTTP client for the broker's subscription and entity-write endpoints.
/// Subscribing and writing use distinct bearer credentials; the command token
/// is absent on monitor-only runs.
pub struct OrionClient {
    http: reqwest::Client,
    endpoint: String,
    subscribe_token: String,
    command_token: Option<String>,
}

impl OrionClient {
    pub fn new(
        endpoint: &str,
        subscribe_token: String,
        command_token: Option<String>,
    ) -> Result<Self, OrionError> {
        let http = reqwest::Client::builder()
            .timeout(BROKER_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            subscribe_token,
            command_token,
        })
    }

    /// Register the standing subscription. The broker answers 201 on success;
    /// anything else is fatal to startup, so it surfaces as an error with the
    /// broker's status and body attached.
    pub async fn subscribe(&self, subscription: &Subscription) -> Result<(), OrionError> {
        // Subscriptions live outside the ngsi-ld/v1 prefix on this broker.
        let url = format!("{}/subscriptions/", self.endpoint);
        let response = self
            .http
            .post(&url)
            .header(MARKER_HEADER, "true")
            .bearer_auth(&self.subscribe_token)
            .json(subscription)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(OrionError::SubscriptionRejected { status, body });
        }
        Ok(())
    }

    /// Overwrite attributes on an entity. 204 is success; any other status is
    /// logged as a warning and handed back to the caller, who carries on.
    pub async fn write_attrs<T: Serialize + ?Sized>(
        &self,
        entity_id: &str,
        attributes: &T,
    ) -> Result<StatusCode, OrionError> {
        let token = self
            .command_token
            .as_ref()
            .ok_or(OrionError::MissingCommandToken)?;
        let url = format!("{}/ngsi-ld/v1/entities/{}/", self.endpoint, entity_id);
        let response = self
            .http
            .patch(&url)
            .header(MARKER_HEADER, "true")
            .bearer_auth(token)
            .json(attributes)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "Non-204 code returned from entity write");
        }
        Ok(status)
    }
}
