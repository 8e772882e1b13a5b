//! Immutable process configuration for the bridge daemon

use thiserror::Error;

/// Environment variable naming the broker base URL.
pub const ORION_BROKER_URL_VAR: &str = "ORION_BROKER_URL";
/// Environment variable carrying the bearer token for subscription calls.
pub const SUBSCRIBE_TOKEN_VAR: &str = "ORION_SUBSCRIBE_TOKEN";
/// Environment variable carrying the bearer token for entity writes.
pub const COMMAND_TOKEN_VAR: &str = "ORION_COMMAND_TOKEN";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    MissingEnvironment(&'static str),

    #[error("--command-entity must be set when movement orders are enabled (or pass --monitor-only)")]
    MissingCommandEntity,
}

/// Read a required environment variable.
pub fn require_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvironment(name))
}

/// Configuration for the bridge daemon, fixed for the process lifetime.
/// Constructed once in `main` and handed to every handler through the router
/// state; nothing mutates it after startup.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Base URL of the ORION broker, without a trailing slash
    pub orion_endpoint: String,
    /// NGSI-LD ID of the entity the bridge subscribes to
    pub entity_id: String,
    /// NGSI-LD ID of the entity movement orders are written to
    pub command_entity_id: Option<String>,
    /// Observe only, never write movement orders
    pub monitor_only: bool,
    /// Port for the hosted notification listener
    pub listen_port: u16,
    /// Publicly reachable base URI the broker delivers notifications to
    pub callback_base: String,
}

impl BridgeConfig {
    /// Validate and normalize the raw startup inputs. Commanding without a
    /// command entity is a startup error rather than a hard-coded fallback.
    pub fn new(
        orion_endpoint: String,
        entity_id: String,
        command_entity_id: Option<String>,
        monitor_only: bool,
        listen_port: u16,
        callback_base: String,
    ) -> Result<Self, ConfigError> {
        if !monitor_only && command_entity_id.is_none() {
            return Err(ConfigError::MissingCommandEntity);
        }
        Ok(Self {
            orion_endpoint: orion_endpoint.trim_end_matches('/').to_string(),
            entity_id,
            command_entity_id,
            monitor_only,
            listen_port,
            callback_base: callback_base.trim_end_matches('/').to_string(),
        })
    }

    /// The entity movement orders go to, `None` while monitoring only.
    pub fn command_target(&self) -> Option<&str> {
        if self.monitor_only {
            None
        } else {
            self.command_entity_id.as_deref()
        }
    }

    /// Full URI the broker posts notifications to.
    pub fn notify_uri(&self) -> String {
        format!("{}/car_update", self.callback_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(command_entity: Option<&str>, monitor_only: bool) -> Result<BridgeConfig, ConfigError> {
        BridgeConfig::new(
            "http://orion.example/".to_string(),
            "urn:ngsi-ld:vehicle:demo:1".to_string(),
            command_entity.map(str::to_string),
            monitor_only,
            8080,
            "http://203.0.113.7:8080/".to_string(),
        )
    }

    #[test]
    fn commanding_requires_a_command_entity() {
        assert_eq!(
            config(None, false).unwrap_err(),
            ConfigError::MissingCommandEntity
        );
        assert!(config(Some("urn:ngsi-ld:vehicle:demo:2"), false).is_ok());
    }

    #[test]
    fn monitor_only_needs_no_command_entity() {
        let cfg = config(None, true).unwrap();
        assert_eq!(cfg.command_target(), None);
    }

    #[test]
    fn monitor_only_masks_a_configured_command_entity() {
        let cfg = config(Some("urn:ngsi-ld:vehicle:demo:2"), true).unwrap();
        assert_eq!(cfg.command_target(), None);
    }

    #[test]
    fn urls_are_normalized() {
        let cfg = config(None, true).unwrap();
        assert_eq!(cfg.orion_endpoint, "http://orion.example");
        assert_eq!(cfg.notify_uri(), "http://203.0.113.7:8080/car_update");
    }
}
