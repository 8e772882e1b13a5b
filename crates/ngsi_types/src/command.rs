//! Command payload written back to the broker

use serde::{Deserialize, Serialize};

/// Heading written with every movement order.
pub const COMMAND_HEADING: &str = "36.0 degrees";

/// A movement order, PATCHed onto the command entity as a plain
/// attribute-to-value mapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleCommand {
    pub heading: String,
    #[serde(rename = "move")]
    pub moving: bool,
}

impl VehicleCommand {
    /// The fixed order issued in response to every notification: keep moving
    /// on the configured heading.
    pub fn advance() -> Self {
        Self {
            heading: COMMAND_HEADING.to_string(),
            moving: true,
        }
    }
}
