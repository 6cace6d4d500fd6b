//! Semantic device actions and single/group dispatch
//!
//! Every upward surface funnels through [`perform_action`]: actions map to
//! the coordinator's typed commands, provider failures come back as a plain
//! `false`, and group dispatch is best-effort with no rollback.

use crate::coordinator::Coordinator;
use crate::error::HomismartError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::error;

/// A user-facing command intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceAction {
    /// Move a cover fully open (host position 100)
    Open,
    /// Move a cover fully closed (host position 0)
    Close,
    /// Stop an in-flight movement
    Stop,
    /// Move to an explicit host-scale position
    SetPosition,
    /// Switch on
    TurnOn,
    /// Switch off
    TurnOff,
}

impl DeviceAction {
    /// Stable snake_case name, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceAction::Open => "open",
            DeviceAction::Close => "close",
            DeviceAction::Stop => "stop",
            DeviceAction::SetPosition => "set_position",
            DeviceAction::TurnOn => "turn_on",
            DeviceAction::TurnOff => "turn_off",
        }
    }

    /// Whether this action needs a position argument
    pub fn requires_position(&self) -> bool {
        matches!(self, DeviceAction::SetPosition)
    }
}

impl fmt::Display for DeviceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceAction {
    type Err = HomismartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(DeviceAction::Open),
            "close" => Ok(DeviceAction::Close),
            "stop" => Ok(DeviceAction::Stop),
            "set_position" => Ok(DeviceAction::SetPosition),
            "turn_on" => Ok(DeviceAction::TurnOn),
            "turn_off" => Ok(DeviceAction::TurnOff),
            other => Err(HomismartError::invalid_input(format!(
                "Unknown action: {other}"
            ))),
        }
    }
}

/// Outcome of a best-effort bulk operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOutcome {
    /// Devices attempted
    pub total: usize,
    /// Devices that reported success
    pub succeeded: usize,
}

impl GroupOutcome {
    /// Record one per-device result
    pub fn record(&mut self, success: bool) {
        self.total += 1;
        if success {
            self.succeeded += 1;
        }
    }

    /// Whether every attempted device succeeded
    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }
}

impl fmt::Display for GroupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.succeeded, self.total)
    }
}

/// Perform one semantic action against one device
///
/// Never raises: unknown devices, unsupported capabilities and provider
/// failures all come back as `false` after being logged.
pub async fn perform_action(
    coordinator: &Coordinator,
    device_id: &str,
    action: DeviceAction,
    position: Option<u8>,
) -> bool {
    match action {
        DeviceAction::Open => coordinator.set_cover_position(device_id, 100).await,
        DeviceAction::Close => coordinator.set_cover_position(device_id, 0).await,
        DeviceAction::Stop => coordinator.stop_cover(device_id).await,
        DeviceAction::SetPosition => match position {
            Some(position) => coordinator.set_cover_position(device_id, position).await,
            None => {
                error!(device = device_id, "set_position requires a position");
                false
            }
        },
        DeviceAction::TurnOn => coordinator.turn_on_device(device_id).await,
        DeviceAction::TurnOff => coordinator.turn_off_device(device_id).await,
    }
}

/// Perform one action against a list of devices, sequentially
///
/// Partial failure never cancels the remaining devices.
pub async fn perform_group(
    coordinator: &Coordinator,
    device_ids: &[String],
    action: DeviceAction,
    position: Option<u8>,
) -> GroupOutcome {
    let mut outcome = GroupOutcome::default();
    for device_id in device_ids {
        let success = perform_action(coordinator, device_id, action, position).await;
        outcome.record(success);
    }
    outcome
}
