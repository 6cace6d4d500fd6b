//! Client boundary for the HomiSmart cloud session and its device handles
//!
//! The vendor library owns connection, authentication and transport; this
//! module defines the traits the rest of the bridge consumes it through,
//! plus the shared value types crossing that boundary.

use crate::error::{HomismartError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the push-event channel; refreshes are cheap, so lagging
/// receivers may safely drop events.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Operations a device handle may support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Position or brightness level control (0-100, vendor scale)
    Level,
    /// Binary on/off control
    OnOff,
    /// Stop an in-flight movement
    Stop,
}

/// The set of capabilities a device handle exposes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    /// Supports `set_level`
    pub level: bool,
    /// Supports `turn_on`/`turn_off`
    pub on_off: bool,
    /// Supports `stop`
    pub stop: bool,
}

impl CapabilitySet {
    /// Empty capability set
    pub const fn none() -> Self {
        Self {
            level: false,
            on_off: false,
            stop: false,
        }
    }

    /// Add level control
    pub const fn with_level(mut self) -> Self {
        self.level = true;
        self
    }

    /// Add on/off control
    pub const fn with_on_off(mut self) -> Self {
        self.on_off = true;
        self
    }

    /// Add stop control
    pub const fn with_stop(mut self) -> Self {
        self.stop = true;
        self
    }

    /// Check whether a capability is present
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Level => self.level,
            Capability::OnOff => self.on_off,
            Capability::Stop => self.stop,
        }
    }
}

/// Push notification emitted by the vendor session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum DeviceEvent {
    /// A device reported new state
    DeviceUpdated {
        /// Display name of the device that changed
        name: String,
    },
}

/// One live vendor device
///
/// Telemetry accessors are plain passthrough of whatever the vendor session
/// last saw; command methods default to an unsupported error so adapters only
/// implement what the physical device can do. `set_level` expects a
/// vendor-scale value (0 = open/off, 100 = closed/full) that is already a
/// multiple of 10.
#[async_trait]
pub trait DeviceHandle: Send + Sync {
    /// Display name, also the basis for the derived record id
    fn name(&self) -> &str;

    /// Capabilities this device supports
    fn capabilities(&self) -> CapabilitySet;

    /// Reachability flag, when the vendor reports one
    fn online(&self) -> Option<bool> {
        None
    }

    /// Current level in vendor scale
    fn current_level(&self) -> Option<u8> {
        None
    }

    /// Target level in vendor scale
    fn target_level(&self) -> Option<u8> {
        None
    }

    /// Vendor-reported curtain state string
    fn curtain_state(&self) -> Option<String> {
        None
    }

    /// Binary on/off state
    fn is_on(&self) -> Option<bool> {
        None
    }

    /// Battery percentage
    fn battery(&self) -> Option<u8> {
        None
    }

    /// Signal strength in dB
    fn rssi(&self) -> Option<i32> {
        None
    }

    /// Last successful communication with the device
    fn last_communication(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Move to a vendor-scale level
    async fn set_level(&self, _level: u8) -> Result<()> {
        Err(HomismartError::unsupported(format!(
            "{} does not support level control",
            self.name()
        )))
    }

    /// Switch the device on
    async fn turn_on(&self) -> Result<()> {
        Err(HomismartError::unsupported(format!(
            "{} does not support on/off control",
            self.name()
        )))
    }

    /// Switch the device off
    async fn turn_off(&self) -> Result<()> {
        Err(HomismartError::unsupported(format!(
            "{} does not support on/off control",
            self.name()
        )))
    }

    /// Stop an in-flight movement
    async fn stop(&self) -> Result<()> {
        Err(HomismartError::unsupported(format!(
            "{} does not support stop",
            self.name()
        )))
    }
}

/// Trait for HomiSmart session implementations
#[async_trait]
pub trait HomismartClient: Send + Sync {
    /// Establish the cloud session
    async fn connect(&self) -> Result<()>;

    /// Check if the session is established
    async fn is_connected(&self) -> bool;

    /// Close the session; must be safe to call more than once
    async fn close(&self) -> Result<()>;

    /// All devices the session currently knows about
    async fn devices(&self) -> Result<Vec<Arc<dyn DeviceHandle>>>;

    /// Subscribe to push notifications
    fn subscribe(&self) -> broadcast::Receiver<DeviceEvent>;
}
