//! Position-scale and device-type translation rules
//!
//! The host convention is 0 = fully closed, 100 = fully open; the vendor
//! convention is the complement (0 = open, 100 = closed). Every read and
//! every command crosses this boundary exactly once.

use crate::client::CapabilitySet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vendor-scale level at or above which a cover counts as closed
pub const CLOSED_THRESHOLD: u8 = 95;

/// Vendor-scale level at or below which a cover counts as open
pub const OPEN_THRESHOLD: u8 = 5;

const COVER_KEYWORDS: [&str; 4] = ["shutter", "blind", "curtain", "shade"];
const LIGHT_KEYWORDS: [&str; 3] = ["light", "lamp", "bulb"];
// The level-capability fallback matches a narrower cover list; "shade" only
// classifies by name, mirroring the vendor app.
const LEVEL_COVER_KEYWORDS: [&str; 3] = ["shutter", "blind", "curtain"];

/// Coarse device category used by all downstream consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Positionable cover (shutter, blind, curtain, shade)
    Shutter,
    /// Light, possibly dimmable
    Light,
    /// Plain on/off device
    Switch,
}

impl DeviceType {
    /// Stable lowercase name, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Shutter => "shutter",
            DeviceType::Light => "light",
            DeviceType::Switch => "switch",
        }
    }

    /// Whether this category is targeted by cover operations
    pub fn is_cover(&self) -> bool {
        matches!(self, DeviceType::Shutter)
    }

    /// Whether this category is targeted by light operations
    pub fn is_light_like(&self) -> bool {
        matches!(self, DeviceType::Light | DeviceType::Switch)
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse open/closed state of a level-capable cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutterState {
    Open,
    Closed,
    PartiallyOpen,
}

impl ShutterState {
    /// Classify a vendor-scale level against the fixed thresholds
    pub fn from_vendor_level(level: u8) -> Self {
        if level >= CLOSED_THRESHOLD {
            ShutterState::Closed
        } else if level <= OPEN_THRESHOLD {
            ShutterState::Open
        } else {
            ShutterState::PartiallyOpen
        }
    }
}

impl fmt::Display for ShutterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ShutterState::Open => "Open",
            ShutterState::Closed => "Closed",
            ShutterState::PartiallyOpen => "Partially Open",
        };
        f.write_str(label)
    }
}

/// Convert between host and vendor position scales
///
/// The scales are complements, so the same function maps both directions and
/// is its own inverse.
pub fn invert_position(position: u8) -> u8 {
    100 - position.min(100)
}

/// Round a vendor-scale value to the nearest multiple of 10
///
/// The vendor rejects anything else. Ties round to the even multiple
/// (45 -> 40, 55 -> 60).
pub fn round_to_ten(value: u8) -> u8 {
    let value = value.min(100);
    let tens = value / 10;
    match value % 10 {
        0..=4 => tens * 10,
        6..=9 => (tens + 1) * 10,
        _ => {
            if tens % 2 == 0 {
                tens * 10
            } else {
                (tens + 1) * 10
            }
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Infer the device category from its display name and capability set
///
/// The ordered fallback is deliberate and ends at `Switch` for anything
/// unmatched; see the record of decisions in DESIGN.md before changing it.
pub fn infer_device_type(name: &str, capabilities: CapabilitySet) -> DeviceType {
    let name = name.to_lowercase();

    if contains_any(&name, &COVER_KEYWORDS) {
        return DeviceType::Shutter;
    }

    if contains_any(&name, &LIGHT_KEYWORDS) {
        return DeviceType::Light;
    }

    if capabilities.level {
        if contains_any(&name, &LEVEL_COVER_KEYWORDS) {
            return DeviceType::Shutter;
        }
        return DeviceType::Light;
    }

    if capabilities.on_off {
        return DeviceType::Switch;
    }

    DeviceType::Switch
}
