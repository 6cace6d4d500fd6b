//! Scene capture, persistence and replay
//!
//! A scene is a named snapshot of selected device states, stored host-scale
//! in a single JSON document keyed by scene name. Saving is read-merge-write
//! through a temp file and rename, so a failed persist can never corrupt
//! scenes that were already stored.

use crate::coordinator::{Coordinator, DeviceSnapshot};
use crate::error::{HomismartError, Result};
use crate::translate::{invert_position, DeviceType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

/// Captured state of one device inside a scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDeviceState {
    /// Device id at capture time
    pub id: String,

    /// Display label at capture time
    pub label: String,

    /// Inferred category at capture time
    #[serde(rename = "type")]
    pub device_type: DeviceType,

    /// Host-scale position (0 = closed, 100 = open), covers only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u8>,

    /// On/off state, binary devices only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<bool>,

    /// Brightness 0-100, dimmable lights only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
}

/// A named, persisted set of target device states
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Unique scene name, also the storage key
    pub name: String,

    /// Capture timestamp
    pub created: DateTime<Utc>,

    /// Captured device states, in snapshot order
    pub devices: Vec<SceneDeviceState>,
}

/// Selection options for scene capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureOptions {
    /// Include shutter devices
    pub include_covers: bool,

    /// Include light and switch devices
    pub include_lights: bool,

    /// Case-insensitive label substring filter
    pub label_filter: Option<String>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            include_covers: true,
            include_lights: true,
            label_filter: None,
        }
    }
}

/// Capture a scene from the current snapshot
///
/// Covers record their position converted to host scale; lights and switches
/// record on/off, plus brightness when the device is dimmable.
pub fn capture(snapshot: &DeviceSnapshot, name: &str, options: &CaptureOptions) -> Scene {
    let mut devices = Vec::new();

    for record in snapshot.iter() {
        if let Some(filter) = &options.label_filter {
            if !record.matches_label(filter) {
                continue;
            }
        }

        match record.device_type {
            DeviceType::Shutter if options.include_covers => {
                let vendor_level = record.current_level.unwrap_or(0);
                devices.push(SceneDeviceState {
                    id: record.id.clone(),
                    label: record.label.clone(),
                    device_type: record.device_type,
                    position: Some(invert_position(vendor_level)),
                    state: None,
                    brightness: None,
                });
            }
            DeviceType::Light | DeviceType::Switch if options.include_lights => {
                let brightness = (record.device_type == DeviceType::Light)
                    .then(|| record.current_level)
                    .flatten();
                devices.push(SceneDeviceState {
                    id: record.id.clone(),
                    label: record.label.clone(),
                    device_type: record.device_type,
                    position: None,
                    state: Some(record.is_on()),
                    brightness,
                });
            }
            _ => {}
        }
    }

    Scene {
        name: name.to_string(),
        created: Utc::now(),
        devices,
    }
}

/// Replay a scene through the coordinator, returning the success count
///
/// Covers replay via `set_cover_position` (the host-scale position is
/// re-inverted there); binary devices replay via turn on/off. Brightness
/// replay is not supported and is skipped with a warning.
pub async fn apply(coordinator: &Coordinator, scene: &Scene) -> usize {
    let mut succeeded = 0;

    for device in &scene.devices {
        let success = match device.device_type {
            DeviceType::Shutter => {
                let position = device.position.unwrap_or(0);
                coordinator.set_cover_position(&device.id, position).await
            }
            DeviceType::Light | DeviceType::Switch => {
                if device.state.unwrap_or(false) {
                    let success = coordinator.turn_on_device(&device.id).await;
                    if success && device.brightness.is_some() {
                        warn!(
                            device = %device.id,
                            "Brightness replay is not supported; device turned on only"
                        );
                    }
                    success
                } else {
                    coordinator.turn_off_device(&device.id).await
                }
            }
        };

        if success {
            succeeded += 1;
        } else {
            error!(device = %device.id, scene = %scene.name, "Failed to apply scene state");
        }
    }

    succeeded
}

/// File-backed scene storage: one JSON document keyed by scene name
#[derive(Debug, Clone)]
pub struct SceneStore {
    path: PathBuf,
}

impl SceneStore {
    /// Create a store backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole scene document; a missing or empty file is an empty map
    pub async fn load_all(&self) -> Result<HashMap<String, Scene>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(HomismartError::scene_storage(format!(
                    "Failed to read scenes file: {e}"
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        let scenes: HashMap<String, Scene> = serde_json::from_str(&content).map_err(|e| {
            HomismartError::scene_storage(format!("Failed to parse scenes file: {e}"))
        })?;

        debug!(count = scenes.len(), "Loaded scenes from file");
        Ok(scenes)
    }

    /// Load one scene by name
    pub async fn load(&self, name: &str) -> Result<Option<Scene>> {
        Ok(self.load_all().await?.remove(name))
    }

    /// Merge one scene into the document; re-saving a name overwrites only
    /// that entry
    ///
    /// If the existing document cannot be read the save is aborted rather
    /// than clobbering stored scenes with a partial view.
    pub async fn save(&self, scene: &Scene) -> Result<()> {
        let mut scenes = self.load_all().await?;
        scenes.insert(scene.name.clone(), scene.clone());
        self.save_all(&scenes).await?;
        info!(scene = %scene.name, devices = scene.devices.len(), "Scene saved");
        Ok(())
    }

    async fn save_all(&self, scenes: &HashMap<String, Scene>) -> Result<()> {
        let json = serde_json::to_string_pretty(scenes).map_err(|e| {
            HomismartError::scene_storage(format!("Failed to serialize scenes: {e}"))
        })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                HomismartError::scene_storage(format!("Failed to create scenes directory: {e}"))
            })?;
        }

        // Write to a temp file first, then rename, so a failed write never
        // leaves a truncated document behind.
        let temp_file = self.path.with_extension("tmp");

        fs::write(&temp_file, json).await.map_err(|e| {
            HomismartError::scene_storage(format!("Failed to write temp scenes file: {e}"))
        })?;

        fs::rename(&temp_file, &self.path).await.map_err(|e| {
            HomismartError::scene_storage(format!("Failed to move temp scenes file: {e}"))
        })?;

        debug!(count = scenes.len(), "Saved scenes to file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CapabilitySet;
    use crate::coordinator::DeviceRecord;
    use crate::mock::MockDevice;
    use std::sync::Arc;

    fn snapshot_of(devices: Vec<Arc<MockDevice>>) -> DeviceSnapshot {
        DeviceSnapshot {
            records: devices
                .into_iter()
                .map(|d| DeviceRecord::from_handle(d))
                .collect(),
            refreshed_at: Utc::now(),
        }
    }

    fn mixed_devices() -> Vec<Arc<MockDevice>> {
        vec![
            Arc::new(
                MockDevice::new("Living Room Shutter")
                    .with_capabilities(CapabilitySet::none().with_level().with_stop())
                    .with_current_level(70),
            ),
            Arc::new(
                MockDevice::new("Kitchen Lamp")
                    .with_capabilities(CapabilitySet::none().with_on_off())
                    .with_is_on(true),
            ),
            Arc::new(
                MockDevice::new("Generic Plug")
                    .with_capabilities(CapabilitySet::none().with_on_off())
                    .with_is_on(false),
            ),
        ]
    }

    #[test]
    fn test_capture_records_host_scale_positions() {
        let snapshot = snapshot_of(mixed_devices());
        let scene = capture(&snapshot, "evening", &CaptureOptions::default());

        assert_eq!(scene.devices.len(), 3);
        let shutter = &scene.devices[0];
        assert_eq!(shutter.device_type, DeviceType::Shutter);
        // Vendor 70 is host 30
        assert_eq!(shutter.position, Some(30));
        assert_eq!(shutter.state, None);

        let lamp = &scene.devices[1];
        assert_eq!(lamp.state, Some(true));
        assert_eq!(lamp.position, None);
    }

    #[test]
    fn test_capture_covers_only() {
        let snapshot = snapshot_of(mixed_devices());
        let options = CaptureOptions {
            include_covers: true,
            include_lights: false,
            label_filter: None,
        };
        let scene = capture(&snapshot, "covers", &options);

        assert_eq!(scene.devices.len(), 1);
        assert!(scene.devices.iter().all(|d| d.device_type.is_cover()));
    }

    #[test]
    fn test_capture_label_filter_is_case_insensitive() {
        let snapshot = snapshot_of(mixed_devices());
        let options = CaptureOptions {
            label_filter: Some("kitchen".to_string()),
            ..CaptureOptions::default()
        };
        let scene = capture(&snapshot, "kitchen", &options);

        assert_eq!(scene.devices.len(), 1);
        assert_eq!(scene.devices[0].label, "Kitchen Lamp");
    }

    #[test]
    fn test_capture_dimmable_light_records_brightness() {
        let snapshot = snapshot_of(vec![Arc::new(
            MockDevice::new("Desk Lamp")
                .with_capabilities(CapabilitySet::none().with_level())
                .with_current_level(40),
        )]);
        let scene = capture(&snapshot, "desk", &CaptureOptions::default());

        assert_eq!(scene.devices.len(), 1);
        let lamp = &scene.devices[0];
        assert_eq!(lamp.device_type, DeviceType::Light);
        assert_eq!(lamp.brightness, Some(40));
        // Level above zero counts as on
        assert_eq!(lamp.state, Some(true));
    }
}
