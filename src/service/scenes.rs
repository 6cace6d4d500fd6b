//! Scene command operations

use super::BridgeService;
use crate::dispatch::GroupOutcome;
use crate::error::{HomismartError, Result};
use crate::scenes::{apply, capture, CaptureOptions, Scene};
use tracing::info;

impl BridgeService {
    /// Capture the current device states as a named scene and persist it
    pub async fn create_scene(&self, name: &str, options: &CaptureOptions) -> Result<Scene> {
        if name.trim().is_empty() {
            return Err(HomismartError::invalid_input("Scene name must not be empty"));
        }

        let snapshot = self.coordinator().snapshot().await;
        let scene = capture(&snapshot, name, options);
        self.scene_store().save(&scene).await?;

        info!(scene = name, devices = scene.devices.len(), "Scene created");
        Ok(scene)
    }

    /// Replay a stored scene; an unknown name is a validation error
    pub async fn activate_scene(&self, name: &str) -> Result<GroupOutcome> {
        let scene = self
            .scene_store()
            .load(name)
            .await?
            .ok_or_else(|| HomismartError::scene_not_found(name))?;

        let succeeded = apply(self.coordinator(), &scene).await;
        let outcome = GroupOutcome {
            total: scene.devices.len(),
            succeeded,
        };

        info!(scene = name, %outcome, "Scene activated");
        Ok(outcome)
    }
}
