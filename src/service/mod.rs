//! Upward-facing command surface
//!
//! Group control, bulk cover/light operations with an optional label filter,
//! and the scene commands. Bulk operations are best-effort and report
//! "N/M succeeded".

pub mod covers;
pub mod lights;
pub mod scenes;

use crate::coordinator::Coordinator;
use crate::dispatch::{perform_group, DeviceAction, GroupOutcome};
use crate::error::{HomismartError, Result};
use crate::scenes::SceneStore;
use crate::translate::DeviceType;
use std::sync::Arc;
use tracing::info;

/// Ties the coordinator and scene store together behind the command intents
#[derive(Debug)]
pub struct BridgeService {
    coordinator: Arc<Coordinator>,
    scene_store: SceneStore,
}

impl BridgeService {
    /// Create the service over a running coordinator
    pub fn new(coordinator: Arc<Coordinator>, scene_store: SceneStore) -> Self {
        Self {
            coordinator,
            scene_store,
        }
    }

    /// The underlying coordinator
    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    /// The underlying scene store
    pub fn scene_store(&self) -> &SceneStore {
        &self.scene_store
    }

    /// Perform one action on an explicit list of device ids
    pub async fn control_group(
        &self,
        device_ids: &[String],
        action: DeviceAction,
        position: Option<u8>,
    ) -> Result<GroupOutcome> {
        validate_position(position)?;
        if action.requires_position() && position.is_none() {
            return Err(HomismartError::invalid_input(
                "set_position requires a position",
            ));
        }

        info!(action = %action, devices = device_ids.len(), "Group control requested");
        let outcome = perform_group(&self.coordinator, device_ids, action, position).await;
        info!(action = %action, %outcome, "Group control completed");
        Ok(outcome)
    }

    /// Ids of snapshot devices matching a category predicate and an optional
    /// case-insensitive label filter
    pub(crate) async fn filtered_ids(
        &self,
        label_filter: Option<&str>,
        matches: impl Fn(&DeviceType) -> bool,
    ) -> Vec<String> {
        let snapshot = self.coordinator.snapshot().await;
        snapshot
            .iter()
            .filter(|record| matches(&record.device_type))
            .filter(|record| {
                label_filter
                    .map(|filter| record.matches_label(filter))
                    .unwrap_or(true)
            })
            .map(|record| record.id.clone())
            .collect()
    }
}

pub(crate) fn validate_position(position: Option<u8>) -> Result<()> {
    if let Some(position) = position {
        if position > 100 {
            return Err(HomismartError::invalid_input(format!(
                "Position must be between 0-100, got {position}"
            )));
        }
    }
    Ok(())
}
