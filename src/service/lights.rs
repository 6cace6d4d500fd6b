//! Bulk light and switch operations

use super::BridgeService;
use crate::dispatch::{perform_group, DeviceAction, GroupOutcome};
use crate::translate::DeviceType;
use tracing::info;

impl BridgeService {
    async fn light_ids(&self, label_filter: Option<&str>) -> Vec<String> {
        self.filtered_ids(label_filter, DeviceType::is_light_like)
            .await
    }

    async fn bulk_light_action(
        &self,
        action: DeviceAction,
        label_filter: Option<&str>,
    ) -> GroupOutcome {
        let ids = self.light_ids(label_filter).await;
        info!(
            action = %action,
            lights = ids.len(),
            filter = label_filter.unwrap_or(""),
            "Bulk light action"
        );
        let outcome = perform_group(self.coordinator(), &ids, action, None).await;
        info!(action = %action, %outcome, "Bulk light action completed");
        outcome
    }

    /// Turn on every light and switch, optionally filtered by label substring
    pub async fn turn_on_all_lights(&self, label_filter: Option<&str>) -> GroupOutcome {
        self.bulk_light_action(DeviceAction::TurnOn, label_filter)
            .await
    }

    /// Turn off every light and switch, optionally filtered by label substring
    pub async fn turn_off_all_lights(&self, label_filter: Option<&str>) -> GroupOutcome {
        self.bulk_light_action(DeviceAction::TurnOff, label_filter)
            .await
    }
}
