//! Bulk cover operations

use super::{validate_position, BridgeService};
use crate::dispatch::{perform_group, DeviceAction, GroupOutcome};
use crate::error::Result;
use crate::translate::DeviceType;
use tracing::info;

impl BridgeService {
    async fn cover_ids(&self, label_filter: Option<&str>) -> Vec<String> {
        self.filtered_ids(label_filter, DeviceType::is_cover).await
    }

    async fn bulk_cover_action(
        &self,
        action: DeviceAction,
        position: Option<u8>,
        label_filter: Option<&str>,
    ) -> GroupOutcome {
        let ids = self.cover_ids(label_filter).await;
        info!(
            action = %action,
            covers = ids.len(),
            filter = label_filter.unwrap_or(""),
            "Bulk cover action"
        );
        let outcome = perform_group(self.coordinator(), &ids, action, position).await;
        info!(action = %action, %outcome, "Bulk cover action completed");
        outcome
    }

    /// Open every cover, optionally filtered by label substring
    pub async fn open_all_covers(&self, label_filter: Option<&str>) -> GroupOutcome {
        self.bulk_cover_action(DeviceAction::Open, None, label_filter)
            .await
    }

    /// Close every cover, optionally filtered by label substring
    pub async fn close_all_covers(&self, label_filter: Option<&str>) -> GroupOutcome {
        self.bulk_cover_action(DeviceAction::Close, None, label_filter)
            .await
    }

    /// Stop every cover, optionally filtered by label substring
    pub async fn stop_all_covers(&self, label_filter: Option<&str>) -> GroupOutcome {
        self.bulk_cover_action(DeviceAction::Stop, None, label_filter)
            .await
    }

    /// Move every cover to a host-scale position
    pub async fn set_covers_position(
        &self,
        position: u8,
        label_filter: Option<&str>,
    ) -> Result<GroupOutcome> {
        validate_position(Some(position))?;
        Ok(self
            .bulk_cover_action(DeviceAction::SetPosition, Some(position), label_filter)
            .await)
    }
}
