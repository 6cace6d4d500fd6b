//! Service surface tests: bulk operations, label filtering and group control
//! validation.

mod common;

use common::*;
use homismart_bridge::scenes::SceneStore;
use homismart_bridge::{BridgeService, DeviceAction, HomismartError};
use std::sync::Arc;
use tempfile::TempDir;

async fn test_service() -> (BridgeService, Vec<Arc<homismart_bridge::mock::MockDevice>>, TempDir) {
    let devices = test_devices();
    let coordinator = ready_coordinator(client_with(&devices)).await;
    let dir = TempDir::new().expect("temp dir");
    let service = BridgeService::new(coordinator, SceneStore::new(dir.path().join("scenes.json")));
    (service, devices, dir)
}

#[tokio::test]
async fn test_open_all_covers_targets_covers_only() {
    let (service, devices, _dir) = test_service().await;

    let outcome = service.open_all_covers(None).await;
    assert_eq!(outcome.total, 2);
    assert!(outcome.all_succeeded());

    // Open is host 100 -> vendor 0
    assert_eq!(devices[0].commands(), vec!["set_level:0"]);
    assert_eq!(devices[1].commands(), vec!["set_level:0"]);
    // Lights and switches are untouched
    assert!(devices[2].commands().is_empty());
    assert!(devices[4].commands().is_empty());
}

#[tokio::test]
async fn test_close_all_covers_sends_full_vendor_level() {
    let (service, devices, _dir) = test_service().await;

    let outcome = service.close_all_covers(None).await;
    assert_eq!(outcome.to_string(), "2/2");
    assert_eq!(devices[0].commands(), vec!["set_level:100"]);
}

#[tokio::test]
async fn test_stop_all_covers_reports_partial_support() {
    let (service, devices, _dir) = test_service().await;

    // Only the shutter supports stop; the level-only blind fails
    let outcome = service.stop_all_covers(None).await;
    assert_eq!(outcome.total, 2);
    assert_eq!(outcome.succeeded, 1);
    assert_eq!(devices[0].commands(), vec!["stop"]);
}

#[tokio::test]
async fn test_label_filter_narrows_bulk_targets() {
    let (service, devices, _dir) = test_service().await;

    let outcome = service.open_all_covers(Some("living")).await;
    assert_eq!(outcome.total, 1);
    assert_eq!(devices[0].commands(), vec!["set_level:0"]);
    assert!(devices[1].commands().is_empty());
}

#[tokio::test]
async fn test_set_covers_position_validates_and_rounds() {
    let (service, devices, _dir) = test_service().await;

    assert!(matches!(
        service.set_covers_position(130, None).await,
        Err(HomismartError::InvalidInput(_))
    ));

    // Host 45 -> vendor 55 -> tie rounds to 60
    let outcome = service.set_covers_position(45, None).await.expect("bulk set");
    assert_eq!(outcome.total, 2);
    assert_eq!(devices[0].commands(), vec!["set_level:60"]);
}

#[tokio::test]
async fn test_turn_on_all_lights_includes_switches_and_dimmers() {
    let (service, devices, _dir) = test_service().await;

    let outcome = service.turn_on_all_lights(None).await;
    // Kitchen Lamp, Desk Lamp and Garden Plug
    assert_eq!(outcome.total, 3);
    assert!(outcome.all_succeeded());

    assert_eq!(devices[2].commands(), vec!["turn_on"]);
    // Level-only lamp turns on via full level
    assert_eq!(devices[3].commands(), vec!["set_level:100"]);
    assert_eq!(devices[4].commands(), vec!["turn_on"]);
    // Covers are untouched
    assert!(devices[0].commands().is_empty());
}

#[tokio::test]
async fn test_turn_off_all_lights_with_filter() {
    let (service, devices, _dir) = test_service().await;

    let outcome = service.turn_off_all_lights(Some("garden")).await;
    assert_eq!(outcome.total, 1);
    assert_eq!(devices[4].commands(), vec!["turn_off"]);
    assert!(devices[2].commands().is_empty());
}

#[tokio::test]
async fn test_control_group_mixed_ids() {
    let (service, devices, _dir) = test_service().await;

    let ids = vec![
        "Kitchen Lamp".to_string(),
        "Unknown Device".to_string(),
        "Garden Plug".to_string(),
    ];
    let outcome = service
        .control_group(&ids, DeviceAction::TurnOn, None)
        .await
        .expect("group control");

    assert_eq!(outcome.total, 3);
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(devices[2].commands(), vec!["turn_on"]);
    assert_eq!(devices[4].commands(), vec!["turn_on"]);
}

#[tokio::test]
async fn test_control_group_validates_arguments() {
    let (service, _devices, _dir) = test_service().await;
    let ids = vec!["Living Room Shutter".to_string()];

    assert!(matches!(
        service
            .control_group(&ids, DeviceAction::SetPosition, Some(101))
            .await,
        Err(HomismartError::InvalidInput(_))
    ));

    assert!(matches!(
        service
            .control_group(&ids, DeviceAction::SetPosition, None)
            .await,
        Err(HomismartError::InvalidInput(_))
    ));

    let outcome = service
        .control_group(&ids, DeviceAction::SetPosition, Some(50))
        .await
        .expect("valid group control");
    assert!(outcome.all_succeeded());
}
