//! Scene store integration tests: persistence, merge semantics and the
//! capture/replay round trip.

mod common;

use chrono::Utc;
use common::*;
use homismart_bridge::scenes::{self, CaptureOptions, Scene, SceneDeviceState, SceneStore};
use homismart_bridge::{BridgeService, DeviceType, HomismartError};
use std::sync::Arc;
use tempfile::TempDir;

fn temp_store() -> (SceneStore, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let store = SceneStore::new(dir.path().join("scenes.json"));
    (store, dir)
}

fn scene_named(name: &str) -> Scene {
    Scene {
        name: name.to_string(),
        created: Utc::now(),
        devices: vec![SceneDeviceState {
            id: "Living Room Shutter".to_string(),
            label: "Living Room Shutter".to_string(),
            device_type: DeviceType::Shutter,
            position: Some(30),
            state: None,
            brightness: None,
        }],
    }
}

#[tokio::test]
async fn test_missing_file_is_empty_store() {
    let (store, _dir) = temp_store();
    assert!(store.load_all().await.expect("load").is_empty());
    assert!(store.load("anything").await.expect("load").is_none());
}

#[tokio::test]
async fn test_saving_two_scenes_keeps_both() {
    let (store, _dir) = temp_store();

    store.save(&scene_named("A")).await.expect("save A");
    store.save(&scene_named("B")).await.expect("save B");

    let all = store.load_all().await.expect("load all");
    assert_eq!(all.len(), 2);
    assert!(all.contains_key("A"));
    assert!(all.contains_key("B"));
}

#[tokio::test]
async fn test_resaving_overwrites_only_that_scene() {
    let (store, _dir) = temp_store();

    store.save(&scene_named("A")).await.expect("save A");
    store.save(&scene_named("B")).await.expect("save B");

    let mut replacement = scene_named("A");
    replacement.devices[0].position = Some(80);
    store.save(&replacement).await.expect("re-save A");

    let all = store.load_all().await.expect("load all");
    assert_eq!(all.len(), 2);
    assert_eq!(all["A"].devices[0].position, Some(80));
    assert_eq!(all["B"].devices[0].position, Some(30));
}

#[tokio::test]
async fn test_store_instances_share_the_document() {
    let (store, dir) = temp_store();
    store.save(&scene_named("A")).await.expect("save A");

    // A fresh instance over the same path merges rather than clobbers
    let second = SceneStore::new(store.path().to_path_buf());
    second.save(&scene_named("B")).await.expect("save B");

    let all = store.load_all().await.expect("load all");
    assert_eq!(all.len(), 2);
    drop(dir);
}

#[tokio::test]
async fn test_corrupted_document_aborts_save() {
    let (store, _dir) = temp_store();
    store.save(&scene_named("A")).await.expect("save A");

    tokio::fs::write(store.path(), "{not json").await.expect("corrupt");

    let err = store.save(&scene_named("B")).await.expect_err("save must fail");
    assert!(matches!(err, HomismartError::SceneStorage(_)));

    // The failed save did not touch the document
    let after = tokio::fs::read_to_string(store.path()).await.expect("read");
    assert_eq!(after, "{not json");
}

#[tokio::test]
async fn test_capture_persist_reload_apply_round_trip() {
    let devices = test_devices();
    let coordinator = ready_coordinator(client_with(&devices)).await;
    let (store, _dir) = temp_store();
    let service = BridgeService::new(Arc::clone(&coordinator), store);

    // The shutter sits at vendor 70, so the scene stores host 30
    let options = CaptureOptions {
        include_covers: true,
        include_lights: false,
        label_filter: None,
    };
    let scene = service.create_scene("evening", &options).await.expect("create");
    assert_eq!(scene.devices.len(), 2);
    assert!(scene.devices.iter().all(|d| d.device_type.is_cover()));
    assert_eq!(scene.devices[0].position, Some(30));

    // Replay sends vendor round_to_ten(100 - 30) = 70
    let outcome = service.activate_scene("evening").await.expect("activate");
    assert_eq!(outcome.total, 2);
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(devices[0].commands(), vec!["set_level:70"]);
    // Blind was captured at vendor 100 -> host 0 -> replayed as vendor 100
    assert_eq!(devices[1].commands(), vec!["set_level:100"]);
}

#[tokio::test]
async fn test_activate_unknown_scene_is_validation_error() {
    let coordinator = ready_coordinator(client_with(&test_devices())).await;
    let (store, _dir) = temp_store();
    let service = BridgeService::new(coordinator, store);

    let err = service.activate_scene("nope").await.expect_err("must fail");
    assert!(matches!(err, HomismartError::SceneNotFound(_)));
}

#[tokio::test]
async fn test_apply_replays_binary_devices() {
    let devices = test_devices();
    let coordinator = ready_coordinator(client_with(&devices)).await;

    let scene = Scene {
        name: "lights".to_string(),
        created: Utc::now(),
        devices: vec![
            SceneDeviceState {
                id: "Kitchen Lamp".to_string(),
                label: "Kitchen Lamp".to_string(),
                device_type: DeviceType::Light,
                position: None,
                state: Some(true),
                brightness: None,
            },
            SceneDeviceState {
                id: "Garden Plug".to_string(),
                label: "Garden Plug".to_string(),
                device_type: DeviceType::Switch,
                position: None,
                state: Some(false),
                brightness: None,
            },
        ],
    };

    let succeeded = scenes::apply(&coordinator, &scene).await;
    assert_eq!(succeeded, 2);
    assert_eq!(devices[2].commands(), vec!["turn_on"]);
    assert_eq!(devices[4].commands(), vec!["turn_off"]);
}

#[tokio::test]
async fn test_apply_counts_partial_failure() {
    let devices = test_devices();
    let coordinator = ready_coordinator(client_with(&devices)).await;

    let mut scene = scene_named("partial");
    scene.devices.push(SceneDeviceState {
        id: "Missing Device".to_string(),
        label: "Missing Device".to_string(),
        device_type: DeviceType::Switch,
        position: None,
        state: Some(true),
        brightness: None,
    });

    let succeeded = scenes::apply(&coordinator, &scene).await;
    assert_eq!(succeeded, 1);
}

#[tokio::test]
async fn test_empty_scene_name_is_rejected() {
    let coordinator = ready_coordinator(client_with(&test_devices())).await;
    let (store, _dir) = temp_store();
    let service = BridgeService::new(coordinator, store);

    let err = service
        .create_scene("  ", &CaptureOptions::default())
        .await
        .expect_err("must fail");
    assert!(matches!(err, HomismartError::InvalidInput(_)));
}
