//! Shared fixtures for integration tests
#![allow(dead_code)]

use homismart_bridge::client::{CapabilitySet, DeviceHandle, HomismartClient};
use homismart_bridge::mock::{MockClient, MockDevice};
use homismart_bridge::Coordinator;
use std::sync::Arc;
use std::time::Duration;

/// A mixed device set covering every inference branch:
/// two covers, an on/off lamp, a level-only (dimmable) lamp and a plug.
pub fn test_devices() -> Vec<Arc<MockDevice>> {
    vec![
        Arc::new(
            MockDevice::new("Living Room Shutter")
                .with_capabilities(CapabilitySet::none().with_level().with_stop())
                .with_current_level(70)
                .with_battery(88)
                .with_rssi(-61),
        ),
        Arc::new(
            MockDevice::new("Bedroom Blind")
                .with_capabilities(CapabilitySet::none().with_level())
                .with_current_level(100),
        ),
        Arc::new(
            MockDevice::new("Kitchen Lamp")
                .with_capabilities(CapabilitySet::none().with_on_off())
                .with_is_on(true),
        ),
        Arc::new(
            MockDevice::new("Desk Lamp")
                .with_capabilities(CapabilitySet::none().with_level())
                .with_current_level(40),
        ),
        Arc::new(
            MockDevice::new("Garden Plug")
                .with_capabilities(CapabilitySet::none().with_on_off())
                .with_is_on(false)
                .with_online(false),
        ),
    ]
}

/// Wrap mock devices in a mock client
pub fn client_with(devices: &[Arc<MockDevice>]) -> Arc<MockClient> {
    let handles = devices
        .iter()
        .map(|device| Arc::clone(device) as Arc<dyn DeviceHandle>)
        .collect();
    Arc::new(MockClient::with_devices(handles))
}

/// Coordinator over the given client with one successful refresh done
pub async fn ready_coordinator(client: Arc<MockClient>) -> Arc<Coordinator> {
    let coordinator = Arc::new(Coordinator::new(
        client as Arc<dyn HomismartClient>,
        Duration::from_secs(30),
    ));
    coordinator
        .refresh()
        .await
        .expect("initial refresh must succeed");
    coordinator
}
