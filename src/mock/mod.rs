//! Mock implementations for testing
//!
//! Provides an in-memory client and device handles used by the test suites
//! and by the `simulate` subcommand.

use crate::client::{
    CapabilitySet, DeviceEvent, DeviceHandle, HomismartClient, EVENT_CHANNEL_CAPACITY,
};
use crate::error::{HomismartError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Mock device handle with scripted state and recorded commands
#[derive(Debug)]
pub struct MockDevice {
    name: String,
    capabilities: CapabilitySet,
    online: Option<bool>,
    current_level: Option<u8>,
    target_level: Option<u8>,
    curtain_state: Option<String>,
    is_on: Option<bool>,
    battery: Option<u8>,
    rssi: Option<i32>,
    last_communication: Option<DateTime<Utc>>,
    fail_commands: AtomicBool,
    commands: Mutex<Vec<String>>,
}

impl MockDevice {
    /// Create a device with the given display name and no capabilities
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: CapabilitySet::none(),
            online: None,
            current_level: None,
            target_level: None,
            curtain_state: None,
            is_on: None,
            battery: None,
            rssi: None,
            last_communication: None,
            fail_commands: AtomicBool::new(false),
            commands: Mutex::new(Vec::new()),
        }
    }

    /// Set the capability set
    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the reachability flag
    pub fn with_online(mut self, online: bool) -> Self {
        self.online = Some(online);
        self
    }

    /// Set the current vendor-scale level
    pub fn with_current_level(mut self, level: u8) -> Self {
        self.current_level = Some(level);
        self
    }

    /// Set the target vendor-scale level
    pub fn with_target_level(mut self, level: u8) -> Self {
        self.target_level = Some(level);
        self
    }

    /// Set the vendor curtain state string
    pub fn with_curtain_state(mut self, state: impl Into<String>) -> Self {
        self.curtain_state = Some(state.into());
        self
    }

    /// Set the binary on/off state
    pub fn with_is_on(mut self, is_on: bool) -> Self {
        self.is_on = Some(is_on);
        self
    }

    /// Set battery telemetry
    pub fn with_battery(mut self, battery: u8) -> Self {
        self.battery = Some(battery);
        self
    }

    /// Set signal-strength telemetry
    pub fn with_rssi(mut self, rssi: i32) -> Self {
        self.rssi = Some(rssi);
        self
    }

    /// Set the last-communication timestamp
    pub fn with_last_communication(mut self, at: DateTime<Utc>) -> Self {
        self.last_communication = Some(at);
        self
    }

    /// Make every command fail
    pub fn with_failing_commands(self) -> Self {
        self.fail_commands.store(true, Ordering::SeqCst);
        self
    }

    /// Toggle command failures after construction
    pub fn set_failing(&self, failing: bool) {
        self.fail_commands.store(failing, Ordering::SeqCst);
    }

    /// Commands received so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().expect("mock lock poisoned").clone()
    }

    fn record(&self, command: String) -> Result<()> {
        if self.fail_commands.load(Ordering::SeqCst) {
            return Err(HomismartError::device_control(format!(
                "{}: simulated command failure",
                self.name
            )));
        }
        self.commands.lock().expect("mock lock poisoned").push(command);
        Ok(())
    }
}

#[async_trait]
impl DeviceHandle for MockDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    fn online(&self) -> Option<bool> {
        self.online
    }

    fn current_level(&self) -> Option<u8> {
        self.current_level
    }

    fn target_level(&self) -> Option<u8> {
        self.target_level
    }

    fn curtain_state(&self) -> Option<String> {
        self.curtain_state.clone()
    }

    fn is_on(&self) -> Option<bool> {
        self.is_on
    }

    fn battery(&self) -> Option<u8> {
        self.battery
    }

    fn rssi(&self) -> Option<i32> {
        self.rssi
    }

    fn last_communication(&self) -> Option<DateTime<Utc>> {
        self.last_communication
    }

    async fn set_level(&self, level: u8) -> Result<()> {
        if !self.capabilities.level {
            return Err(HomismartError::unsupported(format!(
                "{} does not support level control",
                self.name
            )));
        }
        self.record(format!("set_level:{level}"))
    }

    async fn turn_on(&self) -> Result<()> {
        if !self.capabilities.on_off {
            return Err(HomismartError::unsupported(format!(
                "{} does not support on/off control",
                self.name
            )));
        }
        self.record("turn_on".to_string())
    }

    async fn turn_off(&self) -> Result<()> {
        if !self.capabilities.on_off {
            return Err(HomismartError::unsupported(format!(
                "{} does not support on/off control",
                self.name
            )));
        }
        self.record("turn_off".to_string())
    }

    async fn stop(&self) -> Result<()> {
        if !self.capabilities.stop {
            return Err(HomismartError::unsupported(format!(
                "{} does not support stop",
                self.name
            )));
        }
        self.record("stop".to_string())
    }
}

/// Mock HomiSmart client for testing
pub struct MockClient {
    connected: AtomicBool,
    fail_connect: AtomicBool,
    fail_refresh: AtomicBool,
    devices: Mutex<Vec<Arc<dyn DeviceHandle>>>,
    events: broadcast::Sender<DeviceEvent>,
}

impl MockClient {
    /// Create a disconnected client with no devices
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            connected: AtomicBool::new(false),
            fail_connect: AtomicBool::new(false),
            fail_refresh: AtomicBool::new(false),
            devices: Mutex::new(Vec::new()),
            events,
        }
    }

    /// Create a client seeded with the given devices
    pub fn with_devices(devices: Vec<Arc<dyn DeviceHandle>>) -> Self {
        let client = Self::new();
        *client.devices.lock().expect("mock lock poisoned") = devices;
        client
    }

    /// Replace the device set
    pub fn set_devices(&self, devices: Vec<Arc<dyn DeviceHandle>>) {
        *self.devices.lock().expect("mock lock poisoned") = devices;
    }

    /// Make `connect` fail
    pub fn set_fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Make `devices` fail, simulating a provider outage
    pub fn set_fail_refresh(&self, fail: bool) {
        self.fail_refresh.store(fail, Ordering::SeqCst);
    }

    /// Emit a device-updated push event
    pub fn emit_device_updated(&self, name: impl Into<String>) {
        // Send fails only when nobody is subscribed, which is fine here.
        let _ = self.events.send(DeviceEvent::DeviceUpdated { name: name.into() });
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HomismartClient for MockClient {
    async fn connect(&self) -> Result<()> {
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(HomismartError::connection("simulated connect failure"));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn devices(&self) -> Result<Vec<Arc<dyn DeviceHandle>>> {
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(HomismartError::connection("simulated provider outage"));
        }
        Ok(self.devices.lock().expect("mock lock poisoned").clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.events.subscribe()
    }
}
