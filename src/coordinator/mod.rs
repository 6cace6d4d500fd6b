//! Device snapshot builder and polling coordinator
//!
//! The coordinator polls the vendor session on a fixed interval (and on push
//! events), normalizes the device set into an immutable snapshot, and exposes
//! the typed command methods every upward surface dispatches through. A
//! snapshot is replaced wholesale on each refresh; readers always see either
//! the new list or the previous one, never a partial update.

use crate::client::{CapabilitySet, DeviceEvent, DeviceHandle, HomismartClient};
use crate::error::{HomismartError, Result};
use crate::translate::{infer_device_type, invert_position, round_to_ten, DeviceType, ShutterState};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Normalized view of one vendor device, rebuilt on every refresh
#[derive(Clone, Serialize)]
pub struct DeviceRecord {
    /// Derived from the display name; unique within a snapshot but not
    /// stable across a rename
    pub id: String,

    /// Display name
    pub label: String,

    /// Inferred category
    #[serde(rename = "type")]
    pub device_type: DeviceType,

    /// Capabilities reported by the handle
    pub capabilities: CapabilitySet,

    /// Reachability; devices that report nothing count as online
    pub online: bool,

    /// Current level in vendor scale, level-capable devices only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_level: Option<u8>,

    /// Target level in vendor scale, level-capable devices only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_level: Option<u8>,

    /// Vendor curtain state string, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curtain_state: Option<String>,

    /// Binary on/off state, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<bool>,

    /// Battery percentage telemetry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<u8>,

    /// Signal strength telemetry in dB
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i32>,

    /// Last successful device communication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_communication: Option<DateTime<Utc>>,

    /// Live vendor handle, borrowed for the lifetime of this snapshot
    #[serde(skip_serializing)]
    pub handle: Arc<dyn DeviceHandle>,
}

impl fmt::Debug for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceRecord")
            .field("id", &self.id)
            .field("type", &self.device_type)
            .field("online", &self.online)
            .field("current_level", &self.current_level)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl DeviceRecord {
    pub(crate) fn from_handle(handle: Arc<dyn DeviceHandle>) -> Self {
        let name = handle.name().to_string();
        let capabilities = handle.capabilities();
        let device_type = infer_device_type(&name, capabilities);

        // Level readings only make sense for level-capable devices; a
        // level-capable device with no reading yet reports 0.
        let current_level = capabilities
            .level
            .then(|| handle.current_level().unwrap_or(0));
        let target_level = capabilities.level.then(|| handle.target_level().unwrap_or(0));

        Self {
            id: name.clone(),
            label: name,
            device_type,
            capabilities,
            online: handle.online().unwrap_or(true),
            current_level,
            target_level,
            curtain_state: handle.curtain_state(),
            state: handle.is_on(),
            battery: handle.battery(),
            rssi: handle.rssi(),
            last_communication: handle.last_communication(),
            handle,
        }
    }

    /// On/off view, falling back to the level for dimmer-style devices
    pub fn is_on(&self) -> bool {
        if let Some(state) = self.state {
            return state;
        }
        self.current_level.map(|level| level > 0).unwrap_or(false)
    }

    /// Current position in host scale (0 = closed, 100 = open)
    pub fn host_position(&self) -> Option<u8> {
        self.current_level.map(invert_position)
    }

    /// Curtain state string, falling back to the threshold classification
    pub fn shutter_state(&self) -> Option<String> {
        if let Some(state) = &self.curtain_state {
            return Some(state.clone());
        }
        self.current_level
            .map(|level| ShutterState::from_vendor_level(level).to_string())
    }

    /// Human-readable reachability label
    pub fn status_label(&self) -> &'static str {
        if self.online {
            "Online"
        } else {
            "Offline"
        }
    }

    /// Case-insensitive label substring match
    pub fn matches_label(&self, filter: &str) -> bool {
        self.label.to_lowercase().contains(&filter.to_lowercase())
    }
}

/// The complete, immutable device list produced by one refresh cycle
#[derive(Debug, Clone, Serialize)]
pub struct DeviceSnapshot {
    /// Normalized records, in provider order
    pub records: Vec<DeviceRecord>,

    /// When this snapshot was built
    pub refreshed_at: DateTime<Utc>,
}

impl DeviceSnapshot {
    /// Empty snapshot, used before the first successful refresh
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            refreshed_at: Utc::now(),
        }
    }

    fn from_handles(handles: Vec<Arc<dyn DeviceHandle>>) -> Self {
        Self {
            records: handles.into_iter().map(DeviceRecord::from_handle).collect(),
            refreshed_at: Utc::now(),
        }
    }

    /// Look up a record by id
    pub fn find(&self, device_id: &str) -> Option<&DeviceRecord> {
        self.records.iter().find(|record| record.id == device_id)
    }

    /// Number of devices in the snapshot
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot holds no devices
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the records
    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.records.iter()
    }
}

/// Polling coordinator over a HomiSmart session
pub struct Coordinator {
    client: Arc<dyn HomismartClient>,
    update_interval: Duration,
    snapshot: RwLock<Arc<DeviceSnapshot>>,
    last_update_success: AtomicBool,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl Coordinator {
    /// Create a coordinator polling at `update_interval`
    pub fn new(client: Arc<dyn HomismartClient>, update_interval: Duration) -> Self {
        Self {
            client,
            update_interval,
            snapshot: RwLock::new(Arc::new(DeviceSnapshot::empty())),
            last_update_success: AtomicBool::new(false),
            poll_task: Mutex::new(None),
        }
    }

    /// The currently published snapshot
    pub async fn snapshot(&self) -> Arc<DeviceSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Whether the most recent refresh succeeded
    pub fn last_update_success(&self) -> bool {
        self.last_update_success.load(Ordering::SeqCst)
    }

    async fn ensure_session(&self) -> Result<()> {
        if self.client.is_connected().await {
            return Ok(());
        }
        warn!("HomiSmart session not available, attempting reconnection");
        self.client.connect().await
    }

    /// Fetch the current device set and publish a fresh snapshot
    ///
    /// On failure the previous snapshot stays published (last known good) and
    /// the error is surfaced as [`HomismartError::UpdateFailed`].
    pub async fn refresh(&self) -> Result<usize> {
        let fetched = match self.ensure_session().await {
            Ok(()) => self.client.devices().await,
            Err(e) => Err(e),
        };

        match fetched {
            Ok(handles) => {
                let snapshot = Arc::new(DeviceSnapshot::from_handles(handles));
                let count = snapshot.len();
                *self.snapshot.write().await = snapshot;
                self.last_update_success.store(true, Ordering::SeqCst);
                debug!(devices = count, "Published fresh device snapshot");
                Ok(count)
            }
            Err(e) => {
                self.last_update_success.store(false, Ordering::SeqCst);
                error!("Error communicating with HomiSmart API: {e}");
                Err(HomismartError::update_failed(format!(
                    "Error communicating with API: {e}"
                )))
            }
        }
    }

    /// Start the polling loop: fixed-interval refresh plus immediate refresh
    /// on every push event from the session
    pub async fn start(self: &Arc<Self>) {
        let coordinator = Arc::clone(self);
        let mut events = self.client.subscribe();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(coordinator.update_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut events_open = true;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = coordinator.refresh().await {
                            warn!("Scheduled refresh failed: {e}");
                        }
                    }
                    event = events.recv(), if events_open => match event {
                        Ok(DeviceEvent::DeviceUpdated { name }) => {
                            debug!(device = %name, "Device update event received");
                            if let Err(e) = coordinator.refresh().await {
                                warn!("Event-triggered refresh failed: {e}");
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            debug!(skipped, "Event stream lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            // Keep polling on the interval alone.
                            events_open = false;
                        }
                    },
                }
            }
        });

        *self.poll_task.lock().await = Some(task);
        info!(
            interval_secs = self.update_interval.as_secs(),
            "HomiSmart coordinator started"
        );
    }

    /// Stop polling and close the session
    ///
    /// Cancellation is best-effort; close errors are logged and swallowed so
    /// shutdown always completes.
    pub async fn shutdown(&self) {
        if let Some(task) = self.poll_task.lock().await.take() {
            task.abort();
        }

        if let Err(e) = self.client.close().await {
            warn!("Error closing HomiSmart client: {e}");
        }

        info!("HomiSmart coordinator shutdown completed");
    }

    async fn find_handle(&self, device_id: &str) -> Option<(Arc<dyn DeviceHandle>, CapabilitySet)> {
        let snapshot = self.snapshot().await;
        snapshot
            .find(device_id)
            .map(|record| (Arc::clone(&record.handle), record.capabilities))
    }

    /// Move a cover to a host-scale position (0 = closed, 100 = open)
    ///
    /// Inverts to the vendor scale and rounds to the nearest multiple of 10
    /// before sending.
    pub async fn set_cover_position(&self, device_id: &str, position: u8) -> bool {
        let Some((handle, capabilities)) = self.find_handle(device_id).await else {
            error!(device = device_id, "Device not found");
            return false;
        };

        if !capabilities.level {
            error!(device = device_id, "Device does not support position control");
            return false;
        }

        let position = position.min(100);
        let vendor_position = invert_position(position);
        let rounded = round_to_ten(vendor_position);

        info!(
            device = device_id,
            position,
            vendor = vendor_position,
            rounded,
            "Setting cover position"
        );

        match handle.set_level(rounded).await {
            Ok(()) => true,
            Err(e) => {
                error!(device = device_id, "Failed to set cover position: {e}");
                false
            }
        }
    }

    /// Stop an in-flight cover movement
    pub async fn stop_cover(&self, device_id: &str) -> bool {
        let Some((handle, capabilities)) = self.find_handle(device_id).await else {
            error!(device = device_id, "Device not found");
            return false;
        };

        if !capabilities.stop {
            warn!(device = device_id, "Device does not support stop command");
            return false;
        }

        info!(device = device_id, "Stopping cover");

        match handle.stop().await {
            Ok(()) => true,
            Err(e) => {
                error!(device = device_id, "Failed to stop cover: {e}");
                false
            }
        }
    }

    /// Turn a device on, falling back to full level for level-only devices
    pub async fn turn_on_device(&self, device_id: &str) -> bool {
        let Some((handle, capabilities)) = self.find_handle(device_id).await else {
            error!(device = device_id, "Device not found");
            return false;
        };

        info!(device = device_id, "Turning on device");

        let result = if capabilities.on_off {
            handle.turn_on().await
        } else if capabilities.level {
            handle.set_level(100).await
        } else {
            error!(device = device_id, "Device does not support turn_on");
            return false;
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                error!(device = device_id, "Failed to turn on device: {e}");
                false
            }
        }
    }

    /// Turn a device off, falling back to level 0 for level-only devices
    pub async fn turn_off_device(&self, device_id: &str) -> bool {
        let Some((handle, capabilities)) = self.find_handle(device_id).await else {
            error!(device = device_id, "Device not found");
            return false;
        };

        info!(device = device_id, "Turning off device");

        let result = if capabilities.on_off {
            handle.turn_off().await
        } else if capabilities.level {
            handle.set_level(0).await
        } else {
            error!(device = device_id, "Device does not support turn_off");
            return false;
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                error!(device = device_id, "Failed to turn off device: {e}");
                false
            }
        }
    }
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("update_interval", &self.update_interval)
            .field("last_update_success", &self.last_update_success())
            .finish_non_exhaustive()
    }
}
