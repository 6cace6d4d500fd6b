//! HomiSmart bridge: normalized device snapshots, command dispatch and
//! scenes over the HomiSmart cloud session
//!
//! The bridge polls a HomiSmart session for its device set, normalizes it
//! into typed records (shutters, lights, switches), translates between the
//! host position convention (0 = closed, 100 = open) and the vendor's
//! inverted scale, and exposes best-effort single/bulk command dispatch plus
//! persisted scenes.
//!
//! # Example
//!
//! ```rust,no_run
//! use homismart_bridge::{BridgeService, Coordinator, SceneStore};
//! use homismart_bridge::mock::MockClient;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(MockClient::new());
//!     let coordinator = Arc::new(Coordinator::new(client, Duration::from_secs(30)));
//!     coordinator.refresh().await?;
//!     coordinator.start().await;
//!
//!     let service = BridgeService::new(
//!         Arc::clone(&coordinator),
//!         SceneStore::new("scenes.json"),
//!     );
//!     service.open_all_covers(None).await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod mock;
pub mod registry;
pub mod scenes;
pub mod service;
pub mod translate;

// Re-export main types
pub use crate::{
    client::{Capability, CapabilitySet, DeviceEvent, DeviceHandle, HomismartClient},
    config::BridgeConfig,
    coordinator::{Coordinator, DeviceRecord, DeviceSnapshot},
    dispatch::{DeviceAction, GroupOutcome},
    error::{HomismartError, Result},
    registry::BridgeRegistry,
    scenes::{CaptureOptions, Scene, SceneStore},
    service::BridgeService,
    translate::{DeviceType, ShutterState},
};
