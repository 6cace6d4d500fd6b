//! Ownership registry for active bridge instances
//!
//! One coordinator/service pair is owned per active configuration, keyed by
//! a caller-chosen entry id and scoped to application lifetime. Unloading an
//! entry tears its coordinator down explicitly.

use crate::service::BridgeService;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Keyed registry of running bridge services
#[derive(Debug, Default)]
pub struct BridgeRegistry {
    entries: RwLock<HashMap<String, Arc<BridgeService>>>,
}

impl BridgeRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service under an entry id, replacing any previous owner
    pub async fn insert(&self, entry_id: impl Into<String>, service: Arc<BridgeService>) {
        let entry_id = entry_id.into();
        let previous = self
            .entries
            .write()
            .await
            .insert(entry_id.clone(), service);
        if previous.is_some() {
            warn!(entry = %entry_id, "Replaced an already registered bridge entry");
        }
        info!(entry = %entry_id, "Bridge entry registered");
    }

    /// Look up the service for an entry id
    pub async fn get(&self, entry_id: &str) -> Option<Arc<BridgeService>> {
        self.entries.read().await.get(entry_id).cloned()
    }

    /// Number of active entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether no entries are active
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remove an entry and shut its coordinator down
    ///
    /// Returns whether the entry existed.
    pub async fn unload(&self, entry_id: &str) -> bool {
        let removed = self.entries.write().await.remove(entry_id);
        match removed {
            Some(service) => {
                service.coordinator().shutdown().await;
                info!(entry = entry_id, "Bridge entry unloaded");
                true
            }
            None => false,
        }
    }

    /// Unload every entry, for process shutdown
    pub async fn shutdown_all(&self) {
        let drained: Vec<(String, Arc<BridgeService>)> =
            self.entries.write().await.drain().collect();
        for (entry_id, service) in drained {
            service.coordinator().shutdown().await;
            info!(entry = %entry_id, "Bridge entry unloaded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HomismartClient;
    use crate::coordinator::Coordinator;
    use crate::mock::MockClient;
    use crate::scenes::SceneStore;
    use std::time::Duration;

    async fn running_service(client: Arc<MockClient>) -> Arc<BridgeService> {
        let coordinator = Arc::new(Coordinator::new(
            Arc::clone(&client) as Arc<dyn HomismartClient>,
            Duration::from_secs(30),
        ));
        coordinator.refresh().await.unwrap();
        Arc::new(BridgeService::new(
            coordinator,
            SceneStore::new("unused-scenes.json"),
        ))
    }

    #[tokio::test]
    async fn test_insert_get_unload() {
        let registry = BridgeRegistry::new();
        let client = Arc::new(MockClient::new());
        let service = running_service(Arc::clone(&client)).await;

        registry.insert("entry-1", service).await;
        assert_eq!(registry.len().await, 1);
        assert!(registry.get("entry-1").await.is_some());
        assert!(registry.get("entry-2").await.is_none());

        // Unload tears the session down
        assert!(client.is_connected().await);
        assert!(registry.unload("entry-1").await);
        assert!(!client.is_connected().await);
        assert!(registry.is_empty().await);

        // Unloading again is a no-op
        assert!(!registry.unload("entry-1").await);
    }

    #[tokio::test]
    async fn test_shutdown_all_drains_entries() {
        let registry = BridgeRegistry::new();
        let client_a = Arc::new(MockClient::new());
        let client_b = Arc::new(MockClient::new());

        registry
            .insert("a", running_service(Arc::clone(&client_a)).await)
            .await;
        registry
            .insert("b", running_service(Arc::clone(&client_b)).await)
            .await;

        registry.shutdown_all().await;
        assert!(registry.is_empty().await);
        assert!(!client_a.is_connected().await);
        assert!(!client_b.is_connected().await);
    }
}
