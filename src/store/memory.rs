use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{now_millis, RateCounterStore, StoreError};

/// Process-local counter store for single-instance deployments.
///
/// All concurrent requests in the process share the map; each key's
/// read-modify-write is serialized by the lock held across the individual
/// `get`/`set` calls, matching the best-effort window semantics of the
/// durable store.
#[derive(Clone)]
pub struct MemoryCounterStore {
    entries: Arc<RwLock<HashMap<String, Vec<i64>>>>,
    window: Duration,
}

impl MemoryCounterStore {
    pub fn new(window: Duration) -> Self {
        Self { entries: Arc::new(RwLock::new(HashMap::new())), window }
    }
}

#[async_trait]
impl RateCounterStore for MemoryCounterStore {
    async fn get(&self, key: &str) -> Result<Vec<i64>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned().unwrap_or_default())
    }

    async fn set(&self, key: &str, stamps: &[i64], _ttl: Duration) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), stamps.to_vec());
        Ok(())
    }

    async fn cleanup(&self) -> Result<(), StoreError> {
        let cutoff = now_millis() - self.window.as_millis() as i64;
        let mut entries = self.entries.write().await;
        entries.retain(|_, stamps| {
            stamps.retain(|&t| t > cutoff);
            !stamps.is_empty()
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_returns_empty_for_unknown_key() {
        let store = MemoryCounterStore::new(Duration::from_secs(60));
        assert!(store.get("1.2.3.4:login").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = MemoryCounterStore::new(Duration::from_secs(60));
        let stamps = vec![1000, 2000, 3000];
        store.set("k", &stamps, Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), stamps);
    }

    #[tokio::test]
    async fn cleanup_drops_stale_stamps_and_empty_keys() {
        let store = MemoryCounterStore::new(Duration::from_millis(50));
        let old = now_millis() - 1000;
        let fresh = now_millis();
        store.set("stale", &[old], Duration::from_millis(50)).await.unwrap();
        store.set("mixed", &[old, fresh], Duration::from_millis(50)).await.unwrap();

        store.cleanup().await.unwrap();

        assert!(store.get("stale").await.unwrap().is_empty());
        assert_eq!(store.get("mixed").await.unwrap(), vec![fresh]);
    }
}
