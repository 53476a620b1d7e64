// src/store/memory.rs

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::{RwLock, broadcast, mpsc};

use super::{
    DocPath, DocumentStore, DocumentStream, StoreError, SUBSCRIPTION_BUFFER, WriteMode,
    apply_update, merge_documents, resolve_server_timestamps,
};

/// Process-local document store.
///
/// Used when no database is configured and by the test suites. Every write
/// is published on a broadcast channel so subscriptions see it.
pub struct MemoryStore {
    docs: RwLock<HashMap<String, Value>>,
    changes: broadcast::Sender<(String, Value)>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(256);
        Self {
            docs: RwLock::new(HashMap::new()),
            changes,
        }
    }

    /// Number of stored documents whose path starts with `prefix`.
    pub async fn count_prefix(&self, prefix: &str) -> usize {
        self.docs
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .count()
    }

    /// Subscriptions whose forwarding task is still running.
    pub fn live_subscriptions(&self) -> usize {
        self.changes.receiver_count()
    }

    fn publish(&self, path: &DocPath, doc: &Value) {
        // No receivers is fine.
        let _ = self.changes.send((path.as_str().to_string(), doc.clone()));
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError> {
        Ok(self.docs.read().await.get(path.as_str()).cloned())
    }

    async fn put(&self, path: &DocPath, mut doc: Value, mode: WriteMode) -> Result<(), StoreError> {
        resolve_server_timestamps(&mut doc, Utc::now());

        let stored = {
            let mut docs = self.docs.write().await;
            match (mode, docs.entry(path.as_str().to_string())) {
                (WriteMode::Merge, Entry::Occupied(mut entry)) => {
                    merge_documents(entry.get_mut(), doc);
                    entry.get().clone()
                }
                (_, Entry::Occupied(mut entry)) => {
                    entry.insert(doc.clone());
                    doc
                }
                (_, Entry::Vacant(entry)) => {
                    entry.insert(doc.clone());
                    doc
                }
            }
        };

        self.publish(path, &stored);
        Ok(())
    }

    async fn update(&self, path: &DocPath, mut partial: Value) -> Result<(), StoreError> {
        resolve_server_timestamps(&mut partial, Utc::now());

        let stored = {
            let mut docs = self.docs.write().await;
            let existing = docs
                .get_mut(path.as_str())
                .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
            apply_update(existing, partial)?;
            existing.clone()
        };

        self.publish(path, &stored);
        Ok(())
    }

    async fn subscribe(&self, path: &DocPath) -> Result<DocumentStream, StoreError> {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let mut changes = self.changes.subscribe();

        if let Some(current) = self.get(path).await? {
            // Receiver is still held locally, so this cannot fail on a closed channel.
            let _ = tx.send(current).await;
        }

        let watched = path.as_str().to_string();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    change = changes.recv() => match change {
                        Ok((changed, doc)) if changed == watched => {
                            if tx.send(doc).await.is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!("Subscription on {} lagged by {} changes", watched, skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Paths, server_timestamp};
    use serde_json::json;

    #[tokio::test]
    async fn update_fails_when_document_is_absent() {
        let store = MemoryStore::new();
        let path = Paths::new("t").share("nobody");

        let err = store.update(&path, json!({ "progress": 10 })).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.get(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn merge_creates_then_merges() {
        let store = MemoryStore::new();
        let path = Paths::new("t").profile("u1");

        store
            .put(&path, json!({ "name": "Asha", "testTaken": false }), WriteMode::Merge)
            .await
            .unwrap();
        store
            .put(&path, json!({ "testTaken": true }), WriteMode::Merge)
            .await
            .unwrap();

        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc, json!({ "name": "Asha", "testTaken": true }));
    }

    #[tokio::test]
    async fn replace_drops_previous_fields() {
        let store = MemoryStore::new();
        let path = Paths::new("t").results("u1");

        store.put(&path, json!({ "a": 1, "b": 2 }), WriteMode::Replace).await.unwrap();
        store.put(&path, json!({ "c": 3 }), WriteMode::Replace).await.unwrap();

        assert_eq!(store.get(&path).await.unwrap().unwrap(), json!({ "c": 3 }));
    }

    #[tokio::test]
    async fn timestamps_are_stamped_on_write() {
        let store = MemoryStore::new();
        let path = Paths::new("t").share("u1");

        store
            .put(&path, json!({ "updatedAt": server_timestamp() }), WriteMode::Replace)
            .await
            .unwrap();

        let doc = store.get(&path).await.unwrap().unwrap();
        assert!(doc["updatedAt"].is_string());
    }

    #[tokio::test]
    async fn subscription_sees_current_then_later_writes() {
        let store = MemoryStore::new();
        let paths = Paths::new("t");
        let watched = paths.results("u1");

        store.put(&watched, json!({ "progress": 0 }), WriteMode::Replace).await.unwrap();
        let mut rx = store.subscribe(&watched).await.unwrap();

        assert_eq!(rx.recv().await.unwrap()["progress"], 0);

        // Writes elsewhere are not delivered.
        store
            .put(&paths.results("u2"), json!({ "progress": 99 }), WriteMode::Replace)
            .await
            .unwrap();
        store.update(&watched, json!({ "progress": 25 })).await.unwrap();

        assert_eq!(rx.recv().await.unwrap()["progress"], 25);
    }

    #[tokio::test]
    async fn dropped_subscriptions_stop_forwarding() {
        let store = MemoryStore::new();
        let path = Paths::new("t").results("u1");

        for _ in 0..50 {
            drop(store.subscribe(&path).await.unwrap());
        }
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;

        assert_eq!(store.live_subscriptions(), 0);
    }
}
