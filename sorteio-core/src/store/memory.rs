use super::{path, tree, DataStore, ListenerHub, PushIdGenerator, Snapshot, Subscription};
use crate::error::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

/// In-process store. Every handle cloned from one `MemoryStore` shares the
/// same tree and subscribers.
#[derive(Clone)]
pub struct MemoryStore {
    root: Arc<RwLock<Value>>,
    hub: Arc<ListenerHub>,
    push_ids: Arc<PushIdGenerator>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            root: Arc::new(RwLock::new(Value::Null)),
            hub: ListenerHub::new(),
            push_ids: Arc::new(PushIdGenerator::new()),
        }
    }

    /// Copy of the whole tree
    pub fn export(&self) -> Value {
        self.root.read().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.hub.count()
    }

    fn write(&self, segments: &[String], value: Value) {
        let mut root = self.root.write();
        tree::set(&mut root, segments, value);

        for (id, listening) in self.hub.affected(segments) {
            self.hub.deliver(id, tree::get(&root, &listening).cloned());
        }
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Snapshot> {
        let segments = path::segments(path)?;
        Ok(tree::get(&self.root.read(), &segments).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        let segments = path::segments(path)?;
        self.write(&segments, value);
        Ok(())
    }

    async fn push(&self, path: &str, value: Value) -> Result<String> {
        let mut segments = path::segments(path)?;
        let key = self.push_ids.next_id();
        segments.push(key.clone());
        self.write(&segments, value);
        Ok(key)
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let segments = path::segments(path)?;
        self.write(&segments, Value::Null);
        Ok(())
    }

    async fn on_value(&self, path: &str) -> Result<Subscription> {
        let segments = path::segments(path)?;
        // hold the read lock so no write slips between the snapshot and registration
        let root = self.root.read();
        let initial = tree::get(&root, &segments).cloned();
        Ok(self.hub.register(segments, initial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::conformance;

    #[tokio::test]
    async fn test_set_get_remove() {
        conformance::set_get_remove(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_push_appends() {
        conformance::push_appends(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_subscriptions() {
        conformance::subscriptions(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_rejects_invalid_paths() {
        conformance::rejects_invalid_paths(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        let sub = other.on_value("draw").await.unwrap();
        store.set("draw/current", serde_json::json!(1)).await.unwrap();
        assert_eq!(other.export(), serde_json::json!({ "draw": { "current": 1 } }));
        assert_eq!(store.subscriber_count(), 1);
        drop(sub);
        assert_eq!(store.subscriber_count(), 0);
    }
}
