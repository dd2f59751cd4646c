use super::path::overlaps;
use super::Snapshot;
use futures::Stream;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

struct Listener {
    segments: Vec<String>,
    tx: UnboundedSender<Snapshot>,
    last: Snapshot,
}

/// Registry of `on_value` subscribers shared by the store implementations.
///
/// Stores call [`ListenerHub::deliver`] while holding their own write lock so
/// that every subscriber observes snapshots in write order.
#[derive(Default)]
pub struct ListenerHub {
    listeners: Mutex<HashMap<Uuid, Listener>>,
}

impl ListenerHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a subscriber and queue `initial` as its first delivery.
    pub fn register(self: &Arc<Self>, segments: Vec<String>, initial: Snapshot) -> Subscription {
        let (tx, rx) = unbounded_channel();
        let id = Uuid::new_v4();
        let path = segments.join("/");

        // receiver is alive, the send cannot fail
        let _ = tx.send(initial.clone());
        self.listeners.lock().insert(
            id,
            Listener {
                segments,
                tx,
                last: initial,
            },
        );

        tracing::debug!("Subscribed {} to '{}'", id, path);
        Subscription {
            id,
            path,
            rx,
            hub: Arc::downgrade(self),
        }
    }

    /// Subscribers whose location overlaps the written one.
    pub fn affected(&self, written: &[String]) -> Vec<(Uuid, Vec<String>)> {
        self.listeners
            .lock()
            .iter()
            .filter(|(_, listener)| overlaps(&listener.segments, written))
            .map(|(id, listener)| (*id, listener.segments.clone()))
            .collect()
    }

    pub fn all(&self) -> Vec<(Uuid, Vec<String>)> {
        self.listeners
            .lock()
            .iter()
            .map(|(id, listener)| (*id, listener.segments.clone()))
            .collect()
    }

    /// Send a snapshot unless it equals the last one this subscriber got.
    pub fn deliver(&self, id: Uuid, snapshot: Snapshot) {
        let mut listeners = self.listeners.lock();
        let Some(listener) = listeners.get_mut(&id) else {
            return;
        };
        if listener.last == snapshot {
            return;
        }
        listener.last = snapshot.clone();
        if listener.tx.send(snapshot).is_err() {
            listeners.remove(&id);
        }
    }

    pub fn count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn unregister(&self, id: Uuid) {
        if self.listeners.lock().remove(&id).is_some() {
            tracing::debug!("Unsubscribed {}", id);
        }
    }
}

/// Live view of one store location. The first item is the value at the time
/// of subscribing, every further item follows a change. Dropping the
/// subscription detaches it from the store.
pub struct Subscription {
    id: Uuid,
    path: String,
    rx: UnboundedReceiver<Snapshot>,
    hub: Weak<ListenerHub>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Next snapshot, or `None` once the store is gone.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }
}

impl Stream for Subscription {
    type Item = Snapshot;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.unregister(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segs(path: &str) -> Vec<String> {
        crate::store::path::segments(path).unwrap()
    }

    #[tokio::test]
    async fn test_initial_delivery_and_dedupe() {
        let hub = ListenerHub::new();
        let mut sub = hub.register(segs("draw"), None);
        assert_eq!(sub.next().await, Some(None));

        hub.deliver(sub.id(), Some(json!(1)));
        hub.deliver(sub.id(), Some(json!(1)));
        hub.deliver(sub.id(), Some(json!(2)));

        assert_eq!(sub.next().await, Some(Some(json!(1))));
        assert_eq!(sub.next().await, Some(Some(json!(2))));
    }

    #[test]
    fn test_drop_unregisters() {
        let hub = ListenerHub::new();
        let sub = hub.register(segs("participants"), None);
        assert_eq!(hub.affected(&segs("participants/abc")).len(), 1);
        assert!(hub.affected(&segs("draw")).is_empty());
        drop(sub);
        assert_eq!(hub.count(), 0);
    }
}
