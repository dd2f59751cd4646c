pub mod listeners;
pub mod memory;
pub mod path;
pub mod push_id;
pub mod sqlite;
pub mod tree;

pub use listeners::{ListenerHub, Subscription};
pub use memory::MemoryStore;
pub use push_id::PushIdGenerator;
pub use sqlite::SqliteStore;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Value at a store location; `None` when nothing is stored there.
pub type Snapshot = Option<Value>;

/// Path-addressed real-time JSON store.
///
/// Locations are `/`-separated paths. Writing `null` (or an empty object)
/// deletes a location. Every `on_value` subscriber whose location overlaps a
/// written location receives the new value of its own location, once per
/// change.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// One-shot read
    async fn get(&self, path: &str) -> Result<Snapshot>;

    /// Overwrite the location
    async fn set(&self, path: &str, value: Value) -> Result<()>;

    /// Append a child under a generated, chronologically ordered key
    async fn push(&self, path: &str, value: Value) -> Result<String>;

    /// Delete the location and everything below it
    async fn remove(&self, path: &str) -> Result<()>;

    /// Subscribe to a location; the current value is delivered first
    async fn on_value(&self, path: &str) -> Result<Subscription>;
}
