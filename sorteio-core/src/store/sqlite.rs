use super::{path, tree, DataStore, ListenerHub, PushIdGenerator, Snapshot, Subscription};
use crate::error::{Result, SorteioError};
use crate::types::now_millis;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// How long a write waits for another connection to release the database
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Store persisted in a SQLite file.
///
/// Each leaf of the tree is one row keyed by its full path; objects exist
/// only through their leaves. Subscribers in this process are notified on
/// every write. Writes made by other processes are picked up by
/// [`SqliteStore::watch_external`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
    hub: Arc<ListenerHub>,
    push_ids: PushIdGenerator,
}

impl SqliteStore {
    pub async fn new(db_path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SorteioError::internal(format!("Failed to create directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)?;
        Self::from_connection(conn).await
    }

    pub async fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?).await
    }

    async fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let store = Self {
            conn: Mutex::new(conn),
            hub: ListenerHub::new(),
            push_ids: PushIdGenerator::new(),
        };

        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS nodes (
                path TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Poll SQLite's `data_version` and re-deliver every subscribed location
    /// when another connection has committed since the last poll.
    ///
    /// The starting version is read before this returns, so subscriptions
    /// made afterwards never miss a commit.
    pub async fn watch_external(self: &Arc<Self>, interval: Duration) -> Result<JoinHandle<()>> {
        let mut seen_version = Some(self.data_version().await?);
        let store = Arc::downgrade(self);
        Ok(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                match store.refresh_if_changed(&mut seen_version).await {
                    Ok(true) => tracing::debug!("Store changed externally, subscribers refreshed"),
                    Ok(false) => {}
                    Err(e) => tracing::warn!("Failed to poll store for external changes: {}", e),
                }
            }
        }))
    }

    async fn data_version(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        Ok(conn.query_row("PRAGMA data_version", [], |row| row.get(0))?)
    }

    async fn refresh_if_changed(&self, seen_version: &mut Option<i64>) -> Result<bool> {
        let conn = self.conn.lock().await;

        let version: i64 = conn.query_row("PRAGMA data_version", [], |row| row.get(0))?;
        let previous = seen_version.replace(version);
        if previous.is_none() || previous == Some(version) {
            return Ok(false);
        }

        for (id, listening) in self.hub.all() {
            self.hub.deliver(id, read_location(&conn, &listening)?);
        }
        Ok(true)
    }

    async fn write(&self, segments: &[String], value: Value) -> Result<()> {
        let mut conn = self.conn.lock().await;

        write_location(&mut conn, segments, tree::normalize(value))?;

        for (id, listening) in self.hub.affected(segments) {
            self.hub.deliver(id, read_location(&conn, &listening)?);
        }
        Ok(())
    }
}

fn read_location(conn: &Connection, segments: &[String]) -> Result<Snapshot> {
    let location = path::join(segments);

    let mut rows: Vec<(String, String)> = Vec::new();
    if segments.is_empty() {
        let mut stmt = conn.prepare("SELECT path, value FROM nodes")?;
        let iter = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        for row in iter {
            rows.push(row?);
        }
    } else {
        let mut stmt = conn.prepare(
            "SELECT path, value FROM nodes
             WHERE path = ?1 OR substr(path, 1, length(?1) + 1) = ?1 || '/'",
        )?;
        let iter = stmt.query_map(params![location], |row| Ok((row.get(0)?, row.get(1)?)))?;
        for row in iter {
            rows.push(row?);
        }
    }

    let mut root = Value::Null;
    for (full_path, raw) in rows {
        let relative: Vec<String> = full_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .skip(segments.len())
            .map(str::to_string)
            .collect();
        tree::set(&mut root, &relative, serde_json::from_str(&raw)?);
    }

    Ok(if root.is_null() { None } else { Some(root) })
}

fn write_location(conn: &mut Connection, segments: &[String], value: Option<Value>) -> Result<()> {
    let location = path::join(segments);
    let tx = conn.transaction()?;

    if segments.is_empty() {
        tx.execute("DELETE FROM nodes", [])?;
    } else {
        tx.execute(
            "DELETE FROM nodes
             WHERE path = ?1 OR substr(path, 1, length(?1) + 1) = ?1 || '/'",
            params![location],
        )?;
        if value.is_some() {
            // a leaf stored at an ancestor becomes an object
            tx.execute("DELETE FROM nodes WHERE path = ''", [])?;
            for depth in 1..segments.len() {
                tx.execute(
                    "DELETE FROM nodes WHERE path = ?1",
                    params![path::join(&segments[..depth])],
                )?;
            }
        }
    }

    if let Some(value) = value {
        let updated_at = now_millis();
        for (relative, leaf) in tree::leaves(&value) {
            let mut full = segments.to_vec();
            full.extend(relative);
            tx.execute(
                "INSERT OR REPLACE INTO nodes (path, value, updated_at) VALUES (?1, ?2, ?3)",
                params![path::join(&full), serde_json::to_string(&leaf)?, updated_at],
            )?;
        }
    }

    tx.commit()?;
    Ok(())
}

#[async_trait]
impl DataStore for SqliteStore {
    async fn get(&self, path: &str) -> Result<Snapshot> {
        let segments = path::segments(path)?;
        let conn = self.conn.lock().await;
        read_location(&conn, &segments)
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        let segments = path::segments(path)?;
        self.write(&segments, value).await
    }

    async fn push(&self, path: &str, value: Value) -> Result<String> {
        let mut segments = path::segments(path)?;
        let key = self.push_ids.next_id();
        segments.push(key.clone());
        self.write(&segments, value).await?;
        Ok(key)
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let segments = path::segments(path)?;
        self.write(&segments, Value::Null).await
    }

    async fn on_value(&self, path: &str) -> Result<Subscription> {
        let segments = path::segments(path)?;
        let conn = self.conn.lock().await;
        let initial = read_location(&conn, &segments)?;
        Ok(self.hub.register(segments, initial))
    }
}
