use crate::history::newest_first;
use crate::{PendingWrite, RaffleError, Result};
use sorteio_core::{paths, DataStore, Draw, HistoryEntry, Snapshot, Subscription};
use std::sync::Arc;

/// Draw log: an append-only history plus one pointer to the latest draw.
#[derive(Clone)]
pub struct DrawLog {
    store: Arc<dyn DataStore>,
}

impl DrawLog {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Move the latest pointer to `draw` and append it to the history.
    /// Resolves to the history key.
    pub fn publish(&self, draw: Draw) -> PendingWrite<String> {
        let store = self.store.clone();
        PendingWrite::spawn("Publishing draw", async move {
            let value = serde_json::to_value(&draw)?;
            store.set(paths::CURRENT_DRAW, value.clone()).await?;
            let key = store.push(paths::HISTORY, value).await?;
            tracing::info!("Published draw {} as history entry {}", draw.number, key);
            Ok::<_, RaffleError>(key)
        })
    }

    pub async fn latest(&self) -> Result<Option<Draw>> {
        Ok(decode_draw(&self.store.get(paths::CURRENT_DRAW).await?))
    }

    /// Whole history, newest first
    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        Ok(newest_first(decode_history(
            &self.store.get(paths::HISTORY).await?,
        )))
    }

    pub async fn watch_latest(&self) -> Result<Subscription> {
        Ok(self.store.on_value(paths::CURRENT_DRAW).await?)
    }

    pub async fn watch_history(&self) -> Result<Subscription> {
        Ok(self.store.on_value(paths::HISTORY).await?)
    }

    /// Drop the latest pointer and the whole history
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(paths::DRAW).await?;
        Ok(())
    }
}

/// The draw in a `draw/current` snapshot; malformed data counts as absent.
pub fn decode_draw(snapshot: &Snapshot) -> Option<Draw> {
    let value = snapshot.as_ref()?;
    match serde_json::from_value(value.clone()) {
        Ok(draw) => Some(draw),
        Err(e) => {
            tracing::warn!("Ignoring malformed draw {}: {}", value, e);
            None
        }
    }
}

/// Entries of a `draw/history` snapshot in key order, skipping malformed ones.
pub fn decode_history(snapshot: &Snapshot) -> Vec<HistoryEntry> {
    let Some(children) = snapshot.as_ref().and_then(|value| value.as_object()) else {
        return Vec::new();
    };

    children
        .iter()
        .filter_map(|(key, value)| match serde_json::from_value::<Draw>(value.clone()) {
            Ok(draw) => Some(HistoryEntry {
                key: key.clone(),
                draw,
            }),
            Err(e) => {
                tracing::warn!("Ignoring malformed history entry {}: {}", key, e);
                None
            }
        })
        .collect()
}
