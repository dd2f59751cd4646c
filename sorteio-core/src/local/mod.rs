//! Per-profile key/value storage kept outside the data store, the way a
//! browser keeps `localStorage` per origin.

pub mod file;
pub mod memory;

pub use file::FileLocalStorage;
pub use memory::MemoryLocalStorage;

use crate::error::Result;

pub const PARTICIPANT_KEY: &str = "participantKey";
pub const LAST_DRAW_TS: &str = "lastDrawTS";

pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Participant identity remembered by one profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalIdentity {
    pub participant_key: Option<String>,
    pub last_draw_ts: Option<i64>,
}

impl LocalIdentity {
    pub fn load(storage: &dyn LocalStorage) -> Result<Self> {
        let participant_key = storage
            .get_item(PARTICIPANT_KEY)?
            .filter(|key| !key.is_empty());

        let last_draw_ts = match storage.get_item(LAST_DRAW_TS)? {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(ts) => Some(ts),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable {} '{}': {}", LAST_DRAW_TS, raw, e);
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            participant_key,
            last_draw_ts,
        })
    }

    pub fn save(&self, storage: &dyn LocalStorage) -> Result<()> {
        match &self.participant_key {
            Some(key) => storage.set_item(PARTICIPANT_KEY, key)?,
            None => storage.remove_item(PARTICIPANT_KEY)?,
        }
        match self.last_draw_ts {
            Some(ts) => storage.set_item(LAST_DRAW_TS, &ts.to_string())?,
            None => storage.remove_item(LAST_DRAW_TS)?,
        }
        Ok(())
    }

    /// Whether a draw with this timestamp was already reacted to
    pub fn has_seen(&self, timestamp: i64) -> bool {
        self.last_draw_ts == Some(timestamp)
    }
}
