//! sorteio SDK - core library for real-time raffles
//!
//! Holds the raffle data model, the path-addressed real-time data store
//! (in-memory and SQLite-backed) and the per-profile local storage that keeps
//! a participant's identity between sessions.

pub mod config;
pub mod error;
pub mod local;
pub mod store;
pub mod types;

pub use config::RaffleConfig;
pub use error::{Result, SorteioError};
pub use local::{FileLocalStorage, LocalIdentity, LocalStorage, MemoryLocalStorage};
pub use store::{DataStore, MemoryStore, Snapshot, SqliteStore, Subscription};
pub use types::{paths, Draw, HistoryEntry, Participant, ParticipantEntry};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_stores_share_the_trait_object() {
        let temp_dir = tempdir().unwrap();
        let stores: Vec<Arc<dyn DataStore>> = vec![
            Arc::new(MemoryStore::new()),
            Arc::new(SqliteStore::new(&temp_dir.path().join("sorteio.db")).await.unwrap()),
        ];

        for store in stores {
            let draw = Draw {
                number: 3,
                min: 1,
                max: 5,
                timestamp: 1,
                token: "t".to_string(),
            };
            store
                .set(paths::CURRENT_DRAW, serde_json::to_value(&draw).unwrap())
                .await
                .unwrap();
            let back: Draw =
                serde_json::from_value(store.get(paths::CURRENT_DRAW).await.unwrap().unwrap())
                    .unwrap();
            assert_eq!(back, draw);
        }
    }
}
