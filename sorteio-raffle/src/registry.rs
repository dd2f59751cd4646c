use crate::Result;
use sorteio_core::{paths, DataStore, Participant, ParticipantEntry, Snapshot, Subscription};
use std::sync::Arc;

/// The `participants` collection
#[derive(Clone)]
pub struct ParticipantRegistry {
    store: Arc<dyn DataStore>,
}

impl ParticipantRegistry {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Create a participant entry; resolves to its generated key
    pub async fn register(&self) -> Result<String> {
        let value = serde_json::to_value(Participant::joined_now())?;
        Ok(self.store.push(paths::PARTICIPANTS, value).await?)
    }

    pub async fn deregister(&self, key: &str) -> Result<()> {
        Ok(self.store.remove(&paths::participant(key)).await?)
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(count_children(&self.store.get(paths::PARTICIPANTS).await?))
    }

    pub async fn list(&self) -> Result<Vec<ParticipantEntry>> {
        let snapshot = self.store.get(paths::PARTICIPANTS).await?;
        let Some(children) = snapshot.as_ref().and_then(|value| value.as_object()) else {
            return Ok(Vec::new());
        };

        Ok(children
            .iter()
            .filter_map(|(key, value)| {
                serde_json::from_value::<Participant>(value.clone())
                    .ok()
                    .map(|participant| ParticipantEntry {
                        key: key.clone(),
                        participant,
                    })
            })
            .collect())
    }

    pub async fn watch(&self) -> Result<Subscription> {
        Ok(self.store.on_value(paths::PARTICIPANTS).await?)
    }

    pub async fn clear(&self) -> Result<()> {
        Ok(self.store.remove(paths::PARTICIPANTS).await?)
    }
}

/// Number of children of a collection snapshot; absent counts as zero.
pub fn count_children(snapshot: &Snapshot) -> usize {
    snapshot
        .as_ref()
        .and_then(|value| value.as_object())
        .map_or(0, |children| children.len())
}
