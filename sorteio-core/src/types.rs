use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store locations used by the raffle.
pub mod paths {
    pub const PARTICIPANTS: &str = "participants";
    pub const DRAW: &str = "draw";
    pub const CURRENT_DRAW: &str = "draw/current";
    pub const HISTORY: &str = "draw/history";

    pub fn participant(key: &str) -> String {
        format!("{}/{}", PARTICIPANTS, key)
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub joined_at: i64,
}

impl Participant {
    pub fn joined_now() -> Self {
        Self {
            joined_at: now_millis(),
        }
    }
}

/// A registered participant together with its store-generated key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantEntry {
    pub key: String,
    pub participant: Participant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub number: i64,
    pub min: i64,
    pub max: i64,
    pub timestamp: i64, // epoch millis
    #[serde(default)]
    pub token: String,
}

impl Draw {
    pub fn drawn_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Immutable snapshot of a draw, keyed by its position in the history log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub key: String,
    pub draw: Draw,
}
