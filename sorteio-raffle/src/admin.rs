use crate::history::repeat_winners;
use crate::log::{decode_draw, decode_history};
use crate::registry::count_children;
use crate::view::{AdminView, INVALID_RANGE_ALERT};
use crate::{DrawLog, DrawRange, ParticipantRegistry, PendingWrite, Result};
use serde::{Deserialize, Serialize};
use sorteio_core::{types::now_millis, DataStore, Draw, HistoryEntry, RaffleConfig};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A draw already shown locally whose store writes may still be running
#[derive(Debug)]
pub struct PendingDraw {
    pub draw: Draw,
    /// Resolves to the history key once both writes are done
    pub write: PendingWrite<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStatus {
    pub participants: usize,
    pub last_draw: Option<Draw>,
    pub repeat_winners: Vec<HistoryEntry>,
}

/// Background tasks feeding the admin surface
#[derive(Debug)]
pub struct AdminWatchers {
    pub participants: JoinHandle<()>,
    pub last_draw: JoinHandle<()>,
    pub repeat_winners: JoinHandle<()>,
}

impl AdminWatchers {
    pub fn abort(&self) {
        self.participants.abort();
        self.last_draw.abort();
        self.repeat_winners.abort();
    }
}

pub struct AdminController {
    log: DrawLog,
    participants: ParticipantRegistry,
    view: Arc<dyn AdminView>,
    config: RaffleConfig,
}

impl AdminController {
    pub fn new(store: Arc<dyn DataStore>, view: Arc<dyn AdminView>, config: RaffleConfig) -> Self {
        Self {
            log: DrawLog::new(store.clone()),
            participants: ParticipantRegistry::new(store),
            view,
            config,
        }
    }

    pub fn config(&self) -> &RaffleConfig {
        &self.config
    }

    /// Subscribe the admin surface to participants, last draw and history
    pub async fn observe(&self) -> Result<AdminWatchers> {
        Ok(AdminWatchers {
            participants: self.watch_participants().await?,
            last_draw: self.watch_last_draw().await?,
            repeat_winners: self.watch_repeat_winners().await?,
        })
    }

    pub async fn watch_participants(&self) -> Result<JoinHandle<()>> {
        let mut subscription = self.participants.watch().await?;
        let view = self.view.clone();
        Ok(tokio::spawn(async move {
            while let Some(snapshot) = subscription.next().await {
                view.participant_count(count_children(&snapshot));
            }
        }))
    }

    pub async fn watch_last_draw(&self) -> Result<JoinHandle<()>> {
        let mut subscription = self.log.watch_latest().await?;
        let view = self.view.clone();
        Ok(tokio::spawn(async move {
            while let Some(snapshot) = subscription.next().await {
                if let Some(draw) = decode_draw(&snapshot) {
                    view.last_draw(draw.number);
                }
            }
        }))
    }

    pub async fn watch_repeat_winners(&self) -> Result<JoinHandle<()>> {
        let mut subscription = self.log.watch_history().await?;
        let view = self.view.clone();
        let window = self.config.history_window;
        Ok(tokio::spawn(async move {
            while let Some(snapshot) = subscription.next().await {
                let entries = decode_history(&snapshot);
                view.repeat_winners(&repeat_winners(&entries, window));
            }
        }))
    }

    /// Draw from operator input. An invalid range raises an alert on the
    /// admin surface and writes nothing.
    pub fn execute_draw(&self, min: &str, max: &str) -> Result<PendingDraw> {
        match DrawRange::parse(min, max) {
            Ok(range) => Ok(self.draw_in(range)),
            Err(e) => {
                tracing::info!("Rejected draw request: {}", e);
                self.view.alert(INVALID_RANGE_ALERT);
                Err(e)
            }
        }
    }

    /// Draw uniformly from `range`, show it and publish it without waiting
    pub fn draw_in(&self, range: DrawRange) -> PendingDraw {
        let draw = Draw {
            number: range.sample(&mut rand::thread_rng()),
            min: range.min(),
            max: range.max(),
            timestamp: now_millis(),
            token: self.config.draw_token.clone(),
        };

        tracing::info!("Drew {} from {}", draw.number, range);
        let write = self.log.publish(draw.clone());
        self.view.last_draw(draw.number);

        PendingDraw { draw, write }
    }

    pub async fn status(&self) -> Result<AdminStatus> {
        let history = self.log.history().await?;
        Ok(AdminStatus {
            participants: self.participants.count().await?,
            last_draw: self.log.latest().await?,
            repeat_winners: repeat_winners(&history, self.config.history_window),
        })
    }

    /// History newest first, at most `limit` entries
    pub async fn history(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>> {
        let history = self.log.history().await?;
        Ok(match limit {
            Some(limit) => history.into_iter().take(limit).collect(),
            None => history,
        })
    }

    /// Remove every participant and all draw state
    pub async fn reset(&self) -> Result<()> {
        self.participants.clear().await?;
        self.log.clear().await?;
        tracing::warn!("Raffle state reset");
        Ok(())
    }
}
