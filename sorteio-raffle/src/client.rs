use crate::log::decode_draw;
use crate::pseudo::pseudo_number;
use crate::registry::count_children;
use crate::spinner::{CancelHandle, Spinner, TaskEnd};
use crate::view::{ClientView, Outcome, NEW_DRAW_ALERT};
use crate::{DrawLog, DrawRange, ParticipantRegistry, RaffleError, Result};
use sorteio_core::{DataStore, Draw, LocalIdentity, LocalStorage, RaffleConfig, Snapshot};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Client state for one profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientState {
    Unregistered,
    Registered { key: String },
    AwaitingReveal { key: String, draw: Draw },
    Revealed { key: String, outcome: Outcome },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// New draw: the previous entry (if any) was dropped and a new one created
    Renewed { previous: Option<String>, key: String },
    /// Draw already seen: the existing entry is kept
    Unchanged { key: String },
}

impl Registration {
    pub fn key(&self) -> &str {
        match self {
            Registration::Renewed { key, .. } | Registration::Unchanged { key } => key,
        }
    }

    pub fn is_renewed(&self) -> bool {
        matches!(self, Registration::Renewed { .. })
    }
}

/// What the client decided for one draw. The outcome is fixed up front; the
/// reveal only delays showing it.
#[derive(Debug)]
pub struct Reconciliation {
    pub draw: Draw,
    pub registration: Registration,
    pub pseudo: Option<i64>,
    pub outcome: Outcome,
    pub reveal: RevealHandle,
}

/// Running reveal animation of one draw
#[derive(Debug)]
pub struct RevealHandle {
    handle: JoinHandle<Option<Outcome>>,
    cancel: CancelHandle,
}

impl RevealHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The outcome once shown, or `None` if the reveal was cancelled
    pub async fn shown(self) -> Result<Option<Outcome>> {
        self.handle
            .await
            .map_err(|e| RaffleError::Internal(format!("Reveal task failed: {}", e)))
    }
}

/// Background tasks feeding the client surface
#[derive(Debug)]
pub struct ClientWatchers {
    pub participants: JoinHandle<()>,
    pub draws: JoinHandle<()>,
}

impl ClientWatchers {
    pub fn abort(&self) {
        self.participants.abort();
        self.draws.abort();
    }
}

pub struct ClientController {
    log: DrawLog,
    participants: ParticipantRegistry,
    local: Arc<dyn LocalStorage>,
    view: Arc<dyn ClientView>,
    spinner: Spinner,
    identity: Mutex<LocalIdentity>,
    state: Arc<parking_lot::Mutex<ClientState>>,
    active_reveal: parking_lot::Mutex<Option<CancelHandle>>,
}

impl ClientController {
    /// Load the profile's identity; with a stored key the client starts
    /// registered.
    pub fn new(
        store: Arc<dyn DataStore>,
        local: Arc<dyn LocalStorage>,
        view: Arc<dyn ClientView>,
        config: &RaffleConfig,
    ) -> Result<Self> {
        let identity = LocalIdentity::load(local.as_ref())?;
        let state = match &identity.participant_key {
            Some(key) => ClientState::Registered { key: key.clone() },
            None => ClientState::Unregistered,
        };
        tracing::debug!("Client starting in state {:?}", state);

        Ok(Self {
            log: DrawLog::new(store.clone()),
            participants: ParticipantRegistry::new(store),
            local,
            view,
            spinner: Spinner::from_config(config),
            identity: Mutex::new(identity),
            state: Arc::new(parking_lot::Mutex::new(state)),
            active_reveal: parking_lot::Mutex::new(None),
        })
    }

    pub fn state(&self) -> ClientState {
        self.state.lock().clone()
    }

    pub async fn identity(&self) -> LocalIdentity {
        self.identity.lock().await.clone()
    }

    pub async fn observe(self: &Arc<Self>) -> Result<ClientWatchers> {
        Ok(ClientWatchers {
            participants: self.watch_participants().await?,
            draws: self.watch_draws().await?,
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

    /// React to every change of the current draw, one notification at a time
    pub async fn watch_draws(self: &Arc<Self>) -> Result<JoinHandle<()>> {
        let mut subscription = self.log.watch_latest().await?;
        let client = self.clone();
        Ok(tokio::spawn(async move {
            while let Some(snapshot) = subscription.next().await {
                if let Err(e) = client.on_draw_snapshot(&snapshot).await {
                    tracing::warn!("Failed to handle draw notification: {}", e);
                }
            }
        }))
    }

    /// One-shot reconciliation with whatever draw is current
    pub async fn join(&self) -> Result<Option<Reconciliation>> {
        match self.log.latest().await? {
            Some(draw) => self.handle_draw(&draw).await.map(Some),
            None => Ok(None),
        }
    }

    /// Absent or malformed draws are ignored.
    pub async fn on_draw_snapshot(&self, snapshot: &Snapshot) -> Result<Option<Reconciliation>> {
        let Some(draw) = decode_draw(snapshot) else {
            return Ok(None);
        };
        if let Err(e) = DrawRange::of(&draw) {
            tracing::warn!("Ignoring draw with unusable bounds: {}", e);
            return Ok(None);
        }
        self.handle_draw(&draw).await.map(Some)
    }

    /// Register for `draw` if it is new, then start revealing the outcome.
    /// An unfinished reveal of an earlier notification is cancelled.
    pub async fn handle_draw(&self, draw: &Draw) -> Result<Reconciliation> {
        let range = DrawRange::of(draw)?;
        let registration = self.ensure_registered(draw).await?;

        let pseudo = pseudo_number(registration.key(), &range);
        let outcome = Outcome::decide(pseudo, draw.number);
        tracing::debug!(
            "Participant {} has pseudo-number {:?} for draw {}",
            registration.key(),
            pseudo,
            draw.number
        );

        *self.state.lock() = ClientState::AwaitingReveal {
            key: registration.key().to_string(),
            draw: draw.clone(),
        };
        let reveal = self.start_reveal(range, registration.key().to_string(), outcome.clone());

        Ok(Reconciliation {
            draw: draw.clone(),
            registration,
            pseudo,
            outcome,
            reveal,
        })
    }

    /// Make sure this profile holds exactly one participant entry for `draw`.
    ///
    /// For a draw not seen before the previous entry is removed (best-effort,
    /// a failure only leaves a stale entry behind), a new entry is created and
    /// the key and draw timestamp are persisted locally. Deliveries are
    /// serialized, so repeating a draw never registers twice.
    pub async fn ensure_registered(&self, draw: &Draw) -> Result<Registration> {
        let mut identity = self.identity.lock().await;

        if identity.has_seen(draw.timestamp) {
            if let Some(key) = &identity.participant_key {
                return Ok(Registration::Unchanged { key: key.clone() });
            }
        }

        let previous = identity.participant_key.clone();
        if let Some(old) = &previous {
            if let Err(e) = self.participants.deregister(old).await {
                tracing::warn!("Failed to remove previous participant {}: {}", old, e);
            }
        }

        let key = self.participants.register().await?;
        identity.participant_key = Some(key.clone());
        identity.last_draw_ts = Some(draw.timestamp);
        identity.save(self.local.as_ref())?;

        *self.state.lock() = ClientState::Registered { key: key.clone() };
        tracing::info!(
            "New draw at {} detected, registered as participant {}",
            draw.timestamp,
            key
        );
        self.view.alert(NEW_DRAW_ALERT);

        Ok(Registration::Renewed { previous, key })
    }

    fn start_reveal(&self, range: DrawRange, key: String, outcome: Outcome) -> RevealHandle {
        let task = self.spinner.start(range, self.view.clone());
        let cancel = task.cancel_handle();

        if let Some(previous) = self.active_reveal.lock().replace(cancel.clone()) {
            previous.cancel();
        }

        let view = self.view.clone();
        let state = self.state.clone();
        let handle = tokio::spawn(async move {
            match task.finished().await {
                Ok(TaskEnd::Completed { .. }) => {
                    view.outcome(&outcome);
                    view.alert(&outcome.alert_message());
                    *state.lock() = ClientState::Revealed {
                        key,
                        outcome: outcome.clone(),
                    };
                    Some(outcome)
                }
                Ok(TaskEnd::Cancelled { .. }) => None,
                Err(e) => {
                    tracing::warn!("{}", e);
                    None
                }
            }
        });

        RevealHandle { handle, cancel }
    }
}
