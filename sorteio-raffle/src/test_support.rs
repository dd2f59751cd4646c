use crate::view::{AdminView, ClientView, Outcome};
use parking_lot::Mutex;
use sorteio_core::HistoryEntry;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    ParticipantCount(usize),
    LastDraw(i64),
    RepeatWinners(Vec<i64>),
    SpinnerFrame(i64),
    Outcome(Outcome),
    Alert(String),
}

/// View that records every call, for both surfaces.
#[derive(Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Alert(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Outcome(outcome) => Some(outcome),
                _ => None,
            })
            .collect()
    }

    /// Poll until `done` holds for the recorded events, failing after 5s.
    pub async fn wait_until<F>(&self, what: &str, done: F)
    where
        F: Fn(&[ViewEvent]) -> bool,
    {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            if done(&self.events.lock()) {
                return;
            }
            if tokio::time::Instant::now() > deadline {
                panic!("timed out waiting for {}: {:?}", what, self.events());
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn record(&self, event: ViewEvent) {
        self.events.lock().push(event);
    }
}

impl AdminView for RecordingView {
    fn participant_count(&self, count: usize) {
        self.record(ViewEvent::ParticipantCount(count));
    }

    fn last_draw(&self, number: i64) {
        self.record(ViewEvent::LastDraw(number));
    }

    fn repeat_winners(&self, entries: &[HistoryEntry]) {
        self.record(ViewEvent::RepeatWinners(
            entries.iter().map(|entry| entry.draw.number).collect(),
        ));
    }

    fn alert(&self, message: &str) {
        self.record(ViewEvent::Alert(message.to_string()));
    }
}

impl ClientView for RecordingView {
    fn participant_count(&self, count: usize) {
        self.record(ViewEvent::ParticipantCount(count));
    }

    fn spinner_frame(&self, value: i64) {
        self.record(ViewEvent::SpinnerFrame(value));
    }

    fn outcome(&self, outcome: &Outcome) {
        self.record(ViewEvent::Outcome(outcome.clone()));
    }

    fn alert(&self, message: &str) {
        self.record(ViewEvent::Alert(message.to_string()));
    }
}
