use crate::view::ClientView;
use crate::{DrawRange, RaffleError, Result};
use sorteio_core::RaffleConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEnd {
    Completed { ticks: u32 },
    Cancelled { ticks: u32 },
}

/// Cancels the [`RepeatingTask`] it was taken from; usable from anywhere.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    notify: Arc<Notify>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // stores a permit if the task is between ticks
        self.notify.notify_one();
    }
}

/// Callback run every `period`, at most `max_ticks` times. The first tick
/// fires one period after spawning.
pub struct RepeatingTask {
    handle: JoinHandle<TaskEnd>,
    cancel: CancelHandle,
}

impl RepeatingTask {
    pub fn spawn<F>(period: Duration, max_ticks: u32, mut on_tick: F) -> Self
    where
        F: FnMut(u32) + Send + 'static,
    {
        let notify = Arc::new(Notify::new());
        let cancelled = notify.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut ticks = 0;
            while ticks < max_ticks {
                tokio::select! {
                    biased;
                    _ = cancelled.notified() => return TaskEnd::Cancelled { ticks },
                    _ = ticker.tick() => {
                        ticks += 1;
                        on_tick(ticks);
                    }
                }
            }
            TaskEnd::Completed { ticks }
        });

        Self {
            handle,
            cancel: CancelHandle { notify },
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub async fn finished(self) -> Result<TaskEnd> {
        self.handle
            .await
            .map_err(|e| RaffleError::Internal(format!("Repeating task failed: {}", e)))
    }
}

/// Cosmetic reveal animation: random numbers from the draw range, one per
/// period. Carries no state into the outcome.
#[derive(Debug, Clone, Copy)]
pub struct Spinner {
    period: Duration,
    frames: u32,
}

impl Spinner {
    pub fn new(period: Duration, frames: u32) -> Self {
        Self { period, frames }
    }

    pub fn from_config(config: &RaffleConfig) -> Self {
        Self::new(config.spinner_period, config.spinner_frames)
    }

    pub fn start(&self, range: DrawRange, view: Arc<dyn ClientView>) -> RepeatingTask {
        RepeatingTask::spawn(self.period, self.frames, move |_| {
            let value = range.sample(&mut rand::thread_rng());
            view.spinner_frame(value);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingView, ViewEvent};
    use parking_lot::Mutex;

    #[tokio::test]
    async fn test_runs_exact_number_of_ticks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let task = RepeatingTask::spawn(Duration::from_millis(1), 5, move |tick| {
            sink.lock().push(tick)
        });

        assert_eq!(task.finished().await.unwrap(), TaskEnd::Completed { ticks: 5 });
        assert_eq!(*seen.lock(), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_zero_ticks_completes_immediately() {
        let task = RepeatingTask::spawn(Duration::from_secs(60), 0, |_| panic!("no tick expected"));
        assert_eq!(task.finished().await.unwrap(), TaskEnd::Completed { ticks: 0 });
    }

    #[tokio::test]
    async fn test_cancel_stops_ticking() {
        let task = RepeatingTask::spawn(Duration::from_secs(60), 10, |_| {});
        let handle = task.cancel_handle();
        handle.cancel();
        assert_eq!(task.finished().await.unwrap(), TaskEnd::Cancelled { ticks: 0 });
    }

    #[tokio::test]
    async fn test_spinner_frames_stay_in_range() {
        let view = Arc::new(RecordingView::new());
        let range = DrawRange::new(3, 6).unwrap();
        let spinner = Spinner::new(Duration::from_millis(1), 21);

        let end = spinner.start(range, view.clone()).finished().await.unwrap();
        assert_eq!(end, TaskEnd::Completed { ticks: 21 });

        let frames: Vec<i64> = view
            .events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::SpinnerFrame(value) => Some(value),
                _ => None,
            })
            .collect();
        assert_eq!(frames.len(), 21);
        assert!(frames.iter().all(|value| range.contains(*value)));
    }
}
