use crate::{RaffleError, Result};
use std::future::Future;
use tokio::task::JoinHandle;

/// Completion handle of a store write running in the background.
///
/// Dropping it detaches the write; failures are still logged. Callers that
/// need durability await [`PendingWrite::wait`].
#[derive(Debug)]
pub struct PendingWrite<T> {
    handle: JoinHandle<Result<T>>,
}

impl<T: Send + 'static> PendingWrite<T> {
    pub(crate) fn spawn<F>(what: &'static str, write: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let result = write.await;
            if let Err(e) = &result {
                tracing::warn!("{} failed: {}", what, e);
            }
            result
        });
        Self { handle }
    }

    pub async fn wait(self) -> Result<T> {
        self.handle
            .await
            .map_err(|e| RaffleError::Internal(format!("Write task failed: {}", e)))?
    }
}
