//! Graceful shutdown handling.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Stops the background tasks of a run and waits for them.
///
/// `cancel` is the token watched by the progress logger and the list
/// refresher; it is separate from the run's own cancellation token so that a
/// finished run can stop its helpers without marking itself cancelled.
pub async fn shutdown_gracefully(cancel: CancellationToken, tasks: Vec<JoinHandle<()>>) {
    cancel.cancel();
    for task in tasks {
        if let Err(e) = task.await {
            log::warn!("Background task ended abnormally: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_stops_waiting_tasks() {
        let cancel = CancellationToken::new();
        let tasks = (0..3)
            .map(|_| {
                let cancel = cancel.clone();
                tokio::spawn(async move { cancel.cancelled().await })
            })
            .collect();

        tokio::time::timeout(Duration::from_secs(5), shutdown_gracefully(cancel, tasks))
            .await
            .expect("tasks stop on cancel");
    }
}
