use std::sync::Arc;
use std::time::Duration;

use tether_core::prelude::*;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::WatcherConfig;

/// Owns the poll loop of a single job.
///
/// The first status check runs immediately. Each following check is scheduled
/// only after the previous response has been handled, so at most one request
/// per job is ever in flight. Transient errors are logged and retried on the
/// next tick; they never end the watch.
///
/// Dropping the watcher stops it. The remote job keeps running.
pub struct JobWatcher {
    job_id: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl JobWatcher {
    /// Starts watching `job_id` on the current tokio runtime.
    ///
    /// `on_event` receives every observation in order and at most one
    /// [`WatchEvent::Finished`], after which no further request is made.
    pub fn spawn<S, F>(
        source: Arc<S>,
        job_id: impl Into<String>,
        config: WatcherConfig,
        on_event: F,
    ) -> Self
    where
        S: StatusSource,
        F: FnMut(WatchEvent<S::Output>) + Send + 'static,
    {
        let job_id = job_id.into();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_loop(
            source,
            job_id.clone(),
            config,
            cancel.clone(),
            on_event,
        ));

        info!(job_id = %job_id, "Watching job");
        Self {
            job_id,
            cancel,
            task,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Stops watching. An in-flight response or a pending tick is discarded.
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            debug!(job_id = %self.job_id, "Stopping watcher");
            self.cancel.cancel();
        }
    }

    /// `true` once the loop has exited, whether resolved, timed out or stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the loop to exit.
    pub async fn finished(&mut self) {
        if let Err(e) = (&mut self.task).await {
            warn!(job_id = %self.job_id, error = %e, "Watcher task ended abnormally");
        }
    }
}

impl Drop for JobWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop<S, F>(
    source: Arc<S>,
    job_id: String,
    config: WatcherConfig,
    cancel: CancellationToken,
    mut on_event: F,
) where
    S: StatusSource,
    F: FnMut(WatchEvent<S::Output>) + Send + 'static,
{
    let deadline = config.timeout.map(|timeout| Instant::now() + timeout);
    let mut failures: u32 = 0;

    loop {
        debug!(job_id = %job_id, "Checking job status");
        let report = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = expire(deadline) => break,
            report = source.fetch_status(&job_id) => report,
        };

        if cancel.is_cancelled() {
            return;
        }

        match report {
            Ok(StatusReport::Pending { status, queue }) => {
                failures = 0;
                on_event(WatchEvent::Progress { status, queue });
            }
            Ok(StatusReport::Completed(output)) => {
                cancel.cancel();
                info!(job_id = %job_id, "Job completed");
                on_event(WatchEvent::Finished(Ok(output)));
                return;
            }
            Ok(StatusReport::Failed(message)) => {
                cancel.cancel();
                info!(job_id = %job_id, reason = %message, "Job failed");
                on_event(WatchEvent::Finished(Err(JobFailure::Reported(message))));
                return;
            }
            Err(e) => {
                failures += 1;
                warn!(job_id = %job_id, failures, error = %e, "Status check failed, retrying");
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = expire(deadline) => break,
            _ = sleep(config.poll_interval) => {}
        }
    }

    // Only reachable through the deadline.
    let timeout = config.timeout.unwrap_or(Duration::ZERO);
    cancel.cancel();
    info!(job_id = %job_id, timeout_secs = timeout.as_secs(), "Gave up watching job");
    on_event(WatchEvent::Finished(Err(JobFailure::TimedOut(timeout))));
}

async fn expire(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
