use std::sync::Arc;

use tether_core::prelude::*;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::{BusyPolicy, SessionConfig};
use crate::watcher::JobWatcher;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    /// Another job is still being watched and the session rejects new work.
    #[error("Job {job_id} is still running")]
    Busy { job_id: String },

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// What a UI surface renders for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot<T> {
    /// The job currently being watched. Cleared once it resolves.
    pub handle: Option<JobHandle>,
    pub state: JobState<T>,
    generation: u64,
}

impl<T> Default for SessionSnapshot<T> {
    fn default() -> Self {
        Self {
            handle: None,
            state: JobState::Idle,
            generation: 0,
        }
    }
}

/// Binds a [`JobBackend`] to observable UI state.
///
/// A session watches at most one job at a time. Its state is published through a
/// [`watch`] channel, see [`JobSession::subscribe`]. Dropping the session is the
/// same as calling [`JobSession::dispose`].
pub struct JobSession<B: JobBackend> {
    backend: Arc<B>,
    config: SessionConfig,
    shared: Arc<watch::Sender<SessionSnapshot<B::Output>>>,
    watcher: Option<JobWatcher>,
}

impl<B: JobBackend> JobSession<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_config(backend, SessionConfig::default())
    }

    pub fn with_config(backend: Arc<B>, config: SessionConfig) -> Self {
        let (shared, _) = watch::channel(SessionSnapshot::default());
        Self {
            backend,
            config,
            shared: Arc::new(shared),
            watcher: None,
        }
    }

    /// Submits `request` and starts watching the resulting job.
    ///
    /// On a submission failure the error is stored in the session state as well
    /// as returned, and no watcher is started.
    pub async fn start(&mut self, request: B::Request) -> Result<JobHandle, StartError> {
        if let Some(job_id) = self.active_job_id().map(str::to_owned) {
            match self.config.on_busy {
                BusyPolicy::Reject => return Err(StartError::Busy { job_id }),
                BusyPolicy::Replace => {
                    info!(job_id = %job_id, "Replacing job that is still being watched");
                }
            }
        }
        self.stop_watcher();

        let generation = self.advance(|snapshot| {
            snapshot.handle = None;
            snapshot.state = JobState::Submitting;
        });

        let handle = match self.backend.submit(request).await {
            Ok(handle) => handle,
            Err(e) => {
                info!(error = %e, "Submission failed");
                self.update(generation, |snapshot| {
                    snapshot.state = JobState::Failed {
                        error: e.clone().into(),
                    };
                    true
                });
                return Err(e.into());
            }
        };

        debug!(job_id = %handle.id, queue = ?handle.queue, "Job submitted");
        self.update(generation, |snapshot| {
            snapshot.state = JobState::watching(&handle);
            snapshot.handle = Some(handle.clone());
            true
        });

        let shared = Arc::clone(&self.shared);
        self.watcher = Some(JobWatcher::spawn(
            Arc::clone(&self.backend),
            handle.id.clone(),
            self.config.watcher.clone(),
            move |event| {
                apply_event(&shared, generation, event);
            },
        ));

        Ok(handle)
    }

    /// Stops watching without touching the remote job.
    ///
    /// A job in progress is forgotten and the state returns to [`JobState::Idle`].
    /// No further state updates are published for it, even if a response is
    /// already on its way. A resolved outcome is kept.
    pub fn dispose(&mut self) {
        if let Some(watcher) = self.watcher.as_ref() {
            info!(job_id = %watcher.job_id(), "Disposing job session");
        }
        self.advance(|snapshot| {
            if snapshot.state.is_active() {
                snapshot.state = JobState::Idle;
            }
            snapshot.handle = None;
        });
        self.stop_watcher();
    }

    /// Returns a resolved session to [`JobState::Idle`], e.g. after the user
    /// closed an error message. Has no effect while a job is in progress.
    pub fn dismiss(&mut self) {
        self.shared.send_if_modified(|snapshot| {
            if !snapshot.state.is_terminal() {
                return false;
            }
            snapshot.state = JobState::Idle;
            true
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot<B::Output>> {
        self.shared.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot<B::Output>
    where
        B::Output: Clone,
    {
        self.shared.borrow().clone()
    }

    /// The id of the job still being watched, if any.
    ///
    /// Follows the published state, so a job counts as done as soon as a
    /// subscriber can see its outcome.
    pub fn active_job_id(&self) -> Option<&str> {
        let watching = matches!(self.shared.borrow().state, JobState::Watching { .. });
        self.watcher
            .as_ref()
            .filter(|watcher| watching && !watcher.is_finished())
            .map(JobWatcher::job_id)
    }

    pub fn is_watching(&self) -> bool {
        self.active_job_id().is_some()
    }

    /// Waits until the current job resolves, returning the terminal state.
    ///
    /// Returns [`None`] if the session is idle or its state was invalidated
    /// while waiting.
    pub async fn wait_terminal(&mut self) -> Option<JobState<B::Output>>
    where
        B::Output: Clone,
    {
        let mut rx = self.subscribe();
        let generation = {
            let current = rx.borrow();
            match &current.state {
                JobState::Idle => return None,
                state if state.is_terminal() => return Some(state.clone()),
                _ => current.generation,
            }
        };

        let snapshot = rx
            .wait_for(|s| s.generation != generation || s.state.is_terminal())
            .await
            .ok()?;
        if snapshot.generation != generation {
            return None;
        }
        let state = snapshot.state.clone();
        drop(snapshot);

        self.reap();
        Some(state)
    }

    fn stop_watcher(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.stop();
        }
    }

    fn reap(&mut self) {
        if self.watcher.as_ref().is_some_and(JobWatcher::is_finished) {
            self.watcher = None;
        }
    }

    /// Invalidates every callback of earlier watchers.
    fn advance(&self, f: impl FnOnce(&mut SessionSnapshot<B::Output>)) -> u64 {
        let mut generation = 0;
        self.shared.send_modify(|snapshot| {
            snapshot.generation += 1;
            generation = snapshot.generation;
            f(snapshot);
        });
        generation
    }

    fn update(
        &self,
        generation: u64,
        f: impl FnOnce(&mut SessionSnapshot<B::Output>) -> bool,
    ) -> bool {
        update_snapshot(&self.shared, generation, f)
    }
}

impl<B: JobBackend> Drop for JobSession<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn apply_event<T>(shared: &watch::Sender<SessionSnapshot<T>>, generation: u64, event: WatchEvent<T>) {
    let finished = matches!(event, WatchEvent::Finished(_));
    update_snapshot(shared, generation, |snapshot| {
        let changed = snapshot.state.apply(event);
        if changed && finished {
            snapshot.handle = None;
        }
        changed
    });
}

fn update_snapshot<T>(
    shared: &watch::Sender<SessionSnapshot<T>>,
    generation: u64,
    f: impl FnOnce(&mut SessionSnapshot<T>) -> bool,
) -> bool {
    shared.send_if_modified(|snapshot| {
        if snapshot.generation != generation {
            return false;
        }
        f(snapshot)
    })
}
