//! # Tether Mock
//!
//! A scripted job backend for development and testing.
//!
//! Every submission and status check is answered from a script and recorded,
//! so tests can assert exactly which requests a watcher made.
//!
//! **This backend never talks to a server. DO NOT use it in production!!!**
//!
//! ## Usage
//!
//! ```rust
//! # use tether_core::prelude::*;
//! # use tether_mock::ScriptedBackend;
//! # use std::time::Duration;
//! let backend = ScriptedBackend::new()
//!     .submit_ok(JobHandle::new("a1"))
//!     .poll_pending(JobStatus::Processing, QueueInfo::default())
//!     .poll_error(PollError::Network("connection reset".into()))
//!     .poll_after(Duration::from_secs(5), StatusReport::Completed("done".to_string()));
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tether_core::prelude::*;

enum Step<T> {
    Reply(Result<StatusReport<T>, PollError>),
    Delayed(Duration, Result<StatusReport<T>, PollError>),
}

struct Script<T> {
    submissions: VecDeque<Result<JobHandle, SubmissionError>>,
    polls: VecDeque<Step<T>>,
    submitted: Vec<serde_json::Value>,
    status_requests: Vec<String>,
}

/// A [`JobBackend`] answering from a script.
///
/// Submissions without a scripted answer succeed with a fresh random job id.
/// Status checks without a scripted answer fail with a transient [`PollError`].
pub struct ScriptedBackend<T = JobOutput> {
    script: Mutex<Script<T>>,
}

impl<T> Default for ScriptedBackend<T> {
    fn default() -> Self {
        Self {
            script: Mutex::new(Script {
                submissions: VecDeque::new(),
                polls: VecDeque::new(),
                submitted: Vec::new(),
                status_requests: Vec::new(),
            }),
        }
    }
}

impl<T> ScriptedBackend<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit_ok(self, handle: JobHandle) -> Self {
        self.push_submission(Ok(handle))
    }

    pub fn submit_err(self, error: SubmissionError) -> Self {
        self.push_submission(Err(error))
    }

    pub fn poll(self, report: StatusReport<T>) -> Self {
        self.push_poll(Step::Reply(Ok(report)))
    }

    pub fn poll_pending(self, status: JobStatus, queue: QueueInfo) -> Self {
        self.poll(StatusReport::Pending { status, queue })
    }

    pub fn poll_error(self, error: PollError) -> Self {
        self.push_poll(Step::Reply(Err(error)))
    }

    /// Answers the next status check only after `delay`.
    pub fn poll_after(self, delay: Duration, report: StatusReport<T>) -> Self {
        self.push_poll(Step::Delayed(delay, Ok(report)))
    }

    /// Queues another answer on a shared backend.
    pub fn push_report(&self, report: StatusReport<T>) {
        self.lock().polls.push_back(Step::Reply(Ok(report)));
    }

    /// Job ids of every status check made so far, in order.
    pub fn status_requests(&self) -> Vec<String> {
        self.lock().status_requests.clone()
    }

    /// Payloads of every submission made so far, in order.
    pub fn submitted(&self) -> Vec<serde_json::Value> {
        self.lock().submitted.clone()
    }

    fn push_submission(self, answer: Result<JobHandle, SubmissionError>) -> Self {
        self.lock().submissions.push_back(answer);
        self
    }

    fn push_poll(self, step: Step<T>) -> Self {
        self.lock().polls.push_back(step);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Script<T>> {
        // A panicking test thread must not hide the recorded requests.
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: Send + Sync + 'static> JobSubmitter for ScriptedBackend<T> {
    type Request = serde_json::Value;

    async fn submit(&self, request: serde_json::Value) -> Result<JobHandle, SubmissionError> {
        let mut script = self.lock();
        script.submitted.push(request);
        script
            .submissions
            .pop_front()
            .unwrap_or_else(|| Ok(JobHandle::new(uuid::Uuid::new_v4().to_string())))
    }
}

impl<T: Send + Sync + 'static> StatusSource for ScriptedBackend<T> {
    type Output = T;

    async fn fetch_status(&self, job_id: &str) -> Result<StatusReport<T>, PollError> {
        let step = {
            let mut script = self.lock();
            script.status_requests.push(job_id.to_string());
            script.polls.pop_front()
        };

        match step {
            Some(Step::Reply(answer)) => answer,
            Some(Step::Delayed(delay, answer)) => {
                tokio::time::sleep(delay).await;
                answer
            }
            None => Err(PollError::Network("no scripted response".into())),
        }
    }
}
