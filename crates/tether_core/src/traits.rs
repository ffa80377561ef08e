use crate::error::*;
use crate::job::*;

/// A trait for injecting the "start job" operation of a feature.
pub trait JobSubmitter: Send + Sync + 'static {
    /// The feature-specific payload, already validated by the caller.
    type Request: Send;

    /// Enqueues work and returns its handle.
    ///
    /// Performs exactly one request and does not touch any UI state.
    fn submit(
        &self,
        request: Self::Request,
    ) -> impl Future<Output = Result<JobHandle, SubmissionError>> + Send;
}

/// A trait for injecting the "fetch status" operation of a feature.
pub trait StatusSource: Send + Sync + 'static {
    /// The feature-specific result of a completed job.
    type Output: Send + Sync + 'static;

    /// Checks a job once and classifies the response.
    ///
    /// Any error returned here is treated as transient by the watcher.
    fn fetch_status(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<StatusReport<Self::Output>, PollError>> + Send;
}

/// Anything that can both start and check jobs.
pub trait JobBackend: JobSubmitter + StatusSource {}

impl<T> JobBackend for T where T: JobSubmitter + StatusSource {}
