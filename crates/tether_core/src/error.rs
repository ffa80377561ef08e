use std::time::Duration;

use thiserror::Error;

use crate::constants::messages;

/// The initial request that enqueues work failed.
///
/// Fatal to the submission attempt: no watcher is started and the caller has to
/// submit again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// The server answered with a non-success status.
    /// `message` is the server-provided reason, or a generic message if there was none.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The server accepted the request but the response carried no job identifier.
    #[error("Server response did not contain a job id")]
    MissingJobId,

    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("{}", messages::SUBMISSION_FAILED)]
    Network(String),

    /// The response body could not be parsed.
    #[error("Failed to parse submission response: {0}")]
    Malformed(String),
}

impl SubmissionError {
    /// Builds a [`SubmissionError::Rejected`], falling back to the generic message.
    pub fn rejected(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| messages::SUBMISSION_FAILED.to_string());
        Self::Rejected { status, message }
    }
}

/// A single status check failed.
///
/// Always transient: a watcher logs it and tries again on the next tick.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success status without a recognizable job status in the body.
    #[error("Server returned status {status}")]
    Http { status: u16 },

    #[error("Malformed status response: {0}")]
    Malformed(String),
}

/// The job itself ended unsuccessfully.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobFailure {
    /// The backend reported `status: "failed"`.
    #[error("{0}")]
    Reported(String),

    /// The job did not reach a terminal status within the configured timeout.
    /// The remote job is not cancelled.
    #[error("Job did not finish within {}s", .0.as_secs())]
    TimedOut(Duration),
}

impl JobFailure {
    /// Builds a [`JobFailure::Reported`], falling back to the generic message.
    pub fn reported(message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| messages::JOB_FAILED.to_string());
        Self::Reported(message)
    }
}

/// Any fatal error a job session surfaces to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Job(#[from] JobFailure),
}
