use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{JobError, JobFailure};

/// The status of a remote job, taken verbatim from the latest status response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// `completed` and `failed` end a job's observation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Advisory queue metadata returned alongside non-terminal statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueueInfo {
    /// 1-based, `1` means "next to run".
    pub position: Option<u32>,
    /// Total jobs contending for the same resource.
    pub queue_length: Option<u32>,
    /// Re-estimated on every poll.
    #[serde(rename = "estimatedWaitTime")]
    pub estimated_wait_seconds: Option<u64>,
}

impl QueueInfo {
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.queue_length.is_none() && self.estimated_wait_seconds.is_none()
    }
}

/// The handle returned by a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobHandle {
    /// Opaque id issued by the backend; the only key for status lookups.
    pub id: String,
    /// Queue metadata observed at submission time.
    pub queue: QueueInfo,
}

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            queue: QueueInfo::default(),
        }
    }

    pub fn with_queue(mut self, queue: QueueInfo) -> Self {
        self.queue = queue;
        self
    }
}

/// One classified status response.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusReport<T> {
    /// `queued` or `processing`.
    Pending { status: JobStatus, queue: QueueInfo },
    Completed(T),
    /// The server-provided failure message, already defaulted.
    Failed(String),
}

impl<T> StatusReport<T> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending { .. })
    }
}

/// The result of a job served over HTTP.
///
/// Its shape is feature specific, so it is kept opaque here.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutput {
    /// Every field of a `completed` status object except `status` itself.
    Json(serde_json::Value),
    /// A raw media body, e.g. synthesized speech.
    Binary { content_type: String, data: Bytes },
}

impl JobOutput {
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary { .. })
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Binary { .. } => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Binary { data, .. } => Some(data),
            Self::Json(_) => None,
        }
    }

    /// Reads a top-level string field, e.g. `url` or `script`.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.as_json()?.get(key)?.as_str()
    }

    /// Deserializes a JSON result into a feature-specific type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.as_json()
            .map(|value| serde_json::from_value(value.clone()))
    }
}

/// What a watcher emits for every observation it makes.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent<T> {
    Progress { status: JobStatus, queue: QueueInfo },
    /// Emitted at most once per watched job.
    Finished(Result<T, JobFailure>),
}

/// The visible state of a job as seen by a UI surface.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState<T> {
    Idle,
    Submitting,
    Watching {
        status: JobStatus,
        queue: QueueInfo,
        updated_at: DateTime<Utc>,
    },
    Succeeded {
        result: T,
    },
    Failed {
        error: JobError,
    },
}

impl<T> Default for JobState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> JobState<T> {
    /// Enters [`JobState::Watching`] with the metadata of a fresh handle.
    pub fn watching(handle: &JobHandle) -> Self {
        Self::Watching {
            status: JobStatus::Queued,
            queue: handle.queue,
            updated_at: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    /// Submitting or watching.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Submitting | Self::Watching { .. })
    }

    pub fn queue(&self) -> Option<&QueueInfo> {
        match self {
            Self::Watching { queue, .. } => Some(queue),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            Self::Succeeded { result } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&JobError> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Applies a watcher event. Returns whether the state changed.
    ///
    /// Only a watching state accepts events, so a late or duplicate observation
    /// can never overwrite a terminal outcome.
    pub fn apply(&mut self, event: WatchEvent<T>) -> bool {
        if !matches!(self, Self::Watching { .. }) {
            return false;
        }

        *self = match event {
            WatchEvent::Progress { status, queue } => Self::Watching {
                status,
                queue,
                updated_at: Utc::now(),
            },
            WatchEvent::Finished(Ok(result)) => Self::Succeeded { result },
            WatchEvent::Finished(Err(failure)) => Self::Failed {
                error: failure.into(),
            },
        };
        true
    }
}
