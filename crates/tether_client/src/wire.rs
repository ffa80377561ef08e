//! Parsing of submit and status responses.
//!
//! Kept free of any I/O so every response shape can be tested directly.

use bytes::Bytes;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tether_core::prelude::*;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    job_id: Option<String>,
    #[serde(flatten)]
    queue: QueueInfo,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn reason(self) -> Option<String> {
        self.message.or(self.error)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    status: JobStatus,
    #[serde(flatten)]
    queue: QueueInfo,
    #[serde(default)]
    error: Value,
    #[serde(default)]
    message: Value,
}

impl StatusBody {
    /// The failure reason, from either a plain string or an object with a `message`.
    fn reason(&self) -> Option<String> {
        [&self.error, &self.message].into_iter().find_map(reason_text)
    }
}

fn reason_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Object(fields) => fields
            .get("message")
            .or_else(|| fields.get("error"))
            .and_then(reason_text),
        _ => None,
    }
}

/// Turns a submit response into a [`JobHandle`].
pub fn parse_submit(status: StatusCode, body: &[u8]) -> Result<JobHandle, SubmissionError> {
    if !status.is_success() {
        let reason = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::reason);
        return Err(SubmissionError::rejected(status.as_u16(), reason));
    }

    let response: SubmitResponse = serde_json::from_slice(body)
        .map_err(|e| SubmissionError::Malformed(e.to_string()))?;

    match response.job_id {
        Some(id) if !id.trim().is_empty() => Ok(JobHandle {
            id,
            queue: response.queue,
        }),
        _ => Err(SubmissionError::MissingJobId),
    }
}

/// Classifies one status response.
///
/// A successful response with a binary media content type is the completion
/// signal of features that return their result directly. Everything else must
/// be a JSON object carrying a `status` field; a non-success response without
/// one is a transient error.
pub fn classify_status(
    status: StatusCode,
    content_type: Option<&str>,
    body: Bytes,
) -> Result<StatusReport<JobOutput>, PollError> {
    if status.is_success() {
        if let Some(content_type) = content_type.filter(|ct| is_binary_media(ct)) {
            return Ok(StatusReport::Completed(JobOutput::Binary {
                content_type: content_type.to_string(),
                data: body,
            }));
        }
    }

    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => {
            return Err(PollError::Http {
                status: status.as_u16(),
            });
        }
        Err(e) => return Err(PollError::Malformed(e.to_string())),
    };

    let Value::Object(mut fields) = value else {
        return Err(non_status(status, "expected a JSON object"));
    };

    let parsed = match StatusBody::deserialize(Value::Object(fields.clone())) {
        Ok(parsed) => parsed,
        Err(e) => return Err(non_status(status, &e.to_string())),
    };

    Ok(match parsed.status {
        JobStatus::Queued | JobStatus::Processing => StatusReport::Pending {
            status: parsed.status,
            queue: parsed.queue,
        },
        JobStatus::Completed => {
            fields.remove("status");
            StatusReport::Completed(JobOutput::Json(Value::Object(fields)))
        }
        JobStatus::Failed => StatusReport::Failed(JobFailure::reported(parsed.reason()).to_string()),
    })
}

fn non_status(status: StatusCode, detail: &str) -> PollError {
    if status.is_success() {
        PollError::Malformed(detail.to_string())
    } else {
        PollError::Http {
            status: status.as_u16(),
        }
    }
}

/// `audio/*`, `video/*`, `image/*` and `application/octet-stream`.
pub fn is_binary_media(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    ["audio/", "video/", "image/"]
        .iter()
        .any(|prefix| essence.starts_with(prefix))
        || essence == "application/octet-stream"
}
