//! # Tether Client
//!
//! An async HTTP client that submits jobs to a media generation backend and checks their status.
//!
//! Every feature exposes two routes, one to enqueue work and one to look a job up by id.
//! [`FeatureJobs`] binds a [`TetherClient`] to such a pair and implements both
//! [`JobSubmitter`] and [`StatusSource`], so it can be handed straight to a job session.
//!
//! ## Example: Text-to-Speech
//!
//! ```no_run
//!  use tether_client::TetherClient;
//!  use tether_core::prelude::*;
//!
//!  async fn run() -> Result<(), SubmissionError> {
//!     let client = TetherClient::new("http://localhost:3000", Some("my-token".into()));
//!     let speech = client.speech();
//!
//!     let handle = speech
//!         .submit(SpeechRequest {
//!             text: "Hello there".into(),
//!             voice_id: "narrator".into(),
//!         })
//!         .await?;
//!
//!     match speech.fetch_status(&handle.id).await {
//!         Ok(StatusReport::Completed(JobOutput::Binary { data, .. })) => {
//!             println!("{} bytes of audio", data.len());
//!         }
//!         Ok(report) => println!("{report:?}"),
//!         Err(e) => println!("will retry: {e}"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod wire;

use std::marker::PhantomData;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use tether_core::prelude::{routes::*, *};
use tracing::debug;

/// The submit and status routes of one feature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    /// e.g. `/api/video/generate`
    pub submit: String,
    /// e.g. `/api/video/status/{id}`. Without an `{id}` placeholder the id is appended as a path segment.
    pub status: String,
}

impl Endpoints {
    pub fn new(submit: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            submit: submit.into(),
            status: status.into(),
        }
    }

    pub fn status_path(&self, job_id: &str) -> String {
        if self.status.contains(ID_PLACEHOLDER) {
            self.status.replace(ID_PLACEHOLDER, job_id)
        } else {
            format!("{}/{}", self.status.trim_end_matches('/'), job_id)
        }
    }
}

impl From<Feature> for Endpoints {
    fn from(feature: Feature) -> Self {
        Self::new(feature.submit_route(), feature.status_route())
    }
}

#[derive(Clone)]
pub struct TetherClient {
    base_url: String,
    client: Client,
    token: Option<String>,
}

impl TetherClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self::from_parts(base_url, Client::new(), token)
    }

    /// Like [`TetherClient::new`], but every request fails after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::from_parts(base_url, client, token))
    }

    fn from_parts(base_url: impl Into<String>, client: Client, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client,
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_request(&self, builder: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.token {
            builder.header("Authorization", format!("Bearer {token}"))
        } else {
            builder
        }
    }

    /// Jobs of an arbitrary endpoint pair with payload type `R`.
    pub fn jobs<R>(&self, endpoints: impl Into<Endpoints>) -> FeatureJobs<R> {
        FeatureJobs {
            client: self.clone(),
            endpoints: endpoints.into(),
            _request: PhantomData,
        }
    }

    pub fn video(&self) -> FeatureJobs<VideoRequest> {
        self.jobs(Feature::Video)
    }

    pub fn image(&self) -> FeatureJobs<ImageRequest> {
        self.jobs(Feature::Image)
    }

    pub fn speech(&self) -> FeatureJobs<SpeechRequest> {
        self.jobs(Feature::Speech)
    }

    pub fn audio_mount(&self) -> FeatureJobs<AudioMountRequest> {
        self.jobs(Feature::AudioMount)
    }

    pub fn script(&self) -> FeatureJobs<ScriptRequest> {
        self.jobs(Feature::Script)
    }

    pub fn image_prompt(&self) -> FeatureJobs<ImagePromptRequest> {
        self.jobs(Feature::ImagePrompt)
    }

    /// `POST`s `body` to `path` and parses the job handle.
    pub async fn submit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<JobHandle, SubmissionError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Submitting job");

        let response = self
            .auth_request(self.client.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| SubmissionError::Network(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SubmissionError::Network(e.to_string()))?;

        wire::parse_submit(status, &bytes)
    }

    /// `GET`s `path` and classifies the status response.
    pub async fn fetch_status(&self, path: &str) -> Result<StatusReport<JobOutput>, PollError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .auth_request(self.client.get(&url))
            .send()
            .await
            .map_err(|e| PollError::Network(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PollError::Network(e.to_string()))?;

        debug!(url = %url, %status, content_type = ?content_type, len = bytes.len(), "Status response");
        wire::classify_status(status, content_type.as_deref(), bytes)
    }
}

/// A [`TetherClient`] bound to the routes of one feature.
pub struct FeatureJobs<R> {
    client: TetherClient,
    endpoints: Endpoints,
    _request: PhantomData<fn(R)>,
}

impl<R> Clone for FeatureJobs<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            endpoints: self.endpoints.clone(),
            _request: PhantomData,
        }
    }
}

impl<R> FeatureJobs<R> {
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

impl<R> JobSubmitter for FeatureJobs<R>
where
    R: Serialize + Send + Sync + 'static,
{
    type Request = R;

    async fn submit(&self, request: R) -> Result<JobHandle, SubmissionError> {
        self.client.submit(&self.endpoints.submit, &request).await
    }
}

impl<R: 'static> StatusSource for FeatureJobs<R> {
    type Output = JobOutput;

    async fn fetch_status(&self, job_id: &str) -> Result<StatusReport<JobOutput>, PollError> {
        self.client
            .fetch_status(&self.endpoints.status_path(job_id))
            .await
    }
}
