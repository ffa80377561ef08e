//! # Tether
//!
//!> *Submit it, walk away, get called back*
//!
//! Client-side orchestration of long-running media generation jobs. A job is enqueued with one
//! request, then checked at a fixed interval until the server reports a result or a failure.
//! The caller never blocks on it and sees every queue update along the way.
//!
//! This crate serves as an entry point, re-exporting the core types and
//! optionally including the HTTP client, the session layer and a scripted backend via feature flags.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | **`session`** | Job watchers and sessions on top of any backend (`tether_session`). Enabled by default. |
//! | **`client`** | The reqwest-based HTTP backend (`tether_client`). |
//! | **`mock`** | A scripted backend for development and tests (`tether_mock`). |
//!
//! ## Example: Generate a video
//!
//! ```toml
//! [dependencies]
//! tether = { version = "0.3", features = ["client", "session"] }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tether::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StartError> {
//!     let client = TetherClient::new("http://localhost:3000", None);
//!     let mut session = JobSession::new(Arc::new(client.video()));
//!
//!     // Submit
//!     session
//!         .start(VideoRequest {
//!             prompt: "a fox running through snow".into(),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     // Watch
//!     match session.wait_terminal().await {
//!         Some(JobState::Succeeded { result }) => println!("{:?}", result.str_field("url")),
//!         Some(JobState::Failed { error }) => println!("{error}"),
//!         _ => {}
//!     }
//!     Ok(())
//! }
//! ```

pub use tether_core::*;

#[cfg(feature = "client")]
pub mod client {
    pub use tether_client::*;
}

#[cfg(feature = "session")]
pub mod session {
    pub use tether_session::*;
}

#[cfg(feature = "mock")]
pub mod mock {
    pub use tether_mock::*;
}

pub mod prelude {
    pub use tether_core::prelude::*;

    #[cfg(feature = "client")]
    pub use tether_client::{Endpoints, FeatureJobs, TetherClient};

    #[cfg(feature = "session")]
    pub use tether_session::prelude::*;

    #[cfg(feature = "mock")]
    pub use tether_mock::ScriptedBackend;
}
