//! # Tether Session
//!
//! Watches long-running jobs without blocking the caller.
//!
//! - **[`JobWatcher`]**: owns the poll loop of one job and emits every observation until the job resolves.
//! - **[`JobSession`]**: binds a [`JobBackend`](tether_core::traits::JobBackend) to observable state,
//!   guaranteeing at most one live watcher and no updates after [`JobSession::dispose`].
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tether_core::prelude::*;
//! use tether_session::{JobSession, SessionConfig, StartError};
//!
//! async fn run<B: JobBackend>(backend: B, request: B::Request) -> Result<(), StartError>
//! where
//!     B::Output: Clone + std::fmt::Debug,
//! {
//!     let mut session = JobSession::with_config(Arc::new(backend), SessionConfig::default());
//!     let handle = session.start(request).await?;
//!     println!("submitted {}", handle.id);
//!
//!     if let Some(state) = session.wait_terminal().await {
//!         println!("{state:?}");
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod session;
mod watcher;

pub use config::*;
pub use session::*;
pub use watcher::*;

pub mod prelude {
    pub use crate::{
        BusyPolicy, JobSession, JobWatcher, SessionConfig, SessionSnapshot, StartError,
        WatcherConfig,
    };
}
