//! # Tether Core
//!
//! Types and traits for the ecosystem.
//!
//! Defines the protocol used by clients and watchers.
//!
//! - **[`JobState`](job::JobState)**: The visible state machine of a job, `Idle | Submitting | Watching | Succeeded | Failed`.
//! - **[`JobSubmitter`](traits::JobSubmitter)**: Trait for the request that enqueues work.
//! - **[`StatusSource`](traits::StatusSource)**: Trait for the request that checks a job once.
//! - **[`Feature`](feature::Feature)**: The built-in features and their routes.

pub mod constants;
pub mod error;
pub mod feature;
pub mod job;
pub mod traits;

pub mod prelude {
    pub use super::constants::*;
    pub use super::error::*;
    pub use super::feature::*;
    pub use super::job::*;
    pub use super::traits::*;
}
