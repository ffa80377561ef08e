use std::time::Duration;

use tether_core::constants::defaults;

#[derive(Clone, Debug)]
pub struct WatcherConfig {
    /// Delay between a status response and the next status request.
    ///
    /// Defaults to 2 seconds.
    pub poll_interval: Duration,
    /// Give up watching after this long and report the job as timed out.
    ///
    /// Defaults to [`None`], i.e. watch until the job resolves or the watcher is stopped.
    pub timeout: Option<Duration>,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: defaults::POLL_INTERVAL,
            timeout: None,
        }
    }
}

impl WatcherConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// What [`JobSession::start`](crate::JobSession::start) does while a job is still being watched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BusyPolicy {
    /// Stop watching the old job, then submit the new one.
    #[default]
    Replace,
    /// Refuse the new submission and keep watching the old job.
    Reject,
}

#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    pub watcher: WatcherConfig,
    pub on_busy: BusyPolicy,
}
