pub mod routes {
    pub const HEALTH: &str = "/health";

    pub const VIDEO_SUBMIT: &str = "/api/video/generate";
    pub const VIDEO_STATUS: &str = "/api/video/status/{id}";

    pub const IMAGE_SUBMIT: &str = "/api/image/generate";
    pub const IMAGE_STATUS: &str = "/api/image/status/{id}";

    pub const SPEECH_SUBMIT: &str = "/api/tts/generate";
    pub const SPEECH_STATUS: &str = "/api/tts/status/{id}";

    pub const AUDIO_MOUNT_SUBMIT: &str = "/api/audio-mount/generate";
    pub const AUDIO_MOUNT_STATUS: &str = "/api/audio-mount/status/{id}";

    pub const SCRIPT_SUBMIT: &str = "/api/script/generate";
    pub const SCRIPT_STATUS: &str = "/api/script/status/{id}";

    pub const IMAGE_PROMPT_SUBMIT: &str = "/api/image-to-prompt/generate";
    pub const IMAGE_PROMPT_STATUS: &str = "/api/image-to-prompt/status/{id}";

    /// Placeholder substituted with the job id in status routes.
    pub const ID_PLACEHOLDER: &str = "{id}";
}

pub mod messages {
    /// Shown when a submission fails and the server gave no reason.
    pub const SUBMISSION_FAILED: &str = "Network error, please try again";

    /// Shown when a job fails and the server gave no reason.
    pub const JOB_FAILED: &str = "Job failed";
}

pub mod defaults {
    use std::time::Duration;

    /// Delay between the end of one status check and the start of the next.
    pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
}
