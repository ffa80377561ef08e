use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::routes::*;

/// The built-in media features backed by a job queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Text-to-video.
    Video,
    /// Text-to-image and image editing.
    Image,
    /// Text-to-speech. Completes with a binary audio body.
    Speech,
    /// Mounting an audio track onto a video.
    AudioMount,
    /// Script generation.
    Script,
    /// Image-to-prompt.
    ImagePrompt,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::Video,
        Feature::Image,
        Feature::Speech,
        Feature::AudioMount,
        Feature::Script,
        Feature::ImagePrompt,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Feature::Video => "video",
            Feature::Image => "image",
            Feature::Speech => "speech",
            Feature::AudioMount => "audio-mount",
            Feature::Script => "script",
            Feature::ImagePrompt => "image-prompt",
        }
    }

    /// `POST` route that enqueues a job.
    pub fn submit_route(&self) -> &'static str {
        match self {
            Feature::Video => VIDEO_SUBMIT,
            Feature::Image => IMAGE_SUBMIT,
            Feature::Speech => SPEECH_SUBMIT,
            Feature::AudioMount => AUDIO_MOUNT_SUBMIT,
            Feature::Script => SCRIPT_SUBMIT,
            Feature::ImagePrompt => IMAGE_PROMPT_SUBMIT,
        }
    }

    /// `GET` route for a job's status, with an `{id}` placeholder.
    pub fn status_route(&self) -> &'static str {
        match self {
            Feature::Video => VIDEO_STATUS,
            Feature::Image => IMAGE_STATUS,
            Feature::Speech => SPEECH_STATUS,
            Feature::AudioMount => AUDIO_MOUNT_STATUS,
            Feature::Script => SCRIPT_STATUS,
            Feature::ImagePrompt => IMAGE_PROMPT_STATUS,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Feature::ALL.iter().map(Feature::name).collect();
                format!("unknown feature '{s}', expected one of: {}", names.join(", "))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    pub prompt: String,
    /// e.g. "standard", "high"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// e.g. "16:9"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    pub prompt: String,
    /// Source image when editing instead of generating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    pub text: String,
    pub voice_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AudioMountRequest {
    pub audio_url: String,
    pub video_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImagePromptRequest {
    pub image_url: String,
}
