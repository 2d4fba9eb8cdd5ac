//! Studio notifications for the rendering layer.
//!
//! The orchestrator never touches the view directly; it publishes these
//! events and the view redraws from them (or from a snapshot).

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::asset::{AssetFailureKind, AssetState};

/// Coarse session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum StudioPhase {
    /// No prompts yet
    #[default]
    Idle,
    /// Prompts and script available, no images requested
    PromptsReady,
    /// At least one image slot has not succeeded
    AssetsPending,
    /// Every image slot is ready
    AssetsReady,
    /// A video has been assembled for the current assets and voiceover
    VideoReady,
}

impl StudioPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudioPhase::Idle => "idle",
            StudioPhase::PromptsReady => "prompts_ready",
            StudioPhase::AssetsPending => "assets_pending",
            StudioPhase::AssetsReady => "assets_ready",
            StudioPhase::VideoReady => "video_ready",
        }
    }
}

/// Pipeline stage an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Content,
    Prompt,
    Assets,
    Voiceover,
    Video,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Content => "content",
            Stage::Prompt => "prompt",
            Stage::Assets => "assets",
            Stage::Voiceover => "voiceover",
            Stage::Video => "video",
        }
    }
}

/// Event envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudioEvent {
    /// Prompts and script replaced
    ContentGenerated { prompt_count: usize },

    /// One prompt's text replaced
    PromptRegenerated { index: usize, text: String },

    /// Script edited or saved
    ScriptChanged { dirty: bool },

    /// A slot changed state
    AssetUpdated {
        slot: usize,
        state: AssetState,
        #[serde(skip_serializing_if = "Option::is_none")]
        source_url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        failure: Option<AssetFailureKind>,
    },

    /// Image slots, voiceover and video were cleared
    AssetsCleared,

    /// Display order changed
    AssetsReordered { order: Vec<usize> },

    /// Voiceover request in flight
    VoiceoverPending,

    /// Voiceover is ready
    VoiceoverReady { filename: String },

    /// Voiceover was reset or its request failed
    VoiceoverReset,

    /// Video assembled
    VideoReady { url: String, download_name: String },

    /// Existing video no longer reflects the current assets
    VideoInvalidated,

    /// A stage failed; the user may retry it
    StageFailed {
        stage: Stage,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl StudioEvent {
    pub fn stage_failed(stage: Stage, message: impl Into<String>) -> Self {
        Self::StageFailed {
            stage,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}
