//! Voiceover and assembled video.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Voiceover lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VoiceoverState {
    /// Nothing generated, or the previous one went stale
    #[default]
    None,
    Pending,
    Ready,
    Failed,
}

impl VoiceoverState {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceoverState::None => "none",
            VoiceoverState::Pending => "pending",
            VoiceoverState::Ready => "ready",
            VoiceoverState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for VoiceoverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The session's single voiceover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Voiceover {
    pub state: VoiceoverState,
    /// Audio filename, set only while `Ready`
    pub filename: Option<String>,
    /// Bumped whenever a request starts or the script goes stale
    pub generation: u64,
}

impl Voiceover {
    pub fn is_ready(&self) -> bool {
        self.state == VoiceoverState::Ready
    }

    /// Enter `Pending`, dropping any previous result. Returns the new generation.
    pub fn start(&mut self) -> u64 {
        self.generation += 1;
        self.state = VoiceoverState::Pending;
        self.filename = None;
        self.generation
    }

    /// Reset to `None` and supersede any in-flight request.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.state = VoiceoverState::None;
        self.filename = None;
    }

    pub fn mark_ready(&mut self, filename: impl Into<String>) {
        self.state = VoiceoverState::Ready;
        self.filename = Some(filename.into());
    }

    pub fn mark_failed(&mut self) {
        self.state = VoiceoverState::Failed;
        self.filename = None;
    }
}

/// Assembled video, shown and linked only in the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Video {
    /// Playable URL
    pub url: String,
    /// Suggested download filename
    pub download_name: String,
}
