//! Read-only view of a session.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::asset::Asset;
use crate::content::{Prompt, Script};
use crate::event::StudioPhase;
use crate::identity::SessionId;
use crate::media::{Video, Voiceover};

/// Everything the view needs to redraw the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StudioSnapshot {
    pub session_id: SessionId,
    pub phase: StudioPhase,
    pub idea: Option<String>,
    pub prompts: Vec<Prompt>,
    pub script: Script,
    /// Slots in display order
    pub assets: Vec<Asset>,
    pub all_complete: bool,
    pub voiceover: Voiceover,
    pub video: Option<Video>,
    pub can_create_video: bool,
}

impl StudioSnapshot {
    /// Ready images in display order.
    pub fn ready_sources(&self) -> Vec<&str> {
        self.assets
            .iter()
            .filter_map(|a| a.source_url.as_deref())
            .collect()
    }
}
