//! The seam between the orchestrator and the generation services.

use async_trait::async_trait;
use shorts_models::wire::{CreateVideoRequest, ImageRequest, PromptsRequest, ScriptRequest, VoiceoverRequest};

use crate::error::{ServiceError, ServiceResult};

/// A video the assembly service produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledVideo {
    /// Playable URL
    pub url: String,
    /// Filename the service wrote
    pub filename: String,
}

/// External services the studio depends on.
///
/// `HttpBackend` talks to the real services; `DemoBackend` fabricates
/// plausible answers offline.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &'static str;

    /// Ask for `num_prompts` image prompts. Empty lists are an error.
    async fn generate_prompts(&self, request: &PromptsRequest) -> ServiceResult<Vec<String>>;

    /// Ask for one replacement prompt for an existing slot.
    ///
    /// By default this is a single-prompt `generate_prompts` call.
    async fn regenerate_prompt(&self, request: &PromptsRequest) -> ServiceResult<String> {
        let single = PromptsRequest {
            video_idea: request.video_idea.clone(),
            num_prompts: 1,
        };
        self.generate_prompts(&single)
            .await?
            .into_iter()
            .map(|p| p.trim().to_string())
            .find(|p| !p.is_empty())
            .ok_or_else(|| ServiceError::empty_result("no prompt was generated"))
    }

    /// Ask for a narration script. Empty scripts are an error.
    async fn generate_script(&self, request: &ScriptRequest) -> ServiceResult<String>;

    /// Submit one image for generation under `request.save_name`.
    async fn request_image(&self, request: &ImageRequest) -> ServiceResult<()>;

    /// Locate the image produced for `request`, returning a cache-busted URL.
    async fn retrieve_image(&self, request: &ImageRequest) -> ServiceResult<String>;

    /// Generate the voiceover, returning the audio filename.
    async fn generate_voiceover(&self, request: &VoiceoverRequest) -> ServiceResult<String>;

    /// Assemble the final video from the session's images and voiceover.
    async fn create_video(&self, request: &CreateVideoRequest) -> ServiceResult<AssembledVideo>;
}
