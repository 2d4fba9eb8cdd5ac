//! Offline backend that fabricates plausible answers.
//!
//! Used for demos and tests. Faults can be injected per image slot (by the
//! 1-based slot number encoded in the save name) and per stage.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use shorts_models::wire::{CreateVideoRequest, ImageRequest, PromptsRequest, ScriptRequest, VoiceoverRequest};
use shorts_models::{AssetFailureKind, FilenameBase};
use tokio::sync::RwLock;
use tracing::debug;

use crate::backend::{AssembledVideo, GenerationBackend};
use crate::error::{ServiceError, ServiceResult};

/// Canned prompts for the waterfall example.
pub const DEMO_PROMPTS: [&str; 5] = [
    "A breathtaking view of Niagara Falls from the Canadian side with rainbow in the mist",
    "Angel Falls in Venezuela cascading down the tabletop mountain",
    "Iguazu Falls with its hundreds of cascades surrounded by lush rainforest",
    "Victoria Falls with its massive curtain of water creating a permanent rainbow",
    "Plitvice Lakes waterfalls in Croatia with their turquoise waters and lush surroundings",
];

/// Canned narration script.
pub const DEMO_SCRIPT: &str = "Demo script:\n\n\
1. Introduction to the world's most beautiful waterfalls\n\
2. Showcase each waterfall with interesting facts\n\
3. Closing thoughts and call to action";

/// Replacement text for a single regenerated prompt.
pub const DEMO_REGENERATED_PROMPT: &str = "New demo prompt showing a different angle of the location";

const DEMO_IMAGE_HOST: &str = "https://source.unsplash.com/random";

/// Failures to inject into the demo backend.
#[derive(Debug, Clone, Default)]
pub struct DemoFaults {
    /// 1-based slot number -> how that slot's image fails
    pub images: HashMap<usize, AssetFailureKind>,
    pub content: bool,
    pub voiceover: bool,
    pub video: bool,
}

/// Backend that never touches the network.
#[derive(Debug, Default)]
pub struct DemoBackend {
    delay: Duration,
    faults: RwLock<DemoFaults>,
}

impl DemoBackend {
    /// Create a demo backend answering after `delay`.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            faults: RwLock::new(DemoFaults::default()),
        }
    }

    /// Create a demo backend with failures already in place.
    pub fn with_faults(delay: Duration, faults: DemoFaults) -> Self {
        Self {
            delay,
            faults: RwLock::new(faults),
        }
    }

    /// Currently injected failures.
    pub async fn faults(&self) -> DemoFaults {
        self.faults.read().await.clone()
    }

    /// Make the image for 1-based `slot_number` fail with `kind`.
    pub async fn fail_image(&self, slot_number: usize, kind: AssetFailureKind) {
        self.faults.write().await.images.insert(slot_number, kind);
    }

    /// Let the image for `slot_number` succeed again.
    pub async fn heal_image(&self, slot_number: usize) {
        self.faults.write().await.images.remove(&slot_number);
    }

    pub async fn set_content_failure(&self, fail: bool) {
        self.faults.write().await.content = fail;
    }

    pub async fn set_voiceover_failure(&self, fail: bool) {
        self.faults.write().await.voiceover = fail;
    }

    pub async fn set_video_failure(&self, fail: bool) {
        self.faults.write().await.video = fail;
    }

    async fn simulate(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    async fn image_fault(&self, request: &ImageRequest) -> Option<AssetFailureKind> {
        let slot = FilenameBase::from_string(request.save_name.clone()).slot_number()?;
        self.faults.read().await.images.get(&slot).copied()
    }

    /// Random-image URL keyed by the first word of the prompt.
    fn demo_image_url(request: &ImageRequest) -> String {
        let keyword = request.prompt.split_whitespace().next().unwrap_or("landscape");
        let keyword: String = url::form_urlencoded::byte_serialize(keyword.as_bytes()).collect();
        format!(
            "{}/{}/?{}&t={}",
            DEMO_IMAGE_HOST,
            request.aspect_ratios_selection.replace('*', "x"),
            keyword,
            Utc::now().timestamp_millis()
        )
    }
}

#[async_trait]
impl GenerationBackend for DemoBackend {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn generate_prompts(&self, request: &PromptsRequest) -> ServiceResult<Vec<String>> {
        self.simulate().await;
        if self.faults.read().await.content {
            return Err(ServiceError::from_http_status(500, "demo prompt service failure"));
        }
        Ok(DEMO_PROMPTS
            .iter()
            .cycle()
            .take(request.num_prompts as usize)
            .map(|p| p.to_string())
            .collect())
    }

    async fn regenerate_prompt(&self, _request: &PromptsRequest) -> ServiceResult<String> {
        self.simulate().await;
        if self.faults.read().await.content {
            return Err(ServiceError::from_http_status(500, "demo prompt service failure"));
        }
        Ok(DEMO_REGENERATED_PROMPT.to_string())
    }

    async fn generate_script(&self, _request: &ScriptRequest) -> ServiceResult<String> {
        self.simulate().await;
        if self.faults.read().await.content {
            return Err(ServiceError::from_http_status(500, "demo script service failure"));
        }
        Ok(DEMO_SCRIPT.to_string())
    }

    async fn request_image(&self, request: &ImageRequest) -> ServiceResult<()> {
        self.simulate().await;
        if self.image_fault(request).await == Some(AssetFailureKind::Request) {
            return Err(ServiceError::from_http_status(
                500,
                format!("demo image failure for {}", request.save_name),
            ));
        }
        debug!(save_name = %request.save_name, "Demo image accepted");
        Ok(())
    }

    async fn retrieve_image(&self, request: &ImageRequest) -> ServiceResult<String> {
        if self.image_fault(request).await == Some(AssetFailureKind::Retrieval) {
            return Err(ServiceError::retrieval(format!(
                "demo image {} never materialized",
                request.save_name
            )));
        }
        Ok(Self::demo_image_url(request))
    }

    async fn generate_voiceover(&self, request: &VoiceoverRequest) -> ServiceResult<String> {
        self.simulate().await;
        if self.faults.read().await.voiceover {
            return Err(ServiceError::from_http_status(500, "demo voiceover failure"));
        }
        Ok(format!("{}.mp3", request.save_name))
    }

    async fn create_video(&self, request: &CreateVideoRequest) -> ServiceResult<AssembledVideo> {
        self.simulate().await;
        if self.faults.read().await.video {
            return Err(ServiceError::invalid_response(
                "video assembly reported failure: demo video failure",
            ));
        }
        let filename = format!("{}_speed1_0_output.mp4", request.unique_id);
        Ok(AssembledVideo {
            url: format!("demo://videos/{}", filename),
            filename,
        })
    }
}
