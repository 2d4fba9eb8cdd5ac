//! Video assembly gate.

use shorts_models::wire::CreateVideoRequest;
use shorts_models::{Stage, Video};
use tracing::Instrument;

use crate::error::{StudioError, StudioResult};
use crate::metrics;
use crate::studio::Studio;

impl Studio {
    /// Assemble the video from the ready images (in display order) and the
    /// voiceover.
    ///
    /// Fails with `GateClosed` without calling the service unless every
    /// image and the voiceover are ready. A result that arrives after any
    /// image, the voiceover or the order changed is discarded.
    pub async fn assemble(&self) -> StudioResult<Video> {
        let job = self
            .update(|s| s.begin_video())
            .await
            .map_err(|e| self.fail(Stage::Video, e))?;

        let logger = self.logger(Stage::Video);
        logger.log_start(&format!("{} images for {}", job.image_order.len(), job.unique_id));

        let request = CreateVideoRequest {
            unique_id: job.unique_id,
            image_order: job.image_order,
        };
        let assembled = self
            .backend
            .create_video(&request)
            .instrument(logger.create_span())
            .await
            .map_err(|e| self.fail(Stage::Video, e.into()))?;

        let video = Video {
            url: assembled.url,
            download_name: assembled.filename,
        };
        if !self.update(|s| s.settle_video(job.ticket, video.clone())).await {
            return Err(self.fail(
                Stage::Video,
                StudioError::superseded("images or voiceover changed during assembly"),
            ));
        }

        metrics::record_video_assembled();
        logger.log_completion(&video.download_name);
        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use shorts_client::DemoBackend;
    use shorts_models::StudioPhase;

    use super::*;
    use crate::config::StudioConfig;

    async fn ready_studio() -> (Studio, Arc<DemoBackend>) {
        let backend = Arc::new(DemoBackend::new(Duration::ZERO));
        let studio = Studio::with_backend(StudioConfig::demo(Duration::ZERO), backend.clone());
        studio.generate_content("waterfalls", 3).await.unwrap();
        studio.generate_all().await.unwrap();
        studio.generate_voiceover().await.unwrap();
        (studio, backend)
    }

    #[tokio::test]
    async fn test_assemble_records_video() {
        let (studio, _) = ready_studio().await;
        let video = studio.assemble().await.unwrap();

        assert_eq!(
            video.download_name,
            format!("{}_speed1_0_output.mp4", studio.session_id())
        );
        let snapshot = studio.snapshot().await;
        assert_eq!(snapshot.phase, StudioPhase::VideoReady);
        assert_eq!(snapshot.video, Some(video));
    }

    #[tokio::test]
    async fn test_gate_closed_without_voiceover() {
        let backend = Arc::new(DemoBackend::new(Duration::ZERO));
        let studio = Studio::with_backend(StudioConfig::demo(Duration::ZERO), backend);
        studio.generate_content("waterfalls", 2).await.unwrap();
        studio.generate_all().await.unwrap();

        assert!(!studio.gate_open().await);
        assert!(matches!(
            studio.assemble().await,
            Err(StudioError::GateClosed(_))
        ));
    }

    #[tokio::test]
    async fn test_service_failure_leaves_gate_open() {
        let (studio, backend) = ready_studio().await;
        backend.set_video_failure(true).await;

        let err = studio.assemble().await.unwrap_err();
        assert!(matches!(err, StudioError::Upstream(_)));
        assert!(studio.gate_open().await);
        assert!(studio.snapshot().await.video.is_none());
    }
}
