//! Image stage: one concurrent request per prompt, each slot settling on
//! its own.

use futures::future::join_all;
use rand::seq::SliceRandom;
use serde::Serialize;
use shorts_models::wire::ImageRequest;
use shorts_models::{Asset, AssetFailure, AssetFailureKind, AssetState, FilenameBase, Stage};
use tracing::{debug, Instrument};

use crate::error::StudioResult;
use crate::metrics;
use crate::session::AssetJob;
use crate::studio::Studio;

/// How one image request ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetOutcome {
    pub slot: usize,
    pub filename_base: FilenameBase,
    pub state: AssetState,
    pub source_url: Option<String>,
    pub failure: Option<AssetFailure>,
    /// The answer arrived after the slot was restarted or cleared and was
    /// not applied
    pub superseded: bool,
}

impl AssetOutcome {
    fn applied(asset: Asset) -> Self {
        Self {
            slot: asset.slot,
            filename_base: asset.filename_base,
            state: asset.state,
            source_url: asset.source_url,
            failure: asset.failure,
            superseded: false,
        }
    }

    fn discarded(job: &AssetJob, result: Result<String, AssetFailure>) -> Self {
        let (state, source_url, failure) = match result {
            Ok(url) => (AssetState::Ready, Some(url), None),
            Err(f) => (AssetState::Failed, None, Some(f)),
        };
        Self {
            slot: job.ticket.slot,
            filename_base: job.filename_base.clone(),
            state,
            source_url,
            failure,
            superseded: true,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == AssetState::Ready
    }
}

impl Studio {
    /// Request an image for every prompt and wait until all of them settle.
    ///
    /// Each slot gets a fresh filename base. A failing slot never affects
    /// its siblings.
    pub async fn generate_all(&self) -> StudioResult<Vec<AssetOutcome>> {
        let jobs = self
            .update(|s| s.begin_generate_all())
            .await
            .map_err(|e| self.fail(Stage::Assets, e))?;

        let logger = self.logger(Stage::Assets);
        logger.log_start(&format!("{} images", jobs.len()));

        let outcomes = join_all(jobs.into_iter().map(|job| self.run_asset(job))).await;

        let failed = outcomes.iter().filter(|o| !o.is_ready()).count();
        if failed > 0 {
            logger.log_warning(&format!("{} of {} images failed", failed, outcomes.len()));
        } else {
            logger.log_completion(&format!("{} images ready", outcomes.len()));
        }
        Ok(outcomes)
    }

    /// Retry one slot with the same filename base.
    pub async fn regenerate_one(&self, slot: usize) -> StudioResult<AssetOutcome> {
        let job = self
            .update(|s| s.begin_regenerate(slot))
            .await
            .map_err(|e| self.fail(Stage::Assets, e))?;

        self.logger(Stage::Assets)
            .log_start(&format!("retrying image {} as {}", slot + 1, job.filename_base));
        Ok(self.run_asset(job).await)
    }

    /// Set the display order. `order[i]` is the slot shown at position `i`.
    pub async fn reorder(&self, order: Vec<usize>) -> StudioResult<()> {
        self.update(|s| s.reorder(order))
            .await
            .map_err(|e| self.fail(Stage::Assets, e))
    }

    /// Arrange the images in a random order and return it.
    pub async fn shuffle(&self) -> StudioResult<Vec<usize>> {
        self.update(|s| {
            let mut order: Vec<usize> = (0..s.board().len()).collect();
            order.shuffle(&mut rand::rng());
            s.reorder(order.clone()).map(|_| order)
        })
        .await
        .map_err(|e| self.fail(Stage::Assets, e))
    }

    async fn run_asset(&self, job: AssetJob) -> AssetOutcome {
        let span = tracing::info_span!(
            "asset",
            session_id = %self.session_id(),
            slot = job.ticket.slot,
            save_name = %job.filename_base
        );
        async move {
            let request = ImageRequest::new(&job.prompt, &self.config.image_options, &job.filename_base);
            let result = match self.backend.request_image(&request).await {
                Err(e) => Err(AssetFailure::request(e.to_string())),
                Ok(()) => self
                    .backend
                    .retrieve_image(&request)
                    .await
                    .map_err(|e| AssetFailure::retrieval(e.to_string())),
            };

            match &result {
                Ok(_) => metrics::record_asset_outcome("ready"),
                Err(f) => {
                    metrics::record_asset_outcome(f.kind.as_str());
                    self.logger(Stage::Assets).log_warning(&format!(
                        "image {} failed ({}): {}",
                        job.ticket.slot + 1,
                        f.kind.as_str(),
                        f.message
                    ));
                }
            }

            match self.update(|s| s.settle_asset(job.ticket, result.clone())).await {
                Some(asset) => AssetOutcome::applied(asset),
                None => {
                    debug!(
                        batch = job.ticket.batch,
                        generation = job.ticket.generation,
                        "Discarding superseded image result"
                    );
                    metrics::record_stale_result(Stage::Assets);
                    AssetOutcome::discarded(&job, result)
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Count failures of each kind, for logs and summaries.
pub fn failure_counts(outcomes: &[AssetOutcome]) -> (usize, usize) {
    outcomes
        .iter()
        .filter(|o| !o.superseded)
        .filter_map(|o| o.failure.as_ref())
        .fold((0, 0), |(req, ret), f| match f.kind {
            AssetFailureKind::Request => (req + 1, ret),
            AssetFailureKind::Retrieval => (req, ret + 1),
        })
}
