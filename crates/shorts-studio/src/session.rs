//! Session state machine.
//!
//! `SessionState` owns every entity of one studio session and enforces the
//! transitions between them. It never performs I/O: operations that talk to
//! a service are split into a `begin_*` step that hands out a ticket and a
//! `settle_*` step that applies the answer only if the ticket is still
//! current. Every mutation queues the matching [`StudioEvent`]s, which the
//! caller drains and publishes.

use shorts_models::{
    voiceover_save_name, Asset, AssetFailure, AssetState, DisplayOrder, FilenameBase, Prompt,
    Script, SessionId, StudioEvent, StudioPhase, StudioSnapshot, Video, Voiceover,
    VoiceoverState,
};

use crate::error::{StudioError, StudioResult};

/// Identifies one `generate_content` request. Only the newest one may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentTicket {
    request: u64,
}

/// Identifies one `regenerate_prompt` request against the content it started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTicket {
    epoch: u64,
}

/// Identifies one image request: which batch, which slot, which attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetTicket {
    pub batch: u64,
    pub slot: usize,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceoverTicket {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoTicket {
    epoch: u64,
}

/// Everything needed to issue one image request.
#[derive(Debug, Clone)]
pub struct AssetJob {
    pub ticket: AssetTicket,
    pub prompt: String,
    pub filename_base: FilenameBase,
}

#[derive(Debug, Clone)]
pub struct VoiceoverJob {
    pub ticket: VoiceoverTicket,
    pub script: String,
    pub save_name: String,
}

#[derive(Debug, Clone)]
pub struct VideoJob {
    pub ticket: VideoTicket,
    pub unique_id: String,
    /// Filename bases in display order
    pub image_order: Vec<String>,
}

/// Image slots of the current batch plus their display order.
#[derive(Debug, Clone, Default)]
pub struct AssetBoard {
    batch: u64,
    assets: Vec<Asset>,
    order: DisplayOrder,
}

impl AssetBoard {
    pub fn batch(&self) -> u64 {
        self.batch
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Asset> {
        self.assets.get(slot)
    }

    /// Slots by index.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn order(&self) -> &DisplayOrder {
        &self.order
    }

    /// Every slot ready. An empty board is never complete.
    pub fn all_complete(&self) -> bool {
        !self.assets.is_empty() && self.assets.iter().all(Asset::is_ready)
    }

    pub fn all_settled(&self) -> bool {
        self.assets.iter().all(|a| a.state.is_settled())
    }

    /// Slots in display order.
    pub fn in_display_order(&self) -> Vec<&Asset> {
        self.order
            .slots()
            .iter()
            .filter_map(|&slot| self.assets.get(slot))
            .collect()
    }

    fn has_order(&self) -> bool {
        !self.assets.is_empty() && self.order.len() == self.assets.len()
    }

    /// Drop all slots; answers for the old batch become stale.
    fn clear(&mut self) -> bool {
        self.batch += 1;
        self.order = DisplayOrder::default();
        !std::mem::take(&mut self.assets).is_empty()
    }

    fn start_batch(&mut self, assets: Vec<Asset>) -> u64 {
        self.batch += 1;
        self.order = DisplayOrder::identity(assets.len());
        self.assets = assets;
        self.batch
    }

    fn ticket_matches(&self, ticket: &AssetTicket) -> bool {
        ticket.batch == self.batch
            && self
                .assets
                .get(ticket.slot)
                .is_some_and(|a| a.generation == ticket.generation)
    }
}

/// All state of one studio session.
#[derive(Debug)]
pub struct SessionState {
    session_id: SessionId,
    idea: Option<String>,
    prompts: Vec<Prompt>,
    content_request: u64,
    content_epoch: u64,
    script: Script,
    board: AssetBoard,
    voiceover: Voiceover,
    video: Option<Video>,
    video_epoch: u64,
    outbox: Vec<StudioEvent>,
}

impl SessionState {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            idea: None,
            prompts: Vec::new(),
            content_request: 0,
            content_epoch: 0,
            script: Script::default(),
            board: AssetBoard::default(),
            voiceover: Voiceover::default(),
            video: None,
            video_epoch: 0,
            outbox: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn idea(&self) -> Option<&str> {
        self.idea.as_deref()
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn board(&self) -> &AssetBoard {
        &self.board
    }

    pub fn voiceover(&self) -> &Voiceover {
        &self.voiceover
    }

    pub fn video(&self) -> Option<&Video> {
        self.video.as_ref()
    }

    /// Events queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<StudioEvent> {
        std::mem::take(&mut self.outbox)
    }

    // =========================================================================
    // Prompts and script
    // =========================================================================

    /// Start a full content generation. Any older content request is superseded.
    ///
    /// The installed content is untouched until the answer lands, so a prompt
    /// regeneration in flight survives a content request that fails.
    pub fn begin_content(&mut self) -> ContentTicket {
        self.content_request += 1;
        ContentTicket {
            request: self.content_request,
        }
    }

    /// Start regenerating prompt `index` for the current idea.
    pub fn begin_prompt(&self, index: usize) -> StudioResult<(PromptTicket, String)> {
        let idea = self
            .idea
            .clone()
            .ok_or_else(|| StudioError::validation("no prompts have been generated yet"))?;
        if index >= self.prompts.len() {
            return Err(StudioError::validation(format!(
                "prompt {} does not exist ({} prompts)",
                index + 1,
                self.prompts.len()
            )));
        }
        Ok((
            PromptTicket {
                epoch: self.content_epoch,
            },
            idea,
        ))
    }

    /// Install freshly generated prompts and script, resetting everything downstream.
    pub fn replace_content(
        &mut self,
        ticket: ContentTicket,
        idea: String,
        prompts: Vec<String>,
        script: String,
    ) -> StudioResult<()> {
        if ticket.request != self.content_request {
            return Err(StudioError::superseded(
                "a newer content request was started while this one was in flight",
            ));
        }
        self.content_epoch += 1;
        self.prompts = Prompt::from_texts(prompts);
        self.script = Script::generated(script);
        self.idea = Some(idea);
        self.clear_downstream();
        self.outbox.push(StudioEvent::ContentGenerated {
            prompt_count: self.prompts.len(),
        });
        Ok(())
    }

    /// Replace one prompt's text. All assets, the voiceover and the video go.
    pub fn replace_prompt(
        &mut self,
        ticket: PromptTicket,
        index: usize,
        text: String,
    ) -> StudioResult<()> {
        if ticket.epoch != self.content_epoch {
            return Err(StudioError::superseded(
                "content was regenerated while the request was in flight",
            ));
        }
        let prompt = self.prompts.get_mut(index).ok_or_else(|| {
            StudioError::superseded(format!("prompt {} no longer exists", index + 1))
        })?;
        prompt.text = text.clone();
        self.outbox.push(StudioEvent::PromptRegenerated { index, text });
        self.clear_downstream();
        Ok(())
    }

    /// Apply a user edit to the script.
    ///
    /// Returns true when the narration materially changed; the voiceover is
    /// then stale and any in-flight voiceover answer is superseded.
    pub fn edit_script(&mut self, text: String) -> bool {
        let changed = self.script.edit(text);
        if changed {
            self.reset_voiceover();
            self.invalidate_video();
        }
        self.outbox.push(StudioEvent::ScriptChanged { dirty: true });
        changed
    }

    pub fn save_script(&mut self) {
        self.script.save();
        self.outbox.push(StudioEvent::ScriptChanged { dirty: false });
    }

    fn clear_downstream(&mut self) {
        if self.board.clear() {
            self.outbox.push(StudioEvent::AssetsCleared);
        }
        self.reset_voiceover();
        self.invalidate_video();
    }

    // =========================================================================
    // Assets
    // =========================================================================

    /// Start a new batch: one fresh slot per prompt, natural display order.
    pub fn begin_generate_all(&mut self) -> StudioResult<Vec<AssetJob>> {
        if self.prompts.is_empty() {
            return Err(StudioError::validation(
                "generate prompts before generating images",
            ));
        }
        let assets: Vec<Asset> = self
            .prompts
            .iter()
            .map(|p| {
                let name = FilenameBase::new(&self.session_id, p.index);
                Asset::pending(p.index, p.text.clone(), name)
            })
            .collect();
        let batch = self.board.start_batch(assets);
        self.invalidate_video();

        let jobs = self
            .board
            .assets
            .iter()
            .map(|a| AssetJob {
                ticket: AssetTicket {
                    batch,
                    slot: a.slot,
                    generation: a.generation,
                },
                prompt: a.prompt.clone(),
                filename_base: a.filename_base.clone(),
            })
            .collect();
        for asset in &self.board.assets {
            self.outbox.push(asset_event(asset));
        }
        self.outbox.push(StudioEvent::AssetsReordered {
            order: self.board.order.slots().to_vec(),
        });
        Ok(jobs)
    }

    /// Re-drive one slot, keeping its filename base.
    pub fn begin_regenerate(&mut self, slot: usize) -> StudioResult<AssetJob> {
        let batch = self.board.batch;
        let len = self.board.len();
        let asset = self.board.assets.get_mut(slot).ok_or_else(|| {
            StudioError::validation(format!("image slot {} does not exist ({} slots)", slot + 1, len))
        })?;
        let generation = asset.restart();
        let job = AssetJob {
            ticket: AssetTicket {
                batch,
                slot,
                generation,
            },
            prompt: asset.prompt.clone(),
            filename_base: asset.filename_base.clone(),
        };
        let event = asset_event(asset);
        self.outbox.push(event);
        self.invalidate_video();
        Ok(job)
    }

    /// Apply an image answer. Returns the updated slot, or `None` when the
    /// ticket is stale and the answer was dropped.
    pub fn settle_asset(
        &mut self,
        ticket: AssetTicket,
        result: Result<String, AssetFailure>,
    ) -> Option<Asset> {
        if !self.board.ticket_matches(&ticket) {
            return None;
        }
        let asset = self.board.assets.get_mut(ticket.slot)?;
        match result {
            Ok(url) => asset.mark_ready(url),
            Err(failure) => asset.mark_failed(failure),
        }
        let settled = asset.clone();
        self.outbox.push(asset_event(&settled));
        self.invalidate_video();
        Some(settled)
    }

    /// Set a new display order; `order` must be a permutation of the slots.
    pub fn reorder(&mut self, order: Vec<usize>) -> StudioResult<()> {
        if self.board.is_empty() {
            return Err(StudioError::validation("there are no images to arrange"));
        }
        self.board.order = DisplayOrder::from_permutation(order, self.board.len())?;
        self.outbox.push(StudioEvent::AssetsReordered {
            order: self.board.order.slots().to_vec(),
        });
        self.invalidate_video();
        Ok(())
    }

    // =========================================================================
    // Voiceover
    // =========================================================================

    /// Enter `Pending` for a new voiceover of the current script.
    pub fn begin_voiceover(&mut self) -> StudioResult<VoiceoverJob> {
        if self.script.is_empty() {
            return Err(StudioError::validation("the script is empty"));
        }
        let generation = self.voiceover.start();
        self.outbox.push(StudioEvent::VoiceoverPending);
        self.invalidate_video();
        Ok(VoiceoverJob {
            ticket: VoiceoverTicket { generation },
            script: self.script.narration().to_string(),
            save_name: voiceover_save_name(&self.session_id),
        })
    }

    /// Apply a voiceover answer. Returns false when the ticket is stale.
    pub fn settle_voiceover(
        &mut self,
        ticket: VoiceoverTicket,
        result: Result<String, ()>,
    ) -> bool {
        if ticket.generation != self.voiceover.generation {
            return false;
        }
        match result {
            Ok(filename) => {
                self.voiceover.mark_ready(filename.clone());
                self.outbox.push(StudioEvent::VoiceoverReady { filename });
            }
            Err(()) => {
                self.voiceover.mark_failed();
                self.outbox.push(StudioEvent::VoiceoverReset);
            }
        }
        self.invalidate_video();
        true
    }

    fn reset_voiceover(&mut self) {
        let had_voiceover = self.voiceover.state != VoiceoverState::None;
        self.voiceover.invalidate();
        if had_voiceover {
            self.outbox.push(StudioEvent::VoiceoverReset);
        }
    }

    // =========================================================================
    // Video
    // =========================================================================

    /// All images ready, voiceover ready and a display order present.
    pub fn gate_open(&self) -> bool {
        self.board.all_complete() && self.voiceover.is_ready() && self.board.has_order()
    }

    /// Capture what the video service needs, or explain why the gate is closed.
    pub fn begin_video(&self) -> StudioResult<VideoJob> {
        if self.board.is_empty() {
            return Err(StudioError::gate_closed("no images have been generated"));
        }
        if !self.board.all_complete() {
            let pending = self
                .board
                .assets
                .iter()
                .filter(|a| !a.is_ready())
                .count();
            return Err(StudioError::gate_closed(format!(
                "{} image(s) are not ready",
                pending
            )));
        }
        if !self.voiceover.is_ready() {
            return Err(StudioError::gate_closed("the voiceover is not ready"));
        }
        if !self.board.has_order() {
            return Err(StudioError::gate_closed("no display order"));
        }
        Ok(VideoJob {
            ticket: VideoTicket {
                epoch: self.video_epoch,
            },
            unique_id: self.session_id.to_string(),
            image_order: self
                .board
                .in_display_order()
                .iter()
                .map(|a| a.filename_base.to_string())
                .collect(),
        })
    }

    /// Record an assembled video. Returns false when anything it depends on
    /// changed while it was being assembled.
    pub fn settle_video(&mut self, ticket: VideoTicket, video: Video) -> bool {
        if ticket.epoch != self.video_epoch {
            return false;
        }
        self.outbox.push(StudioEvent::VideoReady {
            url: video.url.clone(),
            download_name: video.download_name.clone(),
        });
        self.video = Some(video);
        true
    }

    /// Forget the video and supersede any assembly in flight.
    fn invalidate_video(&mut self) {
        self.video_epoch += 1;
        if self.video.take().is_some() {
            self.outbox.push(StudioEvent::VideoInvalidated);
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn phase(&self) -> StudioPhase {
        if self.prompts.is_empty() {
            StudioPhase::Idle
        } else if self.video.is_some() {
            StudioPhase::VideoReady
        } else if self.board.is_empty() {
            StudioPhase::PromptsReady
        } else if self.board.all_complete() {
            StudioPhase::AssetsReady
        } else {
            StudioPhase::AssetsPending
        }
    }

    pub fn snapshot(&self) -> StudioSnapshot {
        StudioSnapshot {
            session_id: self.session_id.clone(),
            phase: self.phase(),
            idea: self.idea.clone(),
            prompts: self.prompts.clone(),
            script: self.script.clone(),
            assets: self.board.in_display_order().into_iter().cloned().collect(),
            all_complete: self.board.all_complete(),
            voiceover: self.voiceover.clone(),
            video: self.video.clone(),
            can_create_video: self.gate_open(),
        }
    }
}

fn asset_event(asset: &Asset) -> StudioEvent {
    StudioEvent::AssetUpdated {
        slot: asset.slot,
        state: asset.state,
        source_url: asset.source_url.clone(),
        failure: match asset.state {
            AssetState::Failed => asset.failure.as_ref().map(|f| f.kind),
            _ => None,
        },
    }
}
