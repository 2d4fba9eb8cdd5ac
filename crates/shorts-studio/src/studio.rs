//! Studio facade.
//!
//! A `Studio` owns one session: its state, the backend that performs the
//! generation work and the event channel the view listens on. Operations
//! are implemented in the stage modules (`content`, `assets`, `voiceover`,
//! `video`) as further `impl Studio` blocks.

use std::sync::Arc;

use shorts_client::{DemoBackend, GenerationBackend, HttpBackend};
use shorts_models::{SessionId, Stage, StudioEvent, StudioSnapshot};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::config::StudioConfig;
use crate::error::{StudioError, StudioResult};
use crate::logging::SessionLogger;
use crate::metrics;
use crate::session::SessionState;

/// One studio session.
///
/// Cloning is cheap and clones share the session.
#[derive(Clone)]
pub struct Studio {
    session_id: SessionId,
    pub(crate) config: Arc<StudioConfig>,
    pub(crate) backend: Arc<dyn GenerationBackend>,
    state: Arc<Mutex<SessionState>>,
    events: broadcast::Sender<StudioEvent>,
}

impl Studio {
    /// Create a studio with the backend selected by `config.demo_mode`.
    pub fn new(config: StudioConfig) -> StudioResult<Self> {
        config.validate().map_err(StudioError::config)?;
        let backend: Arc<dyn GenerationBackend> = if config.demo_mode {
            Arc::new(DemoBackend::new(config.demo_delay))
        } else {
            Arc::new(HttpBackend::new(config.client.clone())?)
        };
        Ok(Self::with_backend(config, backend))
    }

    /// Create a studio around an existing backend.
    pub fn with_backend(config: StudioConfig, backend: Arc<dyn GenerationBackend>) -> Self {
        let session_id = SessionId::generate();
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        info!(
            session_id = %session_id,
            backend = backend.name(),
            "Studio session created"
        );
        Self {
            state: Arc::new(Mutex::new(SessionState::new(session_id.clone()))),
            session_id,
            config: Arc::new(config),
            backend,
            events,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Name of the backend doing the work (`demo` or `http`).
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> StudioSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Whether "create video" is currently allowed.
    pub async fn gate_open(&self) -> bool {
        self.state.lock().await.gate_open()
    }

    pub(crate) fn logger(&self, stage: Stage) -> SessionLogger {
        SessionLogger::new(&self.session_id, stage)
    }

    /// Run `f` against the session state and publish the events it queued.
    ///
    /// The lock is released before publishing and is never held across a
    /// service call.
    pub(crate) async fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let (result, events) = {
            let mut state = self.state.lock().await;
            let result = f(&mut state);
            (result, state.drain_events())
        };
        for event in events {
            self.emit(event);
        }
        result
    }

    pub(crate) fn emit(&self, event: StudioEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Report a failed stage and hand the error back.
    pub(crate) fn fail(&self, stage: Stage, err: StudioError) -> StudioError {
        if let StudioError::Superseded(msg) = &err {
            debug!(
                session_id = %self.session_id,
                stage = stage.as_str(),
                "Discarded stale result: {}", msg
            );
            metrics::record_stale_result(stage);
            return err;
        }

        let logger = self.logger(stage);
        if err.is_user_correctable() {
            logger.log_warning(&err.to_string());
        } else {
            logger.log_error(&err.to_string());
        }
        metrics::record_stage_failure(stage);
        self.emit(StudioEvent::stage_failed(stage, err.to_string()));
        err
    }
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("session_id", &self.session_id)
            .field("backend", &self.backend.name())
            .finish()
    }
}
