//! Orchestration core of Shorts Studio.
//!
//! Drives an idea through prompts and script, per-prompt images, a
//! voiceover and finally an assembled video, delegating every generation
//! step to a [`GenerationBackend`](shorts_client::GenerationBackend).
//!
//! Modules:
//! - `session`: the pure state machine (tickets, invalidation, video gate)
//! - `studio`: the shared session handle and event channel
//! - `content`, `assets`, `voiceover`, `video`: one module per stage
//! - `command`: user actions as data

pub mod assets;
pub mod command;
pub mod config;
pub mod content;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod session;
pub mod studio;
pub mod video;
pub mod voiceover;

pub use assets::AssetOutcome;
pub use command::{CommandOutcome, StudioCommand};
pub use config::StudioConfig;
pub use content::GeneratedContent;
pub use error::{StudioError, StudioResult};
pub use logging::SessionLogger;
pub use session::{AssetBoard, SessionState};
pub use studio::Studio;
