//! Shared data models for Shorts Studio.
//!
//! This crate provides Serde-serializable types for:
//! - Session and per-asset identity (filename bases)
//! - Prompts, script, image slots, voiceover and video
//! - Request/response schemas of the external services
//! - Studio events and snapshots for the rendering layer

pub mod asset;
pub mod content;
pub mod event;
pub mod identity;
pub mod media;
pub mod snapshot;
pub mod wire;

// Re-export common types
pub use asset::{Asset, AssetFailure, AssetFailureKind, AssetState, DisplayOrder, OrderError};
pub use content::{Prompt, Script, EXAMPLE_IDEA};
pub use event::{Stage, StudioEvent, StudioPhase};
pub use identity::{voiceover_save_name, FilenameBase, SessionId};
pub use media::{Video, Voiceover, VoiceoverState};
pub use snapshot::StudioSnapshot;
pub use wire::ImageOptions;
