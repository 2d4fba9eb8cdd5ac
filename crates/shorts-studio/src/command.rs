//! User actions as data.
//!
//! The view translates clicks into `StudioCommand`s and hands them to
//! [`Studio::dispatch`]; state changes come back as events.

use serde::{Deserialize, Serialize};
use shorts_models::{Prompt, Video};

use crate::assets::AssetOutcome;
use crate::error::StudioResult;
use crate::studio::Studio;

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum StudioCommand {
    /// Generate prompts and script; `count` defaults to the configured one
    GenerateContent {
        idea: String,
        #[serde(default)]
        count: Option<usize>,
    },
    RegeneratePrompt { index: usize },
    EditScript { text: String },
    SaveScript,
    GenerateAll,
    RegenerateAsset { slot: usize },
    Reorder { order: Vec<usize> },
    Shuffle,
    GenerateVoiceover,
    CreateVideo,
}

/// Result of a dispatched command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandOutcome {
    Content { prompts: Vec<Prompt>, script: String },
    Prompt { index: usize, text: String },
    ScriptEdited { voiceover_reset: bool },
    ScriptSaved,
    Assets { outcomes: Vec<AssetOutcome> },
    Asset { outcome: AssetOutcome },
    Reordered { order: Vec<usize> },
    Voiceover { filename: String },
    Video { video: Video },
}

impl Studio {
    /// Run one command to completion.
    pub async fn dispatch(&self, command: StudioCommand) -> StudioResult<CommandOutcome> {
        let outcome = match command {
            StudioCommand::GenerateContent { idea, count } => {
                let count = count.unwrap_or(self.config.prompt_count);
                let content = self.generate_content(&idea, count).await?;
                CommandOutcome::Content {
                    prompts: content.prompts,
                    script: content.script,
                }
            }
            StudioCommand::RegeneratePrompt { index } => CommandOutcome::Prompt {
                index,
                text: self.regenerate_prompt(index).await?,
            },
            StudioCommand::EditScript { text } => CommandOutcome::ScriptEdited {
                voiceover_reset: self.edit_script(text).await,
            },
            StudioCommand::SaveScript => {
                self.save_script().await;
                CommandOutcome::ScriptSaved
            }
            StudioCommand::GenerateAll => CommandOutcome::Assets {
                outcomes: self.generate_all().await?,
            },
            StudioCommand::RegenerateAsset { slot } => CommandOutcome::Asset {
                outcome: self.regenerate_one(slot).await?,
            },
            StudioCommand::Reorder { order } => {
                self.reorder(order.clone()).await?;
                CommandOutcome::Reordered { order }
            }
            StudioCommand::Shuffle => CommandOutcome::Reordered {
                order: self.shuffle().await?,
            },
            StudioCommand::GenerateVoiceover => CommandOutcome::Voiceover {
                filename: self.generate_voiceover().await?,
            },
            StudioCommand::CreateVideo => CommandOutcome::Video {
                video: self.assemble().await?,
            },
        };
        Ok(outcome)
    }
}
