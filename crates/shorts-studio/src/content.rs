//! Prompt and script stage.

use serde::Serialize;
use shorts_models::wire::{PromptsRequest, ScriptRequest};
use shorts_models::{Prompt, Stage};

use crate::config::MAX_PROMPT_COUNT;
use crate::error::{StudioError, StudioResult};
use crate::studio::Studio;

/// Prompts and script produced for an idea.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedContent {
    pub prompts: Vec<Prompt>,
    pub script: String,
}

impl Studio {
    /// Generate `count` prompts and a narration script for `idea`.
    ///
    /// Both requests run concurrently and both must succeed. On success the
    /// previous prompts, script, images, voiceover and video are replaced.
    pub async fn generate_content(&self, idea: &str, count: usize) -> StudioResult<GeneratedContent> {
        let idea = idea.trim();
        if idea.is_empty() {
            return Err(self.fail(Stage::Content, StudioError::validation("enter a video idea first")));
        }
        if count == 0 || count > MAX_PROMPT_COUNT {
            return Err(self.fail(
                Stage::Content,
                StudioError::validation(format!("prompt count must be between 1 and {}", MAX_PROMPT_COUNT)),
            ));
        }

        let logger = self.logger(Stage::Content);
        logger.log_start(&format!("{} prompts for \"{}\"", count, idea));
        let ticket = self.update(|s| s.begin_content()).await;

        let prompts_request = PromptsRequest {
            video_idea: idea.to_string(),
            num_prompts: count as u32,
        };
        let script_request = ScriptRequest {
            video_idea: idea.to_string(),
        };
        let (prompts, script) = tokio::join!(
            self.backend.generate_prompts(&prompts_request),
            self.backend.generate_script(&script_request)
        );

        let prompts: Vec<String> = prompts
            .map_err(|e| self.fail(Stage::Content, e.into()))?
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        let script = script.map_err(|e| self.fail(Stage::Content, e.into()))?;

        if prompts.is_empty() {
            return Err(self.fail(Stage::Content, StudioError::empty_result("no prompts were generated")));
        }
        if script.trim().is_empty() {
            return Err(self.fail(Stage::Content, StudioError::empty_result("no script was generated")));
        }
        if prompts.len() != count {
            logger.log_warning(&format!("asked for {} prompts, got {}", count, prompts.len()));
        }

        let content = GeneratedContent {
            prompts: Prompt::from_texts(prompts.iter().cloned()),
            script: script.clone(),
        };
        self.update(|s| s.replace_content(ticket, idea.to_string(), prompts, script))
            .await
            .map_err(|e| self.fail(Stage::Content, e))?;

        logger.log_completion(&format!("{} prompts and script ready", content.prompts.len()));
        Ok(content)
    }

    /// Generate content using the configured prompt count.
    pub async fn generate_content_default(&self, idea: &str) -> StudioResult<GeneratedContent> {
        self.generate_content(idea, self.config.prompt_count).await
    }

    /// Replace prompt `index` with a freshly generated one for the current idea.
    ///
    /// Clears every image, the voiceover and the video. On failure the old
    /// text stays.
    pub async fn regenerate_prompt(&self, index: usize) -> StudioResult<String> {
        let (ticket, idea) = self
            .update(|s| s.begin_prompt(index))
            .await
            .map_err(|e| self.fail(Stage::Prompt, e))?;

        let logger = self.logger(Stage::Prompt);
        logger.log_start(&format!("prompt {}", index + 1));

        let request = PromptsRequest {
            video_idea: idea,
            num_prompts: 1,
        };
        let text = self
            .backend
            .regenerate_prompt(&request)
            .await
            .map_err(|e| self.fail(Stage::Prompt, e.into()))?
            .trim()
            .to_string();
        if text.is_empty() {
            return Err(self.fail(Stage::Prompt, StudioError::empty_result("no prompt was generated")));
        }
        logger.log_progress("replacement received");

        self.update(|s| s.replace_prompt(ticket, index, text.clone()))
            .await
            .map_err(|e| self.fail(Stage::Prompt, e))?;

        logger.log_completion(&format!("prompt {} replaced", index + 1));
        Ok(text)
    }

    /// Apply a user edit to the script. Returns true when the existing
    /// voiceover was reset because the narration changed.
    pub async fn edit_script(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.update(|s| s.edit_script(text)).await
    }

    pub async fn save_script(&self) {
        self.update(|s| s.save_script()).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use shorts_client::demo::{DEMO_PROMPTS, DEMO_REGENERATED_PROMPT, DEMO_SCRIPT};
    use shorts_client::DemoBackend;
    use shorts_models::{StudioEvent, StudioPhase, EXAMPLE_IDEA};

    use super::*;
    use crate::config::StudioConfig;

    fn studio() -> (Studio, Arc<DemoBackend>) {
        let backend = Arc::new(DemoBackend::new(Duration::ZERO));
        let studio = Studio::with_backend(StudioConfig::demo(Duration::ZERO), backend.clone());
        (studio, backend)
    }

    #[tokio::test]
    async fn test_generate_content_replaces_prompts_and_script() {
        let (studio, _) = studio();
        let mut rx = studio.subscribe();

        let content = studio.generate_content(EXAMPLE_IDEA, 5).await.unwrap();
        assert_eq!(content.prompts.len(), 5);
        assert_eq!(content.prompts[0].text, DEMO_PROMPTS[0]);
        assert_eq!(content.script, DEMO_SCRIPT);

        let snapshot = studio.snapshot().await;
        assert_eq!(snapshot.phase, StudioPhase::PromptsReady);
        assert_eq!(snapshot.idea.as_deref(), Some(EXAMPLE_IDEA));
        assert!(!snapshot.script.dirty);
        assert_eq!(
            rx.recv().await.unwrap(),
            StudioEvent::ContentGenerated { prompt_count: 5 }
        );
    }

    #[tokio::test]
    async fn test_blank_idea_is_rejected() {
        let (studio, _) = studio();
        let err = studio.generate_content("   ", 5).await.unwrap_err();
        assert!(matches!(err, StudioError::Validation(_)));
        assert_eq!(studio.snapshot().await.phase, StudioPhase::Idle);
    }

    #[tokio::test]
    async fn test_zero_prompts_is_rejected() {
        let (studio, _) = studio();
        let err = studio.generate_content("rivers", 0).await.unwrap_err();
        assert!(matches!(err, StudioError::Validation(_)));
    }

    #[tokio::test]
    async fn test_upstream_failure_keeps_previous_content() {
        let (studio, backend) = studio();
        studio.generate_content("waterfalls", 3).await.unwrap();

        backend.set_content_failure(true).await;
        let err = studio.generate_content("volcanoes", 3).await.unwrap_err();
        assert!(matches!(err, StudioError::Upstream(_)));

        let snapshot = studio.snapshot().await;
        assert_eq!(snapshot.idea.as_deref(), Some("waterfalls"));
        assert_eq!(snapshot.prompts.len(), 3);
    }

    #[tokio::test]
    async fn test_regenerate_prompt_changes_only_that_prompt() {
        let (studio, _) = studio();
        studio.generate_content("waterfalls", 5).await.unwrap();
        let before = studio.snapshot().await.prompts;

        let text = studio.regenerate_prompt(2).await.unwrap();
        assert_eq!(text, DEMO_REGENERATED_PROMPT);

        let after = studio.snapshot().await.prompts;
        for (i, (b, a)) in before.iter().zip(&after).enumerate() {
            if i == 2 {
                assert_eq!(a.text, DEMO_REGENERATED_PROMPT);
                assert_eq!(a.label(), format!("3. {}", DEMO_REGENERATED_PROMPT));
            } else {
                assert_eq!(a, b);
            }
        }
    }

    #[tokio::test]
    async fn test_regenerate_prompt_failure_keeps_text() {
        let (studio, backend) = studio();
        studio.generate_content("waterfalls", 2).await.unwrap();
        backend.set_content_failure(true).await;

        assert!(studio.regenerate_prompt(0).await.is_err());
        assert_eq!(studio.snapshot().await.prompts[0].text, DEMO_PROMPTS[0]);
    }

    #[tokio::test]
    async fn test_regenerate_prompt_out_of_range() {
        let (studio, _) = studio();
        studio.generate_content("waterfalls", 2).await.unwrap();
        assert!(matches!(
            studio.regenerate_prompt(5).await,
            Err(StudioError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_edit_and_save_script() {
        let (studio, _) = studio();
        studio.generate_content("waterfalls", 2).await.unwrap();

        assert!(studio.edit_script("My own narration").await);
        assert!(studio.snapshot().await.script.dirty);

        studio.save_script().await;
        let script = studio.snapshot().await.script;
        assert!(!script.dirty);
        assert_eq!(script.text, "My own narration");
    }
}
