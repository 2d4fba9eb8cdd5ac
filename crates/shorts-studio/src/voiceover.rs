//! Voiceover stage.

use shorts_models::wire::VoiceoverRequest;
use shorts_models::Stage;

use crate::error::{StudioError, StudioResult};
use crate::studio::Studio;

impl Studio {
    /// Narrate the current script and return the audio filename.
    ///
    /// Any previous voiceover and the video are dropped as soon as the
    /// request starts. If the script is edited or another voiceover starts
    /// before the answer arrives, the answer is discarded.
    pub async fn generate_voiceover(&self) -> StudioResult<String> {
        let job = self
            .update(|s| s.begin_voiceover())
            .await
            .map_err(|e| self.fail(Stage::Voiceover, e))?;

        let logger = self.logger(Stage::Voiceover);
        logger.log_start(&format!("{} characters as {}", job.script.len(), job.save_name));

        let request = VoiceoverRequest {
            script: job.script,
            save_name: job.save_name,
        };
        let result = self.backend.generate_voiceover(&request).await;

        let settled = result.as_ref().cloned().map_err(|_| ());
        if !self.update(|s| s.settle_voiceover(job.ticket, settled)).await {
            return Err(self.fail(
                Stage::Voiceover,
                StudioError::superseded("the script changed while the voiceover was generated"),
            ));
        }

        let filename = result.map_err(|e| self.fail(Stage::Voiceover, e.into()))?;
        logger.log_completion(&filename);
        Ok(filename)
    }
}
