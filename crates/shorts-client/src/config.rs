//! Service endpoints and client configuration.

use std::time::Duration;

use url::Url;

use crate::error::{ServiceError, ServiceResult};

pub const PROMPTS_PATH: &str = "/generate-prompts";
pub const SCRIPT_PATH: &str = "/generate-script";
pub const IMAGE_PATH: &str = "/v1/generation/text-to-image";
pub const VOICEOVER_PATH: &str = "/generate-voiceover";
pub const VIDEO_PATH: &str = "/create-video";

/// Base URLs of the external services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    /// Prompt and script generation service
    pub content_base: String,
    /// Image generation server
    pub image_base: String,
    /// Text-to-speech service
    pub voiceover_base: String,
    /// Video assembly service
    pub video_base: String,
    /// Web root of the dated output directories
    pub output_base: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            content_base: "http://localhost:5000".to_string(),
            image_base: "http://127.0.0.1:8888".to_string(),
            voiceover_base: "http://localhost:5000".to_string(),
            video_base: "http://localhost:5000".to_string(),
            output_base: "http://localhost/shorts/output".to_string(),
        }
    }
}

impl ServiceEndpoints {
    /// Point every service at one base URL (handy for tests and mocks).
    pub fn single(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            content_base: base.clone(),
            image_base: base.clone(),
            voiceover_base: base.clone(),
            video_base: base.clone(),
            output_base: format!("{}/output", base.trim_end_matches('/')),
        }
    }

    /// Create endpoints from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let content_base =
            std::env::var("CONTENT_SERVICE_URL").unwrap_or(defaults.content_base);
        Self {
            image_base: std::env::var("IMAGE_SERVICE_URL").unwrap_or(defaults.image_base),
            voiceover_base: std::env::var("VOICEOVER_SERVICE_URL")
                .unwrap_or_else(|_| content_base.clone()),
            video_base: std::env::var("VIDEO_SERVICE_URL").unwrap_or_else(|_| content_base.clone()),
            output_base: std::env::var("OUTPUT_BASE_URL").unwrap_or(defaults.output_base),
            content_base,
        }
    }

    /// Reject base URLs that cannot be parsed.
    pub fn validate(&self) -> ServiceResult<()> {
        for (name, value) in [
            ("content", &self.content_base),
            ("image", &self.image_base),
            ("voiceover", &self.voiceover_base),
            ("video", &self.video_base),
            ("output", &self.output_base),
        ] {
            Url::parse(value)
                .map_err(|e| ServiceError::config(format!("{} base URL {:?}: {}", name, value, e)))?;
        }
        Ok(())
    }

    pub fn prompts_url(&self) -> String {
        join(&self.content_base, PROMPTS_PATH)
    }

    pub fn script_url(&self) -> String {
        join(&self.content_base, SCRIPT_PATH)
    }

    pub fn image_url(&self) -> String {
        join(&self.image_base, IMAGE_PATH)
    }

    pub fn voiceover_url(&self) -> String {
        join(&self.voiceover_base, VOICEOVER_PATH)
    }

    pub fn video_url(&self) -> String {
        join(&self.video_base, VIDEO_PATH)
    }
}

fn join(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// How long to wait for a generated file to show up at its output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalPolicy {
    /// Number of GET attempts (at least one)
    pub attempts: u32,
    /// Pause between attempts
    pub interval: Duration,
}

impl Default for RetrievalPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            interval: Duration::from_millis(1000),
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub endpoints: ServiceEndpoints,
    /// No timeout unless set
    pub request_timeout: Option<Duration>,
    pub retrieval: RetrievalPolicy,
}

impl ClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            endpoints: ServiceEndpoints::from_env(),
            request_timeout: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
            retrieval: RetrievalPolicy {
                attempts: std::env::var("RETRIEVAL_ATTEMPTS")
                    .ok()
                    .and_then(|s| s.parse::<u32>().ok())
                    .unwrap_or(3)
                    .max(1),
                interval: Duration::from_millis(
                    std::env::var("RETRIEVAL_INTERVAL_MS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(1000),
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_endpoints() {
        let endpoints = ServiceEndpoints::default();
        assert_eq!(endpoints.prompts_url(), "http://localhost:5000/generate-prompts");
        assert_eq!(
            endpoints.image_url(),
            "http://127.0.0.1:8888/v1/generation/text-to-image"
        );
        assert!(endpoints.validate().is_ok());
    }

    #[test]
    fn test_single_base_trailing_slash() {
        let endpoints = ServiceEndpoints::single("http://127.0.0.1:9000/");
        assert_eq!(endpoints.video_url(), "http://127.0.0.1:9000/create-video");
        assert_eq!(endpoints.output_base, "http://127.0.0.1:9000/output");
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let endpoints = ServiceEndpoints {
            image_base: "not a url".to_string(),
            ..ServiceEndpoints::default()
        };
        assert!(matches!(endpoints.validate(), Err(ServiceError::Config(_))));
    }

    #[test]
    #[serial]
    fn test_from_env_falls_back_to_content_base() {
        std::env::set_var("CONTENT_SERVICE_URL", "http://content:7000");
        std::env::remove_var("VOICEOVER_SERVICE_URL");
        std::env::remove_var("VIDEO_SERVICE_URL");

        let endpoints = ServiceEndpoints::from_env();
        assert_eq!(endpoints.voiceover_base, "http://content:7000");
        assert_eq!(endpoints.video_base, "http://content:7000");

        std::env::remove_var("CONTENT_SERVICE_URL");
    }

    #[test]
    #[serial]
    fn test_client_config_timeout_unset_by_default() {
        std::env::remove_var("REQUEST_TIMEOUT_SECS");
        std::env::set_var("RETRIEVAL_ATTEMPTS", "0");

        let config = ClientConfig::from_env();
        assert!(config.request_timeout.is_none());
        assert_eq!(config.retrieval.attempts, 1);

        std::env::remove_var("RETRIEVAL_ATTEMPTS");
    }
}
