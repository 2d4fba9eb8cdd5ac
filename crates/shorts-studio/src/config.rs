//! Studio configuration.

use std::time::Duration;

use shorts_client::ClientConfig;
use shorts_models::ImageOptions;

/// Upper bound on prompts per session.
pub const MAX_PROMPT_COUNT: usize = 20;

/// Studio configuration.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Service endpoints, timeouts and retrieval polling
    pub client: ClientConfig,
    /// Style, performance and aspect ratio sent with every image request
    pub image_options: ImageOptions,
    /// Use the offline demo backend
    pub demo_mode: bool,
    /// Simulated latency of the demo backend
    pub demo_delay: Duration,
    /// Prompts requested per idea
    pub prompt_count: usize,
    /// Buffered events per subscriber before lagging
    pub event_capacity: usize,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            image_options: ImageOptions::default(),
            demo_mode: false,
            demo_delay: Duration::from_millis(1500),
            prompt_count: 5,
            event_capacity: 64,
        }
    }
}

impl StudioConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = ImageOptions::default();
        Self {
            client: ClientConfig::from_env(),
            image_options: ImageOptions {
                style: std::env::var("IMAGE_STYLE").unwrap_or(defaults.style),
                performance: std::env::var("IMAGE_PERFORMANCE").unwrap_or(defaults.performance),
                aspect_ratio: std::env::var("IMAGE_ASPECT_RATIO").unwrap_or(defaults.aspect_ratio),
            },
            demo_mode: std::env::var("DEMO_MODE")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            demo_delay: Duration::from_millis(
                std::env::var("DEMO_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1500),
            ),
            prompt_count: std::env::var("PROMPT_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            event_capacity: std::env::var("EVENT_CAPACITY")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(64)
                .max(1),
        }
    }

    /// Offline configuration with the given simulated latency.
    pub fn demo(delay: Duration) -> Self {
        Self {
            demo_mode: true,
            demo_delay: delay,
            ..Self::default()
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt_count == 0 || self.prompt_count > MAX_PROMPT_COUNT {
            return Err(format!(
                "prompt_count must be between 1 and {}",
                MAX_PROMPT_COUNT
            ));
        }
        if self.image_options.aspect_ratio.split('*').count() != 2 {
            return Err("image aspect ratio must look like WIDTH*HEIGHT".to_string());
        }
        if !self.demo_mode {
            self.client.endpoints.validate().map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config_is_valid() {
        let config = StudioConfig::default();
        assert_eq!(config.prompt_count, 5);
        assert!(!config.demo_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_prompt_count_bounds() {
        let mut config = StudioConfig::default();
        config.prompt_count = 0;
        assert!(config.validate().is_err());
        config.prompt_count = MAX_PROMPT_COUNT + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_aspect_ratio() {
        let mut config = StudioConfig::demo(Duration::ZERO);
        config.image_options.aspect_ratio = "portrait".into();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("DEMO_MODE", "true");
        std::env::set_var("DEMO_DELAY_MS", "20");
        std::env::set_var("PROMPT_COUNT", "3");
        std::env::set_var("IMAGE_STYLE", "Fooocus Sharp");

        let config = StudioConfig::from_env();
        assert!(config.demo_mode);
        assert_eq!(config.demo_delay, Duration::from_millis(20));
        assert_eq!(config.prompt_count, 3);
        assert_eq!(config.image_options.style, "Fooocus Sharp");
        assert_eq!(config.image_options.performance, "Speed");

        std::env::remove_var("DEMO_MODE");
        std::env::remove_var("DEMO_DELAY_MS");
        std::env::remove_var("PROMPT_COUNT");
        std::env::remove_var("IMAGE_STYLE");
    }
}
