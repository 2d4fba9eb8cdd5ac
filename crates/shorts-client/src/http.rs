//! HTTP backend for the local generation services.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{Local, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shorts_models::wire::{
    self, CreateVideoRequest, CreateVideoResponse, ImageRequest, PromptsRequest, PromptsResponse,
    ScriptRequest, ScriptResponse, ServiceErrorBody, VoiceoverRequest, VoiceoverResponse,
};
use shorts_models::FilenameBase;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::backend::{AssembledVideo, GenerationBackend};
use crate::config::ClientConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::metrics::{record_request, record_retrieval_attempt};

/// Backend that calls the real services over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    config: ClientConfig,
}

impl HttpBackend {
    /// Create a new HTTP backend.
    pub fn new(config: ClientConfig) -> ServiceResult<Self> {
        config.endpoints.validate()?;

        let mut builder = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("shorts-client/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ServiceError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ServiceResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Cache-defeating token appended to every retrieval.
    fn freshness() -> i64 {
        Utc::now().timestamp_millis()
    }

    async fn execute_request<T, F>(&self, operation: &str, fut: F) -> ServiceResult<T>
    where
        F: std::future::Future<Output = ServiceResult<T>>,
    {
        let span = info_span!("service_request", operation = %operation);
        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(0),
        };
        record_request(operation, status, latency_ms);

        result
    }

    async fn send_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> ServiceResult<reqwest::Response> {
        debug!("POST {}", url);
        let response = self.http.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, url, response).await);
        }
        Ok(response)
    }

    async fn post_json<B, T>(&self, operation: &str, url: &str, body: &B) -> ServiceResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute_request(operation, async {
            let response = self.send_json(url, body).await?;
            let text = response.text().await?;
            serde_json::from_str(&text).map_err(|e| {
                warn!("{} returned unexpected body: {}", url, e);
                ServiceError::Json(e)
            })
        })
        .await
    }

    async fn handle_error_response(status: StatusCode, url: &str, response: reqwest::Response) -> ServiceError {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ServiceErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail())
            .unwrap_or(body);
        ServiceError::from_http_status(status.as_u16(), format!("{} failed: {}", url, detail))
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn generate_prompts(&self, request: &PromptsRequest) -> ServiceResult<Vec<String>> {
        let url = self.config.endpoints.prompts_url();
        let response: PromptsResponse = self.post_json("generate_prompts", &url, request).await?;

        let prompts: Vec<String> = response
            .prompts
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if prompts.is_empty() {
            return Err(ServiceError::empty_result("no prompts were generated"));
        }
        if prompts.len() != request.num_prompts as usize {
            warn!(
                requested = request.num_prompts,
                received = prompts.len(),
                "Prompt service returned a different number of prompts"
            );
        }
        Ok(prompts)
    }

    async fn generate_script(&self, request: &ScriptRequest) -> ServiceResult<String> {
        let url = self.config.endpoints.script_url();
        let response: ScriptResponse = self.post_json("generate_script", &url, request).await?;

        if response.script.trim().is_empty() {
            return Err(ServiceError::empty_result("no script was generated"));
        }
        Ok(response.script)
    }

    async fn request_image(&self, request: &ImageRequest) -> ServiceResult<()> {
        let url = self.config.endpoints.image_url();
        self.execute_request("request_image", async {
            // The body is an acknowledgement only; the file is fetched by path.
            self.send_json(&url, request).await?;
            Ok(())
        })
        .await
    }

    async fn retrieve_image(&self, request: &ImageRequest) -> ServiceResult<String> {
        let name = FilenameBase::from_string(request.save_name.clone());
        let policy = &self.config.retrieval;
        let attempts = policy.attempts.max(1);
        let mut last_error = String::from("not attempted");

        for attempt in 1..=attempts {
            let url = wire::image_url(
                &self.config.endpoints.output_base,
                Self::today(),
                &name,
                Self::freshness(),
            );

            match self.http.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    record_retrieval_attempt(true);
                    debug!(save_name = %name, attempt, "Image available at {}", url);
                    return Ok(url);
                }
                Ok(response) => {
                    last_error = format!("{} returned {}", url, response.status());
                }
                Err(e) => {
                    last_error = format!("{}: {}", url, e);
                }
            }
            record_retrieval_attempt(false);

            if attempt < attempts {
                debug!(save_name = %name, attempt, "Image not available yet, retrying in {:?}", policy.interval);
                tokio::time::sleep(policy.interval).await;
            }
        }

        Err(ServiceError::retrieval(last_error))
    }

    async fn generate_voiceover(&self, request: &VoiceoverRequest) -> ServiceResult<String> {
        let url = self.config.endpoints.voiceover_url();
        let response: VoiceoverResponse = self.post_json("generate_voiceover", &url, request).await?;

        if let Some(message) = &response.message {
            info!(save_name = %request.save_name, "Voiceover service: {}", message);
        }
        response
            .filename
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| ServiceError::empty_result("voiceover service returned no filename"))
    }

    async fn create_video(&self, request: &CreateVideoRequest) -> ServiceResult<AssembledVideo> {
        let url = self.config.endpoints.video_url();
        let response: CreateVideoResponse = self.post_json("create_video", &url, request).await?;

        if !response.success {
            return Err(ServiceError::invalid_response(format!(
                "video assembly reported failure: {}",
                response.error.as_deref().unwrap_or("no details")
            )));
        }
        let filename = response
            .video_filename
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| ServiceError::empty_result("video service returned no filename"))?;

        let url = match response.video_url.filter(|u| !u.trim().is_empty()) {
            Some(url) => url,
            None => wire::video_url(
                &self.config.endpoints.output_base,
                Self::today(),
                &filename,
                Self::freshness(),
            ),
        };

        Ok(AssembledVideo { url, filename })
    }
}
