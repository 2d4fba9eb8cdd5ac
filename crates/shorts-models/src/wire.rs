//! Request/response schemas of the external services.
//!
//! These payloads keep the field names the local Python services and the
//! image server expect.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::identity::FilenameBase;

/// Suffix the image server appends to `save_name` for the first image.
pub const IMAGE_SUFFIX: &str = "-0.png";

/// Query parameter used to defeat caches on retrieval.
pub const FRESHNESS_PARAM: &str = "t";

// =============================================================================
// Prompt / script services
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PromptsRequest {
    pub video_idea: String,
    pub num_prompts: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PromptsResponse {
    #[serde(default)]
    pub prompts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScriptRequest {
    pub video_idea: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScriptResponse {
    #[serde(default)]
    pub script: String,
}

// =============================================================================
// Image service
// =============================================================================

/// Rendering options forwarded with every image request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImageOptions {
    pub style: String,
    pub performance: String,
    pub aspect_ratio: String,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            style: "Fooocus V2".to_string(),
            performance: "Speed".to_string(),
            aspect_ratio: "768*1344".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImageRequest {
    pub prompt: String,
    pub style_selections: Vec<String>,
    pub performance_selection: String,
    pub aspect_ratios_selection: String,
    pub save_name: String,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>, options: &ImageOptions, save_name: &FilenameBase) -> Self {
        Self {
            prompt: prompt.into(),
            style_selections: vec![options.style.clone()],
            performance_selection: options.performance.clone(),
            aspect_ratios_selection: options.aspect_ratio.clone(),
            save_name: save_name.as_str().to_string(),
        }
    }
}

// =============================================================================
// Voiceover service
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VoiceoverRequest {
    pub script: String,
    pub save_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VoiceoverResponse {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Video assembly service
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CreateVideoRequest {
    pub unique_id: String,
    /// Filename bases in current display order. Services that infer order
    /// from the filename sequence may ignore it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_order: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CreateVideoResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub video_filename: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// =============================================================================
// Errors
// =============================================================================

/// Error body the local services return on failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl ServiceErrorBody {
    /// Best human-readable detail, if any.
    pub fn detail(&self) -> Option<String> {
        match (&self.error, &self.details) {
            (Some(e), Some(d)) => Some(format!("{}: {}", e, d)),
            (Some(e), None) => Some(e.clone()),
            (None, Some(d)) => Some(d.clone()),
            (None, None) => None,
        }
    }
}

// =============================================================================
// Output path convention
// =============================================================================

/// Dated output directory name (`YYYY-MM-DD`).
pub fn date_dir(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `{base}/{date}/{filename_base}-0.png?t={freshness}`
pub fn image_url(base: &str, date: NaiveDate, name: &FilenameBase, freshness: i64) -> String {
    format!(
        "{}/{}/{}{}?{}={}",
        base.trim_end_matches('/'),
        date_dir(date),
        name,
        IMAGE_SUFFIX,
        FRESHNESS_PARAM,
        freshness
    )
}

/// `{base}/{date}/{video_filename}?t={freshness}`
pub fn video_url(base: &str, date: NaiveDate, video_filename: &str, freshness: i64) -> String {
    format!(
        "{}/{}/{}?{}={}",
        base.trim_end_matches('/'),
        date_dir(date),
        video_filename,
        FRESHNESS_PARAM,
        freshness
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SessionId;

    #[test]
    fn test_image_request_field_names() {
        let session = SessionId::from_string("Gen12345");
        let name = FilenameBase::with_salt(&session, "zzzzzz", 2);
        let req = ImageRequest::new("a canyon", &ImageOptions::default(), &name);
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["prompt"], "a canyon");
        assert_eq!(json["style_selections"][0], "Fooocus V2");
        assert_eq!(json["performance_selection"], "Speed");
        assert_eq!(json["aspect_ratios_selection"], "768*1344");
        assert_eq!(json["save_name"], "Gen12345_zzzzzz_3");
    }

    #[test]
    fn test_image_url_convention() {
        let session = SessionId::from_string("Gen12345");
        let name = FilenameBase::with_salt(&session, "abcdef", 0);
        let date = NaiveDate::from_ymd_opt(2025, 5, 8).unwrap();
        assert_eq!(
            image_url("http://localhost/shorts/output/", date, &name, 42),
            "http://localhost/shorts/output/2025-05-08/Gen12345_abcdef_1-0.png?t=42"
        );
    }

    #[test]
    fn test_create_video_request_omits_empty_order() {
        let req = CreateVideoRequest {
            unique_id: "Gen12345".into(),
            image_order: Vec::new(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"unique_id":"Gen12345"}"#);
    }

    #[test]
    fn test_responses_tolerate_missing_fields() {
        let prompts: PromptsResponse = serde_json::from_str("{}").unwrap();
        assert!(prompts.prompts.is_empty());

        let video: CreateVideoResponse =
            serde_json::from_str(r#"{"success":true,"video_filename":"Gen1_output.mp4"}"#).unwrap();
        assert!(video.success);
        assert!(video.video_url.is_none());
    }

    #[test]
    fn test_error_body_detail() {
        let body: ServiceErrorBody =
            serde_json::from_str(r#"{"error":"Failed to generate prompts","details":"timeout"}"#)
                .unwrap();
        assert_eq!(body.detail().as_deref(), Some("Failed to generate prompts: timeout"));
        assert_eq!(ServiceErrorBody::default().detail(), None);
    }
}
