//! Contract tests for the HTTP backend against mock services.

use std::time::Duration;

use serde_json::json;
use shorts_client::{ClientConfig, GenerationBackend, HttpBackend, RetrievalPolicy, ServiceEndpoints, ServiceError};
use shorts_models::wire::{
    CreateVideoRequest, ImageOptions, ImageRequest, PromptsRequest, ScriptRequest, VoiceoverRequest,
};
use shorts_models::{FilenameBase, SessionId};
use wiremock::matchers::{body_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer, attempts: u32) -> HttpBackend {
    HttpBackend::new(ClientConfig {
        endpoints: ServiceEndpoints::single(server.uri()),
        request_timeout: Some(Duration::from_secs(5)),
        retrieval: RetrievalPolicy {
            attempts,
            interval: Duration::from_millis(10),
        },
    })
    .unwrap()
}

fn image_request() -> ImageRequest {
    let session = SessionId::from_string("Gen31337");
    let name = FilenameBase::with_salt(&session, "k9x2pq", 0);
    ImageRequest::new("Iguazu Falls at sunset", &ImageOptions::default(), &name)
}

#[tokio::test]
async fn test_generate_prompts_sends_idea_and_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-prompts"))
        .and(body_json(json!({ "video_idea": "volcanoes", "num_prompts": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "prompts": ["Lava river at night", "  Ash cloud over a village  "]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let prompts = backend_for(&server, 1)
        .generate_prompts(&PromptsRequest {
            video_idea: "volcanoes".into(),
            num_prompts: 2,
        })
        .await
        .unwrap();

    assert_eq!(prompts, vec!["Lava river at night", "Ash cloud over a village"]);
}

#[tokio::test]
async fn test_empty_prompts_are_an_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-prompts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "prompts": [] })))
        .mount(&server)
        .await;

    let err = backend_for(&server, 1)
        .generate_prompts(&PromptsRequest {
            video_idea: "volcanoes".into(),
            num_prompts: 5,
        })
        .await
        .unwrap_err();

    assert!(err.is_empty_result());
}

#[tokio::test]
async fn test_error_body_details_are_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-script"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Failed to generate script",
            "details": "upstream timeout"
        })))
        .mount(&server)
        .await;

    let err = backend_for(&server, 1)
        .generate_script(&ScriptRequest {
            video_idea: "volcanoes".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), Some(500));
    assert!(err.to_string().contains("Failed to generate script: upstream timeout"));
}

#[tokio::test]
async fn test_image_request_and_retrieval_with_freshness_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/generation/text-to-image"))
        .and(body_json(json!({
            "prompt": "Iguazu Falls at sunset",
            "style_selections": ["Fooocus V2"],
            "performance_selection": "Speed",
            "aspect_ratios_selection": "768*1344",
            "save_name": "Gen31337_k9x2pq_1"
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/output/\d{4}-\d{2}-\d{2}/Gen31337_k9x2pq_1-0\.png$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, 0x50, 0x4e, 0x47]))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server, 1);
    let request = image_request();
    backend.request_image(&request).await.unwrap();
    let url = backend.retrieve_image(&request).await.unwrap();

    assert!(url.starts_with(&format!("{}/output/", server.uri())));
    assert!(url.contains("Gen31337_k9x2pq_1-0.png?t="));

    let requests = server.received_requests().await.unwrap();
    let get = requests.iter().find(|r| r.method.to_string() == "GET").unwrap();
    assert!(get.url.query_pairs().any(|(k, _)| k == "t"));
}

#[tokio::test]
async fn test_image_request_failure_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/generation/text-to-image"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad aspect ratio"))
        .mount(&server)
        .await;

    let err = backend_for(&server, 1)
        .request_image(&image_request())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Http { status: 422, .. }));
}

#[tokio::test]
async fn test_missing_image_is_retrieval_error_after_all_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/output/.*-0\.png$"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;

    let err = backend_for(&server, 3)
        .retrieve_image(&image_request())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Retrieval(_)));
}

#[tokio::test]
async fn test_voiceover_requires_filename() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-voiceover"))
        .and(body_json(json!({ "script": "Hello", "save_name": "Gen31337_aaaaaa" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "queued"
        })))
        .mount(&server)
        .await;

    let err = backend_for(&server, 1)
        .generate_voiceover(&VoiceoverRequest {
            script: "Hello".into(),
            save_name: "Gen31337_aaaaaa".into(),
        })
        .await
        .unwrap_err();

    assert!(err.is_empty_result());
}

#[tokio::test]
async fn test_create_video_falls_back_to_dated_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create-video"))
        .and(body_json(json!({
            "unique_id": "Gen31337",
            "image_order": ["Gen31337_k9x2pq_2", "Gen31337_k9x2pq_1"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "video_filename": "Gen31337_speed1_0_output.mp4"
        })))
        .mount(&server)
        .await;

    let video = backend_for(&server, 1)
        .create_video(&CreateVideoRequest {
            unique_id: "Gen31337".into(),
            image_order: vec!["Gen31337_k9x2pq_2".into(), "Gen31337_k9x2pq_1".into()],
        })
        .await
        .unwrap();

    assert_eq!(video.filename, "Gen31337_speed1_0_output.mp4");
    assert!(video.url.starts_with(&format!("{}/output/", server.uri())));
    assert!(video.url.contains("/Gen31337_speed1_0_output.mp4?t="));
}

#[tokio::test]
async fn test_create_video_reported_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create-video"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "No MP3 file found"
        })))
        .mount(&server)
        .await;

    let err = backend_for(&server, 1)
        .create_video(&CreateVideoRequest {
            unique_id: "Gen31337".into(),
            image_order: Vec::new(),
        })
        .await
        .unwrap_err();

    assert!(err.to_string().contains("No MP3 file found"));
}

#[tokio::test]
async fn test_each_retrieval_attempt_gets_a_new_freshness_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/output/\d{4}-\d{2}-\d{2}/Gen31337_k9x2pq_1-0\.png$"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/output/\d{4}-\d{2}-\d{2}/Gen31337_k9x2pq_1-0\.png$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let url = backend_for(&server, 2)
        .retrieve_image(&image_request())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let tokens: Vec<String> = requests
        .iter()
        .filter(|r| r.url.path().ends_with("Gen31337_k9x2pq_1-0.png"))
        .map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "t")
                .map(|(_, v)| v.into_owned())
                .unwrap()
        })
        .collect();

    assert_eq!(tokens.len(), 2);
    assert_ne!(tokens[0], tokens[1]);
    assert!(url.ends_with(&format!("?t={}", tokens[1])));
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-script"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = backend_for(&server, 1)
        .generate_script(&ScriptRequest {
            video_idea: "volcanoes".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Json(_)));
    assert!(!err.is_retryable());
}
