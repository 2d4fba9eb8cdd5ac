//! Shorts Studio pipeline runner.
//!
//! Runs one idea through the whole pipeline (demo or live services) and
//! logs every studio event along the way.

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shorts_models::EXAMPLE_IDEA;
use shorts_studio::assets::failure_counts;
use shorts_studio::{Studio, StudioConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("shorts=info".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting shorts-studio");

    let config = StudioConfig::from_env();
    info!("Studio config: {:?}", config);

    let studio = Studio::new(config).context("failed to create studio")?;

    // Log events as the view would receive them
    let mut events = studio.subscribe();
    let event_logger = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => info!(event = %json, "Studio event"),
                    Err(e) => warn!("Failed to serialize event: {}", e),
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Event logger lagged by {} events", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let idea = std::env::var("SHORTS_IDEA").unwrap_or_else(|_| EXAMPLE_IDEA.to_string());
    let result = run(&studio, &idea).await;

    let snapshot = studio.snapshot().await;
    info!(
        phase = snapshot.phase.as_str(),
        "Final snapshot: {}",
        serde_json::to_string_pretty(&snapshot)?
    );

    drop(studio);
    event_logger.await.ok();

    if let Err(e) = &result {
        error!("Pipeline failed: {:#}", e);
    }
    result
}

/// Idea to video, retrying failed images once.
async fn run(studio: &Studio, idea: &str) -> anyhow::Result<()> {
    let content = studio
        .generate_content_default(idea)
        .await
        .context("content generation failed")?;
    for prompt in &content.prompts {
        info!("{}", prompt.label());
    }

    let outcomes = studio.generate_all().await.context("image generation failed")?;
    let (request_failures, retrieval_failures) = failure_counts(&outcomes);
    if request_failures + retrieval_failures > 0 {
        warn!(
            request_failures,
            retrieval_failures, "Retrying failed images once"
        );
        for outcome in outcomes.iter().filter(|o| !o.is_ready()) {
            studio.regenerate_one(outcome.slot).await?;
        }
    }

    let filename = studio
        .generate_voiceover()
        .await
        .context("voiceover generation failed")?;
    info!("Voiceover ready: {}", filename);

    if !studio.gate_open().await {
        anyhow::bail!("some images are still missing; not creating a video");
    }
    let video = studio.assemble().await.context("video assembly failed")?;
    info!(url = %video.url, "Video ready: {}", video.download_name);
    Ok(())
}
