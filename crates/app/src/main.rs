//! Headless driver for the generation lifecycle.
//!
//! Reconciles the persisted session, submits the prompt given on the
//! command line (if any), and follows the pending job to a terminal
//! state, logging tile updates along the way.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atelier_midjourney::api::MidjourneyApi;
use atelier_pipeline::{LifecycleManager, PollConfig};
use atelier_slicer::Slicer;
use atelier_store::JsonFileStore;

mod config;

use config::AppConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,atelier_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        gateway = %config.gateway_url,
        session_file = %config.session_file.display(),
        "Starting atelier",
    );

    let client = reqwest::Client::new();
    let gateway = Arc::new(MidjourneyApi::with_client(
        client.clone(),
        config.gateway_url.clone(),
    ));
    let slicer = Arc::new(Slicer::with_client(client));
    let persistence = Arc::new(JsonFileStore::new(&config.session_file));
    let poll = PollConfig {
        poll_interval: Duration::from_secs(config.poll_interval_secs),
        ..PollConfig::default()
    };
    let manager = LifecycleManager::new(gateway, slicer, persistence, poll);

    manager.reconcile().await;

    let prompt = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if !prompt.is_empty() {
        let reference = config.reference_image.as_ref().map(|path| {
            let bytes = std::fs::read(path)
                .expect("ATELIER_REFERENCE_IMAGE must point to a readable file");
            BASE64.encode(bytes)
        });

        match manager.submit(&prompt, reference.as_deref()).await {
            Ok(job_id) => tracing::info!(job_id = %job_id, "Prompt submitted"),
            Err(e) => tracing::error!(error = %e, "Submission not accepted"),
        }
    }

    follow_pending(&manager).await;

    for tile in manager.snapshot().await.iter() {
        tracing::info!(
            tile = tile.tile_index,
            job_id = tile.job_id.as_deref(),
            status = ?tile.status,
            sliced = tile.slice_url.is_some(),
            "{}",
            tile.message,
        );
    }

    manager.shutdown().await;
}

/// Log progress until no job is pending anymore.
async fn follow_pending(manager: &LifecycleManager) {
    let mut last_reported: Option<u8> = None;
    while let Some(job_id) = manager.pending_job().await {
        let snapshot = manager.snapshot().await;
        if let Some(tile) = snapshot.iter().find(|t| t.belongs_to(&job_id)) {
            if last_reported != Some(tile.progress) {
                last_reported = Some(tile.progress);
                tracing::info!(job_id = %job_id, progress = tile.progress, "{}", tile.message);
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}
