// src/main.rs

mod alerts;
mod config;
mod pipeline;
mod proximity;
mod query;
mod replay;
mod session;
mod tracker;
mod types;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use config::Config;
use query::QueryDirection;
use replay::ReplayFileSource;
use session::ScanSession;

#[tokio::main]
async fn main() -> Result<()> {
    let (config, config_err) = match Config::load("config.yaml") {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("pathguard={}", config.logging.level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🦯 pathguard obstacle alerting starting");
    match config_err {
        None => info!("✓ Configuration loaded"),
        Some(err) => warn!("config.yaml unusable ({:#}), using built-in defaults", err),
    }

    let replay_files = replay::find_replay_files(&config.replay.input_dir)?;
    if replay_files.is_empty() {
        error!(
            "No detection logs (*.jsonl) found in {}",
            config.replay.input_dir
        );
        return Ok(());
    }

    // One session object across all files: tracked-object ids keep
    // increasing across stop/start, they are never recycled.
    let mut session = ScanSession::new(&config);
    let metrics = session.metrics();

    for (idx, path) in replay_files.iter().enumerate() {
        info!(
            "Replaying walk {}/{}: {}",
            idx + 1,
            replay_files.len(),
            path.display()
        );
        let mut source = ReplayFileSource::open(path)?;

        let (alerts_tx, mut alerts_rx) = mpsc::channel::<types::AlertEvent>(64);
        let (snapshot_tx, _snapshot_rx) = watch::channel(Vec::new());

        // Stand-in for the speech/haptics collaborator.
        let speaker = tokio::spawn(async move {
            while let Some(alert) = alerts_rx.recv().await {
                info!("🔊 [{}] {}", alert.severity.as_str(), alert.text);
            }
        });

        let outcome = session.run(&mut source, alerts_tx, snapshot_tx).await?;
        speaker.await?;

        // Directional queries against the last frame of the walk.
        for direction in [
            QueryDirection::Front,
            QueryDirection::Left,
            QueryDirection::Right,
        ] {
            info!(
                "Query {:?}: {}",
                direction,
                query::respond(direction, &outcome.final_snapshot, outcome.frame_width)
            );
        }
    }

    info!(
        "Session summary: {}",
        serde_json::to_string(&metrics.summary())?
    );
    Ok(())
}
