// src/session.rs
//
// One scanning session: a single cooperative loop that owns scene memory.
// A paced interval drives one tracking cycle per iteration; the await on
// the detection source is the only suspension point, so in-flight
// inference is bounded to one call and ticks that land during a call are
// skipped rather than queued. Cancellation is a flag checked at the top of
// each iteration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::alerts::AlertEngine;
use crate::config::Config;
use crate::pipeline::{AlertBus, SessionMetrics};
use crate::tracker::SceneMemory;
use crate::types::{AlertEvent, AlertSeverity, FrameDetections, ObjectSnapshot};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Milliseconds between tracking cycles
    pub tick_interval_ms: u64,
    /// Alert bus capacity; the oldest alert drops beyond this
    pub max_pending_alerts: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 33,
            max_pending_alerts: 32,
        }
    }
}

/// Seam to the external detection model. `Ok(None)` ends the session
/// normally; an error skips the current tick and the loop retries on the
/// next one.
pub trait DetectionSource {
    async fn next_frame(&mut self) -> Result<Option<FrameDetections>>;
}

/// What the session looked like when the loop ended. Live consumers get
/// per-frame snapshots through the watch channel; this is for the caller.
#[derive(Debug)]
pub struct SessionOutcome {
    pub final_snapshot: Vec<ObjectSnapshot>,
    pub frame_width: f32,
}

pub struct ScanSession {
    scene: SceneMemory,
    engine: AlertEngine,
    bus: AlertBus,
    metrics: SessionMetrics,
    config: SessionConfig,
    scanning: Arc<AtomicBool>,
    last_frame_width: f32,
}

impl ScanSession {
    pub fn new(config: &Config) -> Self {
        Self {
            scene: SceneMemory::new(config.tracker.clone(), config.alerts.clone()),
            engine: AlertEngine::new(config.alerts.clone()),
            bus: AlertBus::new(config.session.max_pending_alerts),
            metrics: SessionMetrics::new(),
            config: config.session.clone(),
            scanning: Arc::new(AtomicBool::new(false)),
            last_frame_width: 0.0,
        }
    }

    pub fn metrics(&self) -> SessionMetrics {
        self.metrics.clone()
    }

    /// Cooperative cancellation handle: clear it and the loop stops at the
    /// top of its next iteration.
    pub fn scanning_flag(&self) -> Arc<AtomicBool> {
        self.scanning.clone()
    }

    pub async fn run<S: DetectionSource>(
        &mut self,
        source: &mut S,
        alerts_tx: mpsc::Sender<AlertEvent>,
        snapshot_tx: watch::Sender<Vec<ObjectSnapshot>>,
    ) -> Result<SessionOutcome> {
        // Session start: fresh scene memory, ids keep counting from where
        // the previous session left them.
        self.scene.clear();
        self.scanning.store(true, Ordering::SeqCst);

        let mut tick = interval(Duration::from_millis(self.config.tick_interval_ms.max(1)));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Scanning session started ({} ms tick)",
            self.config.tick_interval_ms
        );

        loop {
            if !self.scanning.load(Ordering::SeqCst) {
                info!("Scanning flag cleared, stopping");
                break;
            }
            tick.tick().await;

            let frame = match source.next_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("Detection source exhausted");
                    break;
                }
                Err(err) => {
                    // Transient inference failure: skip this cycle entirely
                    // (no track updates, no expiry) and retry next tick.
                    warn!("Detection call failed, skipping tick: {:#}", err);
                    self.metrics.inc(&self.metrics.detector_failures);
                    continue;
                }
            };

            self.metrics.inc(&self.metrics.frames_processed);
            self.metrics
                .add(&self.metrics.detections_received, frame.detections.len() as u64);
            self.last_frame_width = frame.width;

            self.scene.process_frame(&frame, Instant::now());
            self.engine.process(&mut self.scene, &mut self.bus);

            for alert in self.bus.drain() {
                match alert.severity {
                    AlertSeverity::Critical => self.metrics.inc(&self.metrics.critical_alerts),
                    AlertSeverity::Path => self.metrics.inc(&self.metrics.path_alerts),
                }
                if alerts_tx.send(alert).await.is_err() {
                    warn!("Alert receiver dropped, discarding alert");
                }
            }

            if snapshot_tx.send(self.scene.snapshot()).is_err() {
                debug!("No snapshot subscribers");
            }
        }

        let outcome = SessionOutcome {
            final_snapshot: self.scene.snapshot(),
            frame_width: self.last_frame_width,
        };

        // Session stop: scene memory does not outlive the session.
        self.scene.clear();
        self.scanning.store(false, Ordering::SeqCst);
        let _ = snapshot_tx.send(Vec::new());

        info!(
            "Scanning session ended ({} frames, {} objects on final frame)",
            self.metrics.summary().frames_processed,
            outcome.final_snapshot.len()
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BBox, Detection};

    struct ScriptedSource {
        frames: std::vec::IntoIter<FrameDetections>,
    }

    impl DetectionSource for ScriptedSource {
        async fn next_frame(&mut self) -> Result<Option<FrameDetections>> {
            Ok(self.frames.next())
        }
    }

    struct FlakySource {
        calls: u32,
    }

    impl DetectionSource for FlakySource {
        async fn next_frame(&mut self) -> Result<Option<FrameDetections>> {
            self.calls += 1;
            match self.calls {
                1 => anyhow::bail!("inference backend unavailable"),
                2 => Ok(Some(person_frame(125.0))),
                _ => Ok(None),
            }
        }
    }

    struct EndlessSource;

    impl DetectionSource for EndlessSource {
        async fn next_frame(&mut self) -> Result<Option<FrameDetections>> {
            Ok(Some(FrameDetections {
                width: 1000.0,
                height: 1000.0,
                detections: vec![],
            }))
        }
    }

    fn person_frame(h: f32) -> FrameDetections {
        FrameDetections {
            width: 1000.0,
            height: 1000.0,
            detections: vec![Detection {
                bbox: BBox {
                    x: 470.0,
                    y: 300.0,
                    w: 60.0,
                    h,
                },
                class: "person".to_string(),
                score: 0.9,
            }],
        }
    }

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.session.tick_interval_ms = 1;
        config
    }

    #[tokio::test]
    async fn test_session_emits_alerts_end_to_end() {
        let config = fast_config();
        let mut session = ScanSession::new(&config);

        // 3.2 m then ~1.1 m: a path alert followed by a critical one.
        let mut source = ScriptedSource {
            frames: vec![person_frame(125.0), person_frame(350.0)].into_iter(),
        };

        let (alerts_tx, mut alerts_rx) = mpsc::channel(16);
        let (snapshot_tx, _snapshot_rx) = watch::channel(Vec::new());

        let outcome = session.run(&mut source, alerts_tx, snapshot_tx).await.unwrap();

        let first = alerts_rx.recv().await.unwrap();
        assert_eq!(first.severity, AlertSeverity::Path);
        let second = alerts_rx.recv().await.unwrap();
        assert_eq!(second.severity, AlertSeverity::Critical);
        assert!(alerts_rx.recv().await.is_none());

        assert_eq!(outcome.final_snapshot.len(), 1);
        assert_eq!(outcome.frame_width, 1000.0);
        assert_eq!(session.metrics().summary().frames_processed, 2);
        assert_eq!(session.metrics().summary().critical_alerts, 1);
    }

    #[tokio::test]
    async fn test_detection_failure_skips_tick_and_retries() {
        let config = fast_config();
        let mut session = ScanSession::new(&config);
        let mut source = FlakySource { calls: 0 };

        let (alerts_tx, mut alerts_rx) = mpsc::channel(16);
        let (snapshot_tx, _snapshot_rx) = watch::channel(Vec::new());

        session.run(&mut source, alerts_tx, snapshot_tx).await.unwrap();

        // The failed tick was skipped; the frame after it still tracked.
        let summary = session.metrics().summary();
        assert_eq!(summary.detector_failures, 1);
        assert_eq!(summary.frames_processed, 1);
        assert!(alerts_rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_cancellation_flag_stops_loop() {
        let config = fast_config();
        let mut session = ScanSession::new(&config);
        let flag = session.scanning_flag();
        let mut source = EndlessSource;

        let (alerts_tx, _alerts_rx) = mpsc::channel(16);
        let (snapshot_tx, _snapshot_rx) = watch::channel(Vec::new());

        let (outcome, _) = tokio::join!(
            session.run(&mut source, alerts_tx, snapshot_tx),
            async {
                tokio::time::sleep(Duration::from_millis(30)).await;
                flag.store(false, Ordering::SeqCst);
            }
        );

        let outcome = outcome.unwrap();
        assert!(outcome.final_snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_cleared_after_session() {
        let config = fast_config();
        let mut session = ScanSession::new(&config);
        let mut source = ScriptedSource {
            frames: vec![person_frame(125.0)].into_iter(),
        };

        let (alerts_tx, _alerts_rx) = mpsc::channel(16);
        let (snapshot_tx, snapshot_rx) = watch::channel(Vec::new());

        session.run(&mut source, alerts_tx, snapshot_tx).await.unwrap();

        // The last value published on the watch is the empty stop snapshot.
        assert!(snapshot_rx.borrow().is_empty());
    }
}
