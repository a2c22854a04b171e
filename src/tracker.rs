// src/tracker.rs
//
// Scene memory: persistent identities over transient per-frame detections.
//
// Design:
//   - Greedy centroid matching (sufficient for <=5 objects per frame)
//   - Same-class association only; confidence floor gates matching
//   - Lifespan-based expiry replaces explicit track deletion
//   - Corridor membership refreshed for every survivor, every frame
//
// The matching order is contractual: tracks in insertion order, detections
// in list order, nearest candidate wins per track. Not a globally optimal
// assignment.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::alerts::{AlertConfig, NotifyState};
use crate::proximity;
use crate::types::{BBox, Detection, FrameDetections, ObjectSnapshot};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum detection confidence to match an existing track
    pub match_min_confidence: f32,
    /// Minimum detection confidence to create a new track
    pub create_min_confidence: f32,
    /// Maximum centroid distance for a match, pixels
    pub max_match_distance_px: f32,
    /// Milliseconds an unmatched track survives before removal
    pub object_lifespan_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            match_min_confidence: 0.35,
            create_min_confidence: 0.15,
            max_match_distance_px: 150.0,
            object_lifespan_ms: 2000,
        }
    }
}

/// A single tracked object. Owned exclusively by `SceneMemory`; the rest of
/// the system sees it through `ObjectSnapshot`.
#[derive(Debug, Clone)]
pub struct TrackedObject {
    pub id: u64,
    pub class: String,
    pub bbox: BBox,
    pub first_seen: Instant,
    pub last_seen: Instant,
    pub distance_m: f32,
    pub in_path: bool,
    pub notify: NotifyState,
}

impl TrackedObject {
    fn new(id: u64, det: &Detection, frame: &FrameDetections, now: Instant) -> Self {
        Self {
            id,
            class: det.class.clone(),
            bbox: det.bbox,
            first_seen: now,
            last_seen: now,
            distance_m: proximity::estimate_distance(det.bbox.h, frame.height),
            in_path: proximity::in_travel_corridor(&det.bbox, frame.width),
            notify: NotifyState::default(),
        }
    }

    pub fn center(&self) -> (f32, f32) {
        self.bbox.center()
    }

    pub fn snapshot(&self) -> ObjectSnapshot {
        ObjectSnapshot {
            id: self.id,
            class: self.class.clone(),
            bbox: self.bbox,
            distance_m: self.distance_m,
            in_path: self.in_path,
        }
    }
}

/// The id->object store for one scanning session. Insertion-ordered; ids
/// are never reused within the process, so the counter survives `clear`.
pub struct SceneMemory {
    config: TrackerConfig,
    alert_config: AlertConfig,
    objects: Vec<TrackedObject>,
    next_id: u64,
}

impl SceneMemory {
    pub fn new(config: TrackerConfig, alert_config: AlertConfig) -> Self {
        Self {
            config,
            alert_config,
            objects: Vec::with_capacity(8),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Forget every tracked object. The id counter is deliberately kept so
    /// a stop/start within the same process never recycles an id.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn snapshot(&self) -> Vec<ObjectSnapshot> {
        self.objects.iter().map(TrackedObject::snapshot).collect()
    }

    pub(crate) fn objects_mut(&mut self) -> &mut [TrackedObject] {
        &mut self.objects
    }

    /// One tracking cycle: match, create, expire, refresh.
    pub fn process_frame(&mut self, frame: &FrameDetections, now: Instant) {
        let mut det_matched = vec![false; frame.detections.len()];

        // ────────────────────────────────────────────────────────────────
        // MATCHING PASS
        //
        // For each track, the nearest still-unmatched detection of the same
        // class within the match radius. One-to-one in both directions.
        // ────────────────────────────────────────────────────────────────
        for obj in self.objects.iter_mut() {
            let mut best: Option<(usize, f32)> = None;
            for (di, det) in frame.detections.iter().enumerate() {
                if det_matched[di]
                    || det.class != obj.class
                    || det.score <= self.config.match_min_confidence
                {
                    continue;
                }
                let dist = obj.bbox.centroid_distance(&det.bbox);
                if dist >= self.config.max_match_distance_px {
                    continue;
                }
                if best.map_or(true, |(_, d)| dist < d) {
                    best = Some((di, dist));
                }
            }

            let Some((di, dist)) = best else { continue };
            det_matched[di] = true;

            let det = &frame.detections[di];
            obj.bbox = det.bbox;
            obj.last_seen = now;
            obj.distance_m = proximity::estimate_distance(det.bbox.h, frame.height);
            obj.notify.on_distance(obj.distance_m, &self.alert_config);
            if obj.in_path && !proximity::in_travel_corridor(&obj.bbox, frame.width) {
                obj.in_path = false;
                obj.notify.on_left_path();
            }
            debug!(
                "Track {} matched ({}, {:.1} m, moved {:.0} px)",
                obj.id, obj.class, obj.distance_m, dist
            );
        }

        // ────────────────────────────────────────────────────────────────
        // CREATION PASS
        // ────────────────────────────────────────────────────────────────
        for (di, det) in frame.detections.iter().enumerate() {
            if det_matched[di] || det.score <= self.config.create_min_confidence {
                continue;
            }
            let obj = TrackedObject::new(self.next_id, det, frame, now);
            info!(
                "Track {} created ({}, {:.1} m, score {:.2})",
                obj.id, obj.class, obj.distance_m, det.score
            );
            self.next_id += 1;
            self.objects.push(obj);
        }

        // ────────────────────────────────────────────────────────────────
        // EXPIRY PASS
        //
        // Matched and newly created objects carry last_seen == now, so only
        // tracks unmatched past the lifespan can drop out here.
        // ────────────────────────────────────────────────────────────────
        let lifespan = Duration::from_millis(self.config.object_lifespan_ms);
        self.objects.retain(|obj| {
            let unseen = now.duration_since(obj.last_seen);
            if unseen > lifespan {
                info!(
                    "Track {} expired ({}, unseen {} ms)",
                    obj.id,
                    obj.class,
                    unseen.as_millis()
                );
                false
            } else {
                true
            }
        });

        // ────────────────────────────────────────────────────────────────
        // REFRESH PASS
        //
        // in_path must reflect the latest bbox before grouping runs, for
        // matched and unmatched survivors alike.
        // ────────────────────────────────────────────────────────────────
        for obj in &mut self.objects {
            obj.in_path = proximity::in_travel_corridor(&obj.bbox, frame.width);
        }
    }
}
