// src/types.rs

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BBox {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn centroid_distance(&self, other: &BBox) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}

/// One raw detection from the external vision model. Consumed and discarded
/// each frame. The caller pre-filters these (boxes larger than 40 px, score
/// above 0.6, at most 5 entries, sorted by descending score); the tracker
/// assumes nothing beyond that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BBox,
    pub class: String,
    pub score: f32,
}

/// Per-frame input envelope: reference frame size plus the detection list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameDetections {
    pub width: f32,
    pub height: f32,
    pub detections: Vec<Detection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Path,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Critical => "critical",
        }
    }
}

/// One spoken/visual warning headed for the playback side. Critical alerts
/// additionally trigger haptics downstream.
#[derive(Debug, Clone, Serialize)]
pub struct AlertEvent {
    pub text: String,
    pub severity: AlertSeverity,
    pub class: String,
    pub distance_m: f32,
}

/// Immutable render view of one tracked object.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectSnapshot {
    pub id: u64,
    pub class: String,
    pub bbox: BBox,
    pub distance_m: f32,
    pub in_path: bool,
}
