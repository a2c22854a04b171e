// src/proximity.rs
//
// Leaf geometry helpers: bbox height to estimated meters, bbox position to
// in-corridor test. Pure functions, no state.

use crate::types::BBox;

/// Empirical focal constant for the pinhole approximation.
const FOCAL_SCALE: f32 = 0.4;
/// Estimated distances are clamped to this range in meters.
const MIN_DISTANCE_M: f32 = 0.5;
const MAX_DISTANCE_M: f32 = 20.0;

/// Travel corridor: the center 60% band of the frame.
const CORRIDOR_LEFT: f32 = 0.2;
const CORRIDOR_RIGHT: f32 = 0.8;

/// Estimate distance in meters from apparent bbox height. Taller box means
/// closer object; the inverse relationship approximates a pinhole camera
/// with a fixed focal constant.
pub fn estimate_distance(bbox_height: f32, frame_height: f32) -> f32 {
    if frame_height <= 0.0 || bbox_height <= 0.0 {
        // Degenerate geometry reads as far/unknown, never a division by zero.
        return MAX_DISTANCE_M;
    }
    let normalized = bbox_height / frame_height;
    (FOCAL_SCALE / normalized).clamp(MIN_DISTANCE_M, MAX_DISTANCE_M)
}

/// True when the bbox centroid falls inside the user's forward travel
/// corridor.
pub fn in_travel_corridor(bbox: &BBox, frame_width: f32) -> bool {
    if frame_width <= 0.0 {
        return false;
    }
    let (cx, _) = bbox.center();
    cx > frame_width * CORRIDOR_LEFT && cx < frame_width * CORRIDOR_RIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x: f32, w: f32) -> BBox {
        BBox {
            x,
            y: 100.0,
            w,
            h: 200.0,
        }
    }

    #[test]
    fn test_distance_decreases_with_height() {
        let mut last = f32::MAX;
        for h in [50.0, 100.0, 200.0, 400.0, 600.0] {
            let d = estimate_distance(h, 1000.0);
            assert!(d < last, "distance must strictly decrease, {} vs {}", d, last);
            last = d;
        }
    }

    #[test]
    fn test_distance_clamped_to_range() {
        // A box filling the frame would come out below 0.5 m unclamped.
        assert_eq!(estimate_distance(1000.0, 1000.0), 0.5);
        // A 10 px sliver in a 1000 px frame would come out at 40 m unclamped.
        assert_eq!(estimate_distance(10.0, 1000.0), 20.0);
    }

    #[test]
    fn test_distance_known_value() {
        // 10% of frame height: 0.4 / 0.1 = 4 m.
        let d = estimate_distance(100.0, 1000.0);
        assert!((d - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_geometry_is_far() {
        assert_eq!(estimate_distance(0.0, 1000.0), 20.0);
        assert_eq!(estimate_distance(100.0, 0.0), 20.0);
    }

    #[test]
    fn test_corridor_band() {
        // Corridor is (200, 800) for a 1000 px wide frame.
        assert!(in_travel_corridor(&bbox(450.0, 100.0), 1000.0)); // cx = 500
        assert!(!in_travel_corridor(&bbox(50.0, 100.0), 1000.0)); // cx = 100
        assert!(!in_travel_corridor(&bbox(850.0, 100.0), 1000.0)); // cx = 900
    }

    #[test]
    fn test_corridor_bounds_are_exclusive() {
        // cx exactly at 0.2W sits on the boundary and is out.
        assert!(!in_travel_corridor(&bbox(150.0, 100.0), 1000.0)); // cx = 200
        assert!(!in_travel_corridor(&bbox(750.0, 100.0), 1000.0)); // cx = 800
    }

    #[test]
    fn test_zero_width_frame_is_never_in_path() {
        assert!(!in_travel_corridor(&bbox(0.0, 10.0), 0.0));
    }
}
