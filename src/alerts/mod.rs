// src/alerts/mod.rs

pub mod engine;
pub mod state_machine;

pub use engine::AlertEngine;
pub use state_machine::NotifyState;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Representative distance below which a group is critical, meters
    pub critical_distance_m: f32,
    /// Representative distance below which a group warrants a path alert
    pub path_distance_m: f32,
    /// A notified object must retreat past threshold + margin to re-arm
    pub hysteresis_margin_m: f32,
    /// Maximum centroid distance between same-class group members, pixels
    pub group_radius_px: f32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            critical_distance_m: 1.5,
            path_distance_m: 7.0,
            hysteresis_margin_m: 0.5,
            group_radius_px: 100.0,
        }
    }
}
