// src/alerts/engine.rs
//
// Grouping and two-tier alert policy over the in-path subset of scene
// memory. Clustering is single-seed and order-dependent (the seed collects
// same-class neighbors within the group radius; no transitive closure),
// and the closest group member speaks for the whole group.

use std::cmp::Ordering;

use tracing::{debug, info};

use super::AlertConfig;
use crate::pipeline::AlertBus;
use crate::tracker::{SceneMemory, TrackedObject};
use crate::types::{AlertEvent, AlertSeverity};

/// Classes that take alert priority over everything else in the corridor.
const IMPORTANT_CLASSES: [&str; 8] = [
    "person",
    "car",
    "bicycle",
    "motorcycle",
    "bus",
    "truck",
    "dog",
    "cat",
];

pub struct AlertEngine {
    config: AlertConfig,
}

impl AlertEngine {
    pub fn new(config: AlertConfig) -> Self {
        Self { config }
    }

    /// Cluster the in-path objects and publish at most one alert per group.
    pub fn process(&self, scene: &mut SceneMemory, bus: &mut AlertBus) {
        let objects = scene.objects_mut();

        let in_path: Vec<usize> = objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.in_path)
            .map(|(i, _)| i)
            .collect();
        if in_path.is_empty() {
            return;
        }

        // Important classes crowd out everything else; the rest only gets
        // announced when no important object is in the corridor.
        let important: Vec<usize> = in_path
            .iter()
            .copied()
            .filter(|&i| IMPORTANT_CLASSES.contains(&objects[i].class.as_str()))
            .collect();
        let pool = if important.is_empty() { in_path } else { important };

        let mut processed = vec![false; pool.len()];
        for si in 0..pool.len() {
            if processed[si] {
                continue;
            }
            processed[si] = true;
            let seed = pool[si];

            let mut group = vec![seed];
            for sj in si + 1..pool.len() {
                if processed[sj] {
                    continue;
                }
                let cand = pool[sj];
                if objects[cand].class == objects[seed].class
                    && objects[cand].bbox.centroid_distance(&objects[seed].bbox)
                        < self.config.group_radius_px
                {
                    processed[sj] = true;
                    group.push(cand);
                }
            }

            self.alert_group(objects, &group, bus);
        }
    }

    fn alert_group(&self, objects: &mut [TrackedObject], group: &[usize], bus: &mut AlertBus) {
        // Representative: the closest member.
        let Some(&rep) = group.iter().min_by(|&&a, &&b| {
            objects[a]
                .distance_m
                .partial_cmp(&objects[b].distance_m)
                .unwrap_or(Ordering::Equal)
        }) else {
            return;
        };
        let distance = objects[rep].distance_m;
        let class = objects[rep].class.clone();

        // Hysteresis is checked across the whole group so a newcomer joining
        // an already-announced cluster does not re-trigger it.
        let any_critical = group.iter().any(|&i| objects[i].notify.suppresses_critical());
        let any_notified = group.iter().any(|&i| objects[i].notify.suppresses_path());

        if distance < self.config.critical_distance_m && !any_critical {
            let text = phrase(&class, group.len(), distance, AlertSeverity::Critical);
            info!("Critical alert: {}", text);
            for &i in group {
                objects[i].notify.mark_critical();
            }
            bus.publish(AlertEvent {
                text,
                severity: AlertSeverity::Critical,
                class,
                distance_m: distance,
            });
        } else if distance < self.config.path_distance_m && !any_notified {
            let text = phrase(&class, group.len(), distance, AlertSeverity::Path);
            info!("Path alert: {}", text);
            for &i in group {
                objects[i].notify.mark_path();
            }
            bus.publish(AlertEvent {
                text,
                severity: AlertSeverity::Path,
                class,
                distance_m: distance,
            });
        } else {
            debug!(
                "Group of {} {} suppressed ({:.1} m)",
                group.len(),
                class,
                distance
            );
        }
    }
}

fn phrase(class: &str, count: usize, distance_m: f32, severity: AlertSeverity) -> String {
    let tail = match severity {
        AlertSeverity::Critical => "very close",
        AlertSeverity::Path => "in your path",
    };
    if count == 1 {
        format!(
            "{} {} is {}, {:.1} meters away.",
            article(class),
            class,
            tail,
            distance_m
        )
    } else {
        format!(
            "Multiple {} are {}, {:.1} meters away.",
            plural(class),
            tail,
            distance_m
        )
    }
}

fn article(class: &str) -> &'static str {
    match class.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "An",
        _ => "A",
    }
}

fn plural(class: &str) -> String {
    if class == "person" {
        return "people".to_string();
    }
    if class.ends_with('s') || class.ends_with('x') || class.ends_with("ch") || class.ends_with("sh")
    {
        return format!("{}es", class);
    }
    format!("{}s", class)
}
