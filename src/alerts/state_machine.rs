// src/alerts/state_machine.rs
//
// Per-object notification state machine. One tracked object is either
// quiet, path-notified, or critically notified; critical implies notified
// by construction, so the inconsistent intermediate states a flag pair can
// reach do not exist here.

use tracing::debug;

use super::AlertConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyState {
    #[default]
    Quiet,
    PathNotified,
    CriticallyNotified,
}

impl NotifyState {
    /// A path alert is suppressed while any notification is outstanding.
    pub fn suppresses_path(self) -> bool {
        self != NotifyState::Quiet
    }

    /// A critical alert is suppressed only by an outstanding critical one.
    pub fn suppresses_critical(self) -> bool {
        self == NotifyState::CriticallyNotified
    }

    pub fn mark_path(&mut self) {
        *self = NotifyState::PathNotified;
    }

    pub fn mark_critical(&mut self) {
        *self = NotifyState::CriticallyNotified;
    }

    /// Hysteresis reset after a distance update: the object must retreat
    /// past the tier threshold plus the margin before that tier re-arms.
    pub fn on_distance(&mut self, distance_m: f32, cfg: &AlertConfig) {
        match *self {
            NotifyState::Quiet => {}
            NotifyState::PathNotified => {
                if distance_m > cfg.path_distance_m + cfg.hysteresis_margin_m {
                    debug!("Notification re-armed at {:.1} m", distance_m);
                    *self = NotifyState::Quiet;
                }
            }
            NotifyState::CriticallyNotified => {
                if distance_m > cfg.path_distance_m + cfg.hysteresis_margin_m {
                    debug!("Notification re-armed at {:.1} m", distance_m);
                    *self = NotifyState::Quiet;
                } else if distance_m > cfg.critical_distance_m + cfg.hysteresis_margin_m {
                    debug!("Critical tier re-armed at {:.1} m", distance_m);
                    *self = NotifyState::PathNotified;
                }
            }
        }
    }

    /// Leaving the travel corridor clears all notification state.
    pub fn on_left_path(&mut self) {
        *self = NotifyState::Quiet;
    }
}
